//! Structural validation of flow trees.
//!
//! Run once at load time. A tree that fails here never reaches a
//! navigation session; defects are reported, never repaired.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::tree::{Choice, FlowTree, NodeId, Step};
use crate::types::{FlowNode, FlowOption, TreeStats};

/// Separator used when printing option paths.
const PATH_SEPARATOR: &str = " › ";

// ============================================================================
// TYPES
// ============================================================================

/// Limits applied during validation.
#[derive(Debug, Clone, Default)]
pub struct ValidateConfig {
    /// Maximum number of selections from the root (None = unlimited).
    pub max_depth: Option<usize>,
}

/// What is wrong with a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefectKind {
    /// The prompt has no lines.
    EmptyPrompt,
    /// A prompt line is empty or whitespace only.
    BlankPromptLine { line: usize },
    /// `options` is present but has no entries.
    EmptyOptions,
    /// Two sibling options share a name.
    DuplicateOption { name: String },
    /// Following the path leads back to one of its own ancestors.
    Cycle,
    /// The node is also reachable through another option.
    SharedSubtree,
    /// The node sits deeper than the configured maximum.
    TooDeep { depth: usize, max: usize },
}

/// A defect and where it is, as option names from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defect {
    pub path: Vec<String>,
    #[serde(flatten)]
    pub kind: DefectKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The tree is malformed. Defects are in discovery (depth-first) order.
    #[error("{}", summarize(.0))]
    StructuralDefect(Vec<Defect>),
}

/// A tree that passed validation.
///
/// Only [`validate`] constructs this, so holding one proves the gate ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTree(FlowTree);

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefectKind::EmptyPrompt => write!(f, "empty prompt"),
            DefectKind::BlankPromptLine { line } => write!(f, "blank prompt line {}", line + 1),
            DefectKind::EmptyOptions => {
                write!(f, "options list is present but empty (omit it for a final step)")
            }
            DefectKind::DuplicateOption { name } => write!(f, "duplicate option {:?}", name),
            DefectKind::Cycle => write!(f, "option leads back to an earlier step"),
            DefectKind::SharedSubtree => write!(f, "step is shared with another option"),
            DefectKind::TooDeep { depth, max } => {
                write!(f, "step at depth {} exceeds maximum {}", depth, max)
            }
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, format_path(&self.path))
    }
}

fn summarize(defects: &[Defect]) -> String {
    match defects.first() {
        Some(first) => format!("{} structural defect(s), first: {}", defects.len(), first),
        None => "structural defect".to_string(),
    }
}

/// Render an option path for humans: "(root)" or "Bird › No › Yes".
pub fn format_path<S: AsRef<str>>(path: &[S]) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Gate a tree: returns it unchanged when sound.
///
/// # Errors
/// `StructuralDefect` listing every defect found.
pub fn validate(tree: FlowTree, config: &ValidateConfig) -> Result<ValidTree, ValidationError> {
    let defects = inspect(&tree, config);
    if defects.is_empty() {
        let valid = ValidTree(tree);
        let stats = valid.stats();
        info!(
            nodes = stats.nodes,
            terminals = stats.terminals,
            depth = stats.depth,
            "flow tree validated"
        );
        Ok(valid)
    } else {
        debug!(count = defects.len(), "flow tree rejected");
        Err(ValidationError::StructuralDefect(defects))
    }
}

/// Collect every defect reachable from the root, depth-first.
///
/// The walk keeps its own stack, so tree depth is bounded by memory only.
pub fn inspect(tree: &FlowTree, config: &ValidateConfig) -> Vec<Defect> {
    let mut walker = Walker {
        tree,
        config,
        on_path: vec![false; tree.len()],
        seen: vec![false; tree.len()],
        path: Vec::new(),
        defects: Vec::new(),
    };
    walker.walk();
    walker.defects
}

struct Walker<'a> {
    tree: &'a FlowTree,
    config: &'a ValidateConfig,
    /// Nodes on the current root-to-here path.
    on_path: Vec<bool>,
    /// Nodes visited anywhere so far.
    seen: Vec<bool>,
    path: Vec<&'a str>,
    defects: Vec<Defect>,
}

/// A node whose children are being walked.
struct Frame<'a> {
    id: NodeId,
    depth: usize,
    choices: &'a [Choice],
    next: usize,
}

impl<'a> Walker<'a> {
    fn walk(&mut self) {
        let mut stack: Vec<Frame<'a>> = Vec::new();
        if let Some(frame) = self.enter(self.tree.root(), 0) {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let choices = frame.choices;
            let Some(choice) = choices.get(frame.next) else {
                self.on_path[frame.id.index()] = false;
                stack.pop();
                // The root frame has no path entry; popping an empty path is a no-op.
                self.path.pop();
                continue;
            };
            frame.next += 1;
            let depth = frame.depth + 1;

            self.path.push(&choice.name);
            match self.enter(choice.target, depth) {
                Some(child) => stack.push(child),
                None => {
                    self.path.pop();
                }
            }
        }
    }

    /// Check one node. Returns a frame when its children should be walked.
    fn enter(&mut self, id: NodeId, depth: usize) -> Option<Frame<'a>> {
        let i = id.index();
        if self.on_path[i] {
            self.report(DefectKind::Cycle);
            return None;
        }
        if self.seen[i] {
            self.report(DefectKind::SharedSubtree);
            return None;
        }
        self.seen[i] = true;

        if let Some(max) = self.config.max_depth {
            if depth > max {
                self.report(DefectKind::TooDeep { depth, max });
                return None;
            }
        }

        let tree = self.tree;
        let node = tree.node(id);

        if node.prompt.is_empty() {
            self.report(DefectKind::EmptyPrompt);
        }
        for (line, text) in node.prompt.iter().enumerate() {
            if text.trim().is_empty() {
                self.report(DefectKind::BlankPromptLine { line });
            }
        }

        let Step::Branching(choices) = &node.step else {
            return None;
        };
        if choices.is_empty() {
            self.report(DefectKind::EmptyOptions);
            return None;
        }

        let mut names = HashSet::new();
        for choice in choices {
            if !names.insert(choice.name.as_str()) {
                self.report(DefectKind::DuplicateOption {
                    name: choice.name.clone(),
                });
            }
        }

        self.on_path[i] = true;
        Some(Frame {
            id,
            depth,
            choices,
            next: 0,
        })
    }

    fn report(&mut self, kind: DefectKind) {
        self.defects.push(Defect {
            path: self.path.iter().map(|s| s.to_string()).collect(),
            kind,
        });
    }
}

// ============================================================================
// VALID TREE
// ============================================================================

impl ValidTree {
    pub fn tree(&self) -> &FlowTree {
        &self.0
    }

    pub fn into_inner(self) -> FlowTree {
        self.0
    }

    /// Shape of the reachable tree. Finite because the tree is acyclic.
    pub fn stats(&self) -> TreeStats {
        let tree = &self.0;
        let mut stats = TreeStats::default();
        let mut stack = vec![(tree.root(), 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = tree.node(id);
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            if node.is_terminal() {
                stats.terminals += 1;
            }
            stack.extend(node.choices().iter().map(|c| (c.target, depth + 1)));
        }

        stats
    }

    /// Rebuild the nested serialized form from the root.
    pub fn to_flow(&self) -> FlowNode {
        unflatten(&self.0, self.0.root())
    }
}

/// Nest the arena back into owned nodes, deepest first.
///
/// Pre-order numbering from the root puts every child after its parent,
/// so walking that order backwards finishes children before parents.
fn unflatten(tree: &FlowTree, root: NodeId) -> FlowNode {
    let order = preorder(tree, root);
    let mut built: Vec<Option<FlowNode>> = vec![None; tree.len()];

    for &id in order.iter().rev() {
        let node = tree.node(id);
        let flow = match &node.step {
            Step::Terminal => FlowNode::terminal(node.prompt.clone()),
            Step::Branching(choices) => FlowNode::branching(
                node.prompt.clone(),
                choices
                    .iter()
                    .filter_map(|c| {
                        built[c.target.index()]
                            .take()
                            .map(|flow| FlowOption::new(c.name.clone(), flow))
                    })
                    .collect(),
            ),
        };
        built[id.index()] = Some(flow);
    }

    built[root.index()]
        .take()
        .unwrap_or_else(|| FlowNode::terminal(tree.node(root).prompt.clone()))
}

/// Reachable nodes, parents before children, siblings in option order.
fn preorder(tree: &FlowTree, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        order.push(id);
        let node = tree.node(id);
        stack.extend(node.choices().iter().rev().map(|c| c.target));
    }
    order
}

impl std::ops::Deref for ValidTree {
    type Target = FlowTree;

    fn deref(&self) -> &FlowTree {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FlowTreeBuilder;

    fn lines(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    fn leaf(text: &str) -> FlowNode {
        FlowNode::terminal(lines(text))
    }

    fn yes_no(prompt: &str, yes: FlowNode, no: FlowNode) -> FlowNode {
        FlowNode::branching(
            lines(prompt),
            vec![FlowOption::new("Yes", yes), FlowOption::new("No", no)],
        )
    }

    fn defects_of(flow: &FlowNode) -> Vec<Defect> {
        inspect(&FlowTree::from_flow(flow), &ValidateConfig::default())
    }

    #[test]
    fn sound_tree_passes_unchanged() {
        let flow = yes_no("Hurt?", leaf("Call."), yes_no("Alone?", leaf("Watch."), leaf("Leave.")));
        let tree = FlowTree::from_flow(&flow);
        let valid = validate(tree.clone(), &ValidateConfig::default()).unwrap();
        assert_eq!(valid.tree(), &tree);
        assert_eq!(
            valid.stats(),
            TreeStats {
                nodes: 5,
                terminals: 3,
                depth: 2
            }
        );
    }

    #[test]
    fn single_terminal_root_is_valid() {
        let valid = validate(FlowTree::from_flow(&leaf("Nothing to do.")), &ValidateConfig::default());
        assert!(valid.is_ok());
    }

    #[test]
    fn empty_prompt_is_reported_with_path() {
        let flow = yes_no("Hurt?", FlowNode::terminal(vec![]), leaf("Leave."));
        assert_eq!(
            defects_of(&flow),
            vec![Defect {
                path: vec!["Yes".into()],
                kind: DefectKind::EmptyPrompt
            }]
        );
    }

    #[test]
    fn blank_prompt_line_is_reported() {
        let flow = FlowNode::terminal(vec!["Fine.".into(), "   ".into()]);
        assert_eq!(defects_of(&flow)[0].kind, DefectKind::BlankPromptLine { line: 1 });
    }

    #[test]
    fn explicit_empty_options_is_a_defect() {
        let flow = yes_no("Hurt?", leaf("Call."), FlowNode::branching(lines("Hmm?"), vec![]));
        let defects = defects_of(&flow);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].kind, DefectKind::EmptyOptions);
        assert_eq!(defects[0].path, vec!["No".to_string()]);
    }

    #[test]
    fn duplicate_sibling_names_are_reported() {
        let flow = FlowNode::branching(
            lines("Which?"),
            vec![
                FlowOption::new("Bird", leaf("A")),
                FlowOption::new("Cat", leaf("B")),
                FlowOption::new("Bird", leaf("C")),
            ],
        );
        assert_eq!(
            defects_of(&flow),
            vec![Defect {
                path: vec![],
                kind: DefectKind::DuplicateOption { name: "Bird".into() }
            }]
        );
    }

    #[test]
    fn names_differing_only_in_case_are_distinct() {
        let flow = FlowNode::branching(
            lines("Which?"),
            vec![FlowOption::new("yes", leaf("A")), FlowOption::new("Yes", leaf("B"))],
        );
        assert!(defects_of(&flow).is_empty());
    }

    #[test]
    fn same_names_in_different_nodes_are_fine() {
        let flow = yes_no("Hurt?", yes_no("Bleeding?", leaf("A"), leaf("B")), leaf("C"));
        assert!(defects_of(&flow).is_empty());
    }

    #[test]
    fn cycle_is_detected_along_the_path() {
        let mut builder = FlowTreeBuilder::new();
        let root = builder.branching(lines("Start?"));
        let middle = builder.branching(lines("Middle?"));
        let end = builder.terminal(lines("End."));
        builder.link(root, "Go", middle).unwrap();
        builder.link(middle, "Loop", root).unwrap();
        builder.link(middle, "Stop", end).unwrap();
        let tree = builder.build(root).unwrap();

        let result = validate(tree, &ValidateConfig::default());
        match result {
            Err(ValidationError::StructuralDefect(defects)) => {
                assert_eq!(defects.len(), 1);
                assert_eq!(defects[0].kind, DefectKind::Cycle);
                assert_eq!(defects[0].path, vec!["Go".to_string(), "Loop".to_string()]);
            }
            other => panic!("Expected StructuralDefect, got {:?}", other),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut builder = FlowTreeBuilder::new();
        let root = builder.branching(lines("Again?"));
        builder.link(root, "Again", root).unwrap();
        let defects = inspect(&builder.build(root).unwrap(), &ValidateConfig::default());
        assert_eq!(defects[0].kind, DefectKind::Cycle);
    }

    #[test]
    fn shared_child_is_not_a_cycle_but_is_rejected() {
        let mut builder = FlowTreeBuilder::new();
        let root = builder.branching(lines("Hurt?"));
        let shared = builder.terminal(lines("Call."));
        builder.link(root, "Yes", shared).unwrap();
        builder.link(root, "Maybe", shared).unwrap();
        let defects = inspect(&builder.build(root).unwrap(), &ValidateConfig::default());
        assert_eq!(
            defects,
            vec![Defect {
                path: vec!["Maybe".into()],
                kind: DefectKind::SharedSubtree
            }]
        );
    }

    #[test]
    fn depth_limit_applies_only_when_configured() {
        let flow = yes_no("1?", yes_no("2?", yes_no("3?", leaf("a"), leaf("b")), leaf("c")), leaf("d"));
        let tree = FlowTree::from_flow(&flow);

        assert!(inspect(&tree, &ValidateConfig::default()).is_empty());

        let config = ValidateConfig { max_depth: Some(2) };
        let defects = inspect(&tree, &config);
        assert_eq!(defects.len(), 2);
        assert!(defects
            .iter()
            .all(|d| matches!(d.kind, DefectKind::TooDeep { depth: 3, max: 2 })));
    }

    #[test]
    fn all_defects_are_collected() {
        let flow = FlowNode::branching(
            vec![],
            vec![
                FlowOption::new("A", FlowNode::branching(lines("x"), vec![])),
                FlowOption::new("A", leaf("")),
            ],
        );
        let kinds: Vec<DefectKind> = defects_of(&flow).into_iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DefectKind::EmptyPrompt,
                DefectKind::DuplicateOption { name: "A".into() },
                DefectKind::EmptyOptions,
                DefectKind::BlankPromptLine { line: 0 },
            ]
        );
    }

    #[test]
    fn error_message_names_the_first_defect() {
        let flow = yes_no("Hurt?", FlowNode::branching(lines("?"), vec![]), leaf("ok"));
        let err = validate(FlowTree::from_flow(&flow), &ValidateConfig::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("1 structural defect(s)"));
        assert!(message.contains("at Yes"));
    }

    #[test]
    fn format_path_joins_names() {
        assert_eq!(format_path::<&str>(&[]), "(root)");
        assert_eq!(format_path(&["Bird", "No", "Yes"]), "Bird › No › Yes");
    }

    #[test]
    fn defect_serializes_flat() {
        let defect = Defect {
            path: vec!["Bird".into()],
            kind: DefectKind::DuplicateOption { name: "Yes".into() },
        };
        let json = serde_json::to_value(&defect).unwrap();
        assert_eq!(json["kind"], "duplicate_option");
        assert_eq!(json["name"], "Yes");
        assert_eq!(json["path"][0], "Bird");
    }

    #[test]
    fn to_flow_reproduces_the_source_tree() {
        let flow = FlowNode::branching(
            lines("Hurt?"),
            vec![
                FlowOption::new("Yes", leaf("Call.")),
                FlowOption::new(
                    "No",
                    FlowNode::branching(lines("Alone?"), vec![FlowOption::new("Yes", leaf("Wait."))]),
                ),
            ],
        );
        let valid = validate(FlowTree::from_flow(&flow), &ValidateConfig::default()).unwrap();
        assert_eq!(valid.to_flow(), flow);
    }

    fn chain(len: usize) -> (FlowTreeBuilder, Vec<NodeId>) {
        let mut builder = FlowTreeBuilder::new();
        let ids: Vec<NodeId> = (0..len)
            .map(|i| builder.branching(lines(&format!("Step {}?", i))))
            .collect();
        for pair in ids.windows(2) {
            builder.link(pair[0], "Next", pair[1]).unwrap();
        }
        (builder, ids)
    }

    #[test]
    fn hundred_thousand_step_chain_validates() {
        let (mut builder, ids) = chain(100_000);
        let end = builder.terminal(lines("Done."));
        builder.link(ids[ids.len() - 1], "Next", end).unwrap();

        let valid = validate(builder.build(ids[0]).unwrap(), &ValidateConfig::default()).unwrap();
        assert_eq!(
            valid.stats(),
            TreeStats {
                nodes: 100_001,
                terminals: 1,
                depth: 100_000
            }
        );
    }

    #[test]
    fn long_chain_survives_export_and_reimport() {
        let (mut builder, ids) = chain(100_000);
        let end = builder.terminal(lines("Done."));
        builder.link(ids[ids.len() - 1], "Next", end).unwrap();
        let valid = validate(builder.build(ids[0]).unwrap(), &ValidateConfig::default()).unwrap();

        let flow = valid.to_flow();
        let again = validate(FlowTree::from_flow(&flow), &ValidateConfig::default()).unwrap();
        assert_eq!(again.stats(), valid.stats());
    }

    #[test]
    fn cycle_at_the_end_of_a_long_chain_reports_the_full_path() {
        let (mut builder, ids) = chain(50_000);
        builder.link(ids[ids.len() - 1], "Again", ids[0]).unwrap();

        let defects = inspect(&builder.build(ids[0]).unwrap(), &ValidateConfig::default());
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].kind, DefectKind::Cycle);
        assert_eq!(defects[0].path.len(), 50_000);
        assert_eq!(defects[0].path.last().map(String::as_str), Some("Again"));
    }

    #[test]
    fn finished_branch_is_no_longer_on_the_path() {
        // "B" reaches a node first walked under "A"; that is sharing, not a loop.
        let mut builder = FlowTreeBuilder::new();
        let root = builder.branching(lines("Which?"));
        let a = builder.branching(lines("A?"));
        let b = builder.branching(lines("B?"));
        let end = builder.terminal(lines("End."));
        builder.link(root, "A", a).unwrap();
        builder.link(root, "B", b).unwrap();
        builder.link(a, "Go", end).unwrap();
        builder.link(b, "Go", a).unwrap();

        let defects = inspect(&builder.build(root).unwrap(), &ValidateConfig::default());
        assert_eq!(
            defects,
            vec![Defect {
                path: vec!["B".into(), "Go".into()],
                kind: DefectKind::SharedSubtree
            }]
        );
    }
}
