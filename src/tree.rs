//! Compiled flow tree: an arena of nodes addressed by `NodeId`.
//!
//! The authored form ([`FlowNode`]) is nested and owned, so it can never
//! contain a cycle or a shared child. The arena form can: it is what
//! [`FlowTreeBuilder`] produces and what the validator guards.

use thiserror::Error;

use crate::types::FlowNode;

// ============================================================================
// TYPES
// ============================================================================

/// Index of a node inside one [`FlowTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named edge to a child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub target: NodeId,
}

/// Whether a step ends the dialogue or branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Final recommendation.
    Terminal,
    /// Options out of this step. Empty only in malformed trees.
    Branching(Vec<Choice>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub prompt: Vec<String>,
    pub step: Step,
}

impl Node {
    /// Options out of this node; empty for terminal nodes.
    pub fn choices(&self) -> &[Choice] {
        match &self.step {
            Step::Terminal => &[],
            Step::Branching(choices) => choices,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.choices().is_empty()
    }
}

/// Immutable arena of flow nodes with a designated root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowTree {
    nodes: Vec<Node>,
    root: NodeId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("node #{0} does not exist in this tree")]
    UnknownNode(usize),
}

// ============================================================================
// FLOW TREE
// ============================================================================

impl FlowTree {
    /// Flatten an authored tree. Nodes are numbered in pre-order, root first.
    pub fn from_flow(root: &FlowNode) -> Self {
        FlowTree {
            nodes: flatten(root),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node.
    ///
    /// # Panics
    /// If `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total nodes in the arena, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follow an option by exact, case-sensitive name.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .choices()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.target)
    }
}

/// Pre-order numbering with an explicit stack; nesting depth is not limited
/// by the call stack.
fn flatten(root: &FlowNode) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut stack: Vec<(&FlowNode, Option<(NodeId, &str)>)> = vec![(root, None)];

    while let Some((flow, parent)) = stack.pop() {
        let id = NodeId(nodes.len());
        let step = match flow.options {
            Some(_) => Step::Branching(Vec::new()),
            None => Step::Terminal,
        };
        nodes.push(Node {
            prompt: flow.prompt.clone(),
            step,
        });

        if let Some((parent, name)) = parent {
            if let Step::Branching(choices) = &mut nodes[parent.0].step {
                choices.push(Choice {
                    name: name.to_string(),
                    target: id,
                });
            }
        }
        if let Some(options) = &flow.options {
            stack.extend(
                options
                    .iter()
                    .rev()
                    .map(|option| (&option.flow, Some((id, option.name.as_str())))),
            );
        }
    }

    nodes
}

// ============================================================================
// BUILDER
// ============================================================================

/// Direct arena construction, for content generated by code.
///
/// Nothing stops a caller from linking a node back to an ancestor or
/// from pointing two options at one node; validation catches both.
#[derive(Debug, Default)]
pub struct FlowTreeBuilder {
    nodes: Vec<Node>,
}

impl FlowTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no options.
    pub fn terminal(&mut self, prompt: Vec<String>) -> NodeId {
        self.push(prompt, Step::Terminal)
    }

    /// Add a node whose options are attached later with [`Self::link`].
    pub fn branching(&mut self, prompt: Vec<String>) -> NodeId {
        self.push(prompt, Step::Branching(Vec::new()))
    }

    /// Add an option named `name` on `from`, leading to `to`.
    ///
    /// A terminal `from` becomes branching.
    pub fn link(
        &mut self,
        from: NodeId,
        name: impl Into<String>,
        to: NodeId,
    ) -> Result<(), BuildError> {
        self.check(to)?;
        self.check(from)?;
        let choice = Choice {
            name: name.into(),
            target: to,
        };
        match &mut self.nodes[from.0].step {
            Step::Branching(choices) => choices.push(choice),
            step => *step = Step::Branching(vec![choice]),
        }
        Ok(())
    }

    pub fn build(self, root: NodeId) -> Result<FlowTree, BuildError> {
        self.check(root)?;
        Ok(FlowTree {
            nodes: self.nodes,
            root,
        })
    }

    fn push(&mut self, prompt: Vec<String>, step: Step) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { prompt, step });
        id
    }

    fn check(&self, id: NodeId) -> Result<(), BuildError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownNode(id.0))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
