//! Flow navigation: current step, history, transitions.
//!
//! `NavigationState` is plain data. Transitions are available two ways:
//! in place through [`Navigator`], or as a pure reducer through
//! [`NavigationState::apply`]. Failed transitions never touch the state.

use thiserror::Error;
use tracing::debug;

use crate::tree::NodeId;
use crate::validate::ValidTree;

// ============================================================================
// TYPES
// ============================================================================

/// Whether the current step offers options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Branching,
    Terminal,
}

/// A previously visited step and the option taken out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub node: NodeId,
    pub choice: String,
}

/// One session's position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Step currently displayed.
    pub current: NodeId,
    /// Earlier steps, most recent last.
    pub history: Vec<Visit>,
}

/// A transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Select(String),
    Back,
    Restart,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no option named {name:?} here (available: {available:?})")]
    InvalidOption {
        name: String,
        available: Vec<String>,
    },
    #[error("already at the first step")]
    NoHistory,
    /// The state names a step this tree does not have.
    #[error("session refers to step #{node}, which is not in this tree")]
    ForeignState { node: usize },
}

// ============================================================================
// STATE
// ============================================================================

impl NavigationState {
    /// Fresh session at the root.
    pub fn start(tree: &ValidTree) -> Self {
        NavigationState {
            current: tree.root(),
            history: Vec::new(),
        }
    }

    /// Pure reducer: the state after `mv`, or why it is not allowed.
    ///
    /// # Errors
    /// `ForeignState` when this state was not taken from `tree`.
    pub fn apply(&self, tree: &ValidTree, mv: &Move) -> Result<NavigationState, NavError> {
        self.check(tree)?;
        let mut next = self.clone();
        match mv {
            Move::Select(name) => next.select(tree, name)?,
            Move::Back => next.back()?,
            Move::Restart => next.restart(tree),
        }
        Ok(next)
    }

    /// Every step this state refers to exists in `tree`.
    ///
    /// # Errors
    /// `ForeignState` naming the first missing step.
    pub fn check(&self, tree: &ValidTree) -> Result<(), NavError> {
        let steps = std::iter::once(self.current).chain(self.history.iter().map(|v| v.node));
        for id in steps {
            if tree.get(id).is_none() {
                return Err(NavError::ForeignState { node: id.index() });
            }
        }
        Ok(())
    }

    fn select(&mut self, tree: &ValidTree, name: &str) -> Result<(), NavError> {
        let Some(target) = tree.child(self.current, name) else {
            return Err(NavError::InvalidOption {
                name: name.to_string(),
                available: tree
                    .node(self.current)
                    .choices()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect(),
            });
        };

        self.history.push(Visit {
            node: self.current,
            choice: name.to_string(),
        });
        self.current = target;
        debug!(option = name, depth = self.history.len(), "selected option");
        Ok(())
    }

    fn back(&mut self) -> Result<(), NavError> {
        let visit = self.history.pop().ok_or(NavError::NoHistory)?;
        self.current = visit.node;
        debug!(depth = self.history.len(), "went back");
        Ok(())
    }

    fn restart(&mut self, tree: &ValidTree) {
        self.history.clear();
        self.current = tree.root();
        debug!("restarted");
    }

    /// Option names taken from the root to reach the current step.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.history.iter().map(|v| v.choice.as_str()).collect()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }
}

// ============================================================================
// NAVIGATOR
// ============================================================================

/// A session bound to a validated tree.
#[derive(Debug, Clone)]
pub struct Navigator<'t> {
    tree: &'t ValidTree,
    state: NavigationState,
}

impl<'t> Navigator<'t> {
    pub fn new(tree: &'t ValidTree) -> Self {
        Navigator {
            tree,
            state: NavigationState::start(tree),
        }
    }

    /// Resume a session from an earlier snapshot of the same tree.
    ///
    /// # Errors
    /// `ForeignState` if the snapshot names steps `tree` does not have.
    pub fn resume(tree: &'t ValidTree, state: NavigationState) -> Result<Self, NavError> {
        state.check(tree)?;
        Ok(Navigator { tree, state })
    }

    pub fn tree(&self) -> &'t ValidTree {
        self.tree
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn into_state(self) -> NavigationState {
        self.state
    }

    // -- Transitions --

    /// Take the option named exactly `name`.
    ///
    /// # Errors
    /// `InvalidOption` if there is no such option here (including at a
    /// terminal step). State is unchanged.
    pub fn select_option(&mut self, name: &str) -> Result<(), NavError> {
        self.state.select(self.tree, name)
    }

    /// Take the option at `index` (0-based) in display order.
    pub fn select_index(&mut self, index: usize) -> Result<(), NavError> {
        let choices = self.tree.node(self.state.current).choices();
        match choices.get(index) {
            Some(choice) => self.state.select(self.tree, &choice.name),
            None => Err(NavError::InvalidOption {
                name: format!("#{}", index + 1),
                available: choices.iter().map(|c| c.name.clone()).collect(),
            }),
        }
    }

    /// Return to the previous step.
    ///
    /// # Errors
    /// `NoHistory` at the root. State is unchanged.
    pub fn back(&mut self) -> Result<(), NavError> {
        self.state.back()
    }

    /// Return to the root and forget the history.
    pub fn restart(&mut self) {
        self.state.restart(self.tree)
    }

    /// Apply a transition request.
    pub fn apply(&mut self, mv: &Move) -> Result<(), NavError> {
        match mv {
            Move::Select(name) => self.select_option(name),
            Move::Back => self.back(),
            Move::Restart => {
                self.restart();
                Ok(())
            }
        }
    }

    // -- Queries --

    pub fn current_prompt(&self) -> &'t [String] {
        &self.tree.node(self.state.current).prompt
    }

    /// Option names at the current step, in order. Empty when terminal.
    pub fn available_options(&self) -> Vec<&'t str> {
        self.tree
            .node(self.state.current)
            .choices()
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.tree.node(self.state.current).is_terminal()
    }

    pub fn mode(&self) -> Mode {
        if self.is_terminal() {
            Mode::Terminal
        } else {
            Mode::Branching
        }
    }

    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.state.breadcrumbs()
    }

    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn at_root(&self) -> bool {
        self.state.history.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
