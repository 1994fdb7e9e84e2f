//! TUI state algebra: pure types, zero effects.
//!
//! The screen is derived from the current step, so a cursor can only
//! exist where there are options to point at.

use crate::navigator::NavigationState;
use crate::tree::NodeId;
use crate::validate::ValidTree;

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    pub session: Session,
    /// Set when the app should exit on the next tick.
    pub should_quit: bool,
}

/// One walk through the tree, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub nav: NavigationState,
    pub screen: Screen,
    /// Transient message from the last rejected action.
    pub notice: Option<String>,
}

// ============================================================================
// SCREENS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// A branching step. `cursor` indexes its options.
    Question { cursor: usize },
    /// A terminal step: the recommendation.
    Recommendation,
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic user action, decoupled from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    /// Take the highlighted option.
    Choose,
    /// Take the option with this 1-based number.
    Pick(u8),
    Back,
    Restart,
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a pure state transition.
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    /// Continue with this session.
    Session(Session),
    Quit,
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl App {
    pub fn new(tree: &ValidTree) -> Self {
        App {
            session: Session::start(tree),
            should_quit: false,
        }
    }
}

impl Session {
    /// A fresh walk at the root.
    pub fn start(tree: &ValidTree) -> Self {
        Session::at(tree, NavigationState::start(tree))
    }

    /// Display `nav`, cursor on the first option, no notice.
    pub fn at(tree: &ValidTree, nav: NavigationState) -> Self {
        Session {
            screen: Screen::for_step(tree, nav.current),
            nav,
            notice: None,
        }
    }

    /// The same session with a notice attached.
    pub fn with_notice(&self, notice: impl Into<String>) -> Self {
        Session {
            notice: Some(notice.into()),
            ..self.clone()
        }
    }
}

impl Screen {
    pub fn for_step(tree: &ValidTree, id: NodeId) -> Self {
        if tree.node(id).is_terminal() {
            Screen::Recommendation
        } else {
            Screen::Question { cursor: 0 }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
