//! Pure state transitions: (Session, Action) → Transition.
//!
//! Fully testable without a terminal. Rejected navigation leaves the
//! position untouched and surfaces as a notice.

use crate::navigator::{Move, NavError, Navigator};
use crate::validate::ValidTree;

use super::state::{Action, Screen, Session, Transition};

/// Pure state transition function.
pub fn update(session: &Session, action: &Action, tree: &ValidTree) -> Transition {
    match action {
        Action::Quit => Transition::Quit,
        Action::MoveUp | Action::MoveDown => move_cursor(session, action, tree),
        Action::Choose => match session.screen {
            Screen::Question { cursor } => navigate(session, tree, |nav| nav.select_index(cursor)),
            Screen::Recommendation => {
                Transition::Session(session.with_notice("This is the end of the guide"))
            }
        },
        Action::Pick(number) => {
            let index = usize::from(*number).saturating_sub(1);
            navigate(session, tree, |nav| nav.select_index(index))
        }
        Action::Back => navigate(session, tree, |nav| nav.apply(&Move::Back)),
        Action::Restart => navigate(session, tree, |nav| nav.apply(&Move::Restart)),
    }
}

fn move_cursor(session: &Session, action: &Action, tree: &ValidTree) -> Transition {
    let Screen::Question { cursor } = session.screen else {
        return Transition::Session(Session {
            notice: None,
            ..session.clone()
        });
    };

    let len = tree.node(session.nav.current).choices().len();
    let cursor = match action {
        Action::MoveUp => cursor.saturating_sub(1),
        _ => (cursor + 1).min(len.saturating_sub(1)),
    };

    Transition::Session(Session {
        screen: Screen::Question { cursor },
        notice: None,
        ..session.clone()
    })
}

/// Run one navigator step on a copy of the session's position.
fn navigate<F>(session: &Session, tree: &ValidTree, step: F) -> Transition
where
    F: FnOnce(&mut Navigator<'_>) -> Result<(), NavError>,
{
    let mut nav = match Navigator::resume(tree, session.nav.clone()) {
        Ok(nav) => nav,
        Err(err) => return Transition::Session(session.with_notice(notice_for(&err))),
    };
    match step(&mut nav) {
        Ok(()) => Transition::Session(Session::at(tree, nav.into_state())),
        Err(err) => Transition::Session(session.with_notice(notice_for(&err))),
    }
}

fn notice_for(err: &NavError) -> String {
    match err {
        NavError::InvalidOption { name, .. } => format!("There is no option {} here", name),
        NavError::NoHistory => "Already at the first question".to_string(),
        NavError::ForeignState { .. } => "This session belongs to a different guide".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
