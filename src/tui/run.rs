//! TUI effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! The only module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui.
//! One key event is one transition; nothing runs in the background.

use std::io;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::validate::ValidTree;

use super::state::{Action, App, Transition};
use super::update::update;
use super::view::render;

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a semantic Action.
///
/// Returns None for keys that don't map to any action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Enter => Some(Action::Choose),
        KeyCode::Char(c @ '1'..='9') => Some(Action::Pick(c as u8 - b'0')),

        KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('b') => Some(Action::Back),
        KeyCode::Char('r') => Some(Action::Restart),
        KeyCode::Char('q') => Some(Action::Quit),

        _ => None,
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Restore the terminal before the default hook prints a panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Walk `tree` interactively until the user quits.
pub fn run(tree: &ValidTree) -> io::Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, tree);
    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tree: &ValidTree,
) -> io::Result<()> {
    let mut app = App::new(tree);

    loop {
        terminal.draw(|frame| render(&app, tree, frame))?;

        if app.should_quit {
            return Ok(());
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        handle_key(&mut app, key, tree);
    }
}

/// Feed one key press through `update` into the app.
fn handle_key(app: &mut App, key: KeyEvent, tree: &ValidTree) {
    if let Some(action) = map_key(key) {
        let transition = update(&app.session, &action, tree);
        apply(app, transition);
    }
}

fn apply(app: &mut App, transition: Transition) {
    match transition {
        Transition::Session(session) => app.session = session,
        Transition::Quit => app.should_quit = true,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::found_animal::bundled_tree;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_maps_to_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(Action::Quit));
    }

    #[test]
    fn vim_and_arrow_keys_move() {
        assert_eq!(map_key(key(KeyCode::Char('j'))), Some(Action::MoveDown));
        assert_eq!(map_key(key(KeyCode::Char('k'))), Some(Action::MoveUp));
        assert_eq!(map_key(key(KeyCode::Down)), Some(Action::MoveDown));
        assert_eq!(map_key(key(KeyCode::Up)), Some(Action::MoveUp));
    }

    #[test]
    fn number_keys_pick_options() {
        for n in 1..=9u8 {
            let code = KeyCode::Char((b'0' + n) as char);
            assert_eq!(map_key(key(code)), Some(Action::Pick(n)));
        }
        assert_eq!(map_key(key(KeyCode::Char('0'))), None);
    }

    #[test]
    fn back_has_three_keys() {
        for code in [KeyCode::Backspace, KeyCode::Esc, KeyCode::Char('b')] {
            assert_eq!(map_key(key(code)), Some(Action::Back));
        }
    }

    #[test]
    fn enter_restart_quit() {
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Action::Choose));
        assert_eq!(map_key(key(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Action::Quit));
    }

    #[test]
    fn unmapped_key_returns_none() {
        assert_eq!(map_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn key_presses_drive_the_session() {
        let tree = bundled_tree().unwrap();
        let mut app = App::new(&tree);

        handle_key(&mut app, key(KeyCode::Char('3')), &tree);
        assert_eq!(app.session.nav.breadcrumbs(), vec!["Cat"]);
        handle_key(&mut app, key(KeyCode::Backspace), &tree);
        assert!(app.session.nav.history.is_empty());
        handle_key(&mut app, key(KeyCode::Char('z')), &tree);
        assert!(!app.should_quit);
        handle_key(&mut app, key(KeyCode::Char('q')), &tree);
        assert!(app.should_quit);
    }

    #[test]
    fn apply_quit_sets_flag() {
        let tree = bundled_tree().unwrap();
        let mut app = App::new(&tree);
        apply(&mut app, Transition::Quit);
        assert!(app.should_quit);
    }
}
