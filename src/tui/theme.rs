//! TUI color semantics and style constants.
//!
//! - Cyan: interactive elements (option numbers)
//! - Green: the final recommendation
//! - Yellow: notices about rejected actions
//! - Dim: de-emphasized (separators, help)

use ratatui::style::{Color, Modifier, Style};

/// Title bar.
pub const STYLE_TITLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

/// Options taken so far, in the title bar.
pub const STYLE_CRUMB: Style = Style::new().fg(Color::Cyan);

/// Question and advice text.
pub const STYLE_PROMPT: Style = Style::new().add_modifier(Modifier::BOLD);

/// Recommendation lines.
pub const STYLE_ADVICE: Style = Style::new().fg(Color::Green);

/// Option numbers.
pub const STYLE_INTERACTIVE: Style = Style::new().fg(Color::Cyan);

/// Highlighted option.
pub const STYLE_CURSOR: Style = Style::new().add_modifier(Modifier::REVERSED);

/// Rejected action.
pub const STYLE_NOTICE: Style = Style::new().fg(Color::Yellow);

pub const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);
