//! Pure rendering: map the session to ratatui widgets.
//!
//! State in, widgets out. The only effect is `Frame::render_widget()`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tree::Node;
use crate::validate::ValidTree;

use super::state::{App, Screen, Session};
use super::theme;

const APP_NAME: &str = "sanctuary-guide";

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the session to the terminal frame.
pub fn render(app: &App, tree: &ValidTree, frame: &mut Frame) {
    let session = &app.session;
    let chunks = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Min(0),    // step
        Constraint::Length(1), // notice
        Constraint::Length(1), // help
    ])
    .split(frame.area());

    frame.render_widget(render_title(session), chunks[0]);

    let node = tree.node(session.nav.current);
    match session.screen {
        Screen::Question { cursor } => render_question(node, cursor, frame, chunks[1]),
        Screen::Recommendation => render_recommendation(node, frame, chunks[1]),
    }

    if let Some(notice) = &session.notice {
        frame.render_widget(
            Paragraph::new(Span::styled(format!("! {}", notice), theme::STYLE_NOTICE)),
            chunks[2],
        );
    }
    frame.render_widget(render_help(&session.screen, session.nav.depth()), chunks[3]);
}

// ============================================================================
// SHARED LAYOUT
// ============================================================================

/// App name followed by the options taken so far.
fn render_title(session: &Session) -> Paragraph<'_> {
    let mut spans = vec![Span::styled(APP_NAME, theme::STYLE_TITLE)];
    for crumb in session.nav.breadcrumbs() {
        spans.push(Span::styled(" › ", theme::STYLE_DIM));
        spans.push(Span::styled(crumb, theme::STYLE_CRUMB));
    }
    Paragraph::new(Line::from(spans))
}

fn render_help(screen: &Screen, depth: usize) -> Paragraph<'static> {
    let help_text = match (screen, depth) {
        (Screen::Question { .. }, 0) => "[1-9] choose  [j/k] move  [Enter] select  [q] quit",
        (Screen::Question { .. }, _) => {
            "[1-9] choose  [j/k] move  [Enter] select  [b] back  [r] restart  [q] quit"
        }
        (Screen::Recommendation, _) => "[b] back  [r] start over  [q] quit",
    };
    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

fn prompt_lines(node: &Node) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from("")];
    for text in &node.prompt {
        lines.push(Line::from(Span::styled(format!("  {}", text), theme::STYLE_PROMPT)));
        lines.push(Line::from(""));
    }
    lines
}

// ============================================================================
// SCREEN: QUESTION
// ============================================================================

fn render_question(node: &Node, cursor: usize, frame: &mut Frame, area: Rect) {
    let mut lines = prompt_lines(node);

    for (i, choice) in node.choices().iter().enumerate() {
        let key = Span::styled(format!("  [{}] ", i + 1), theme::STYLE_INTERACTIVE);
        let line = if i == cursor {
            Line::from(vec![key, Span::styled(format!("> {}", choice.name), theme::STYLE_CURSOR)])
        } else {
            Line::from(vec![key, Span::raw(format!("  {}", choice.name))])
        };
        lines.push(line);
    }

    // Keep the highlighted option visible on short terminals.
    let cursor_row = lines.len() - node.choices().len() + cursor;
    let visible = area.height as usize;
    let scroll = (cursor_row + 1).saturating_sub(visible);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

// ============================================================================
// SCREEN: RECOMMENDATION
// ============================================================================

fn render_recommendation(node: &Node, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  What to do", theme::STYLE_TITLE)),
        Line::from(Span::styled("  ══════════", theme::STYLE_DIM)),
    ];
    lines.extend(
        prompt_lines(node)
            .into_iter()
            .map(|line| line.style(theme::STYLE_ADVICE)),
    );

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// TESTS
// ============================================================================
