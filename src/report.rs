//! Report formatting for validation runs, scripted walks and episode
//! arrangements.
//!
//! Pure functions: (data, OutputFormat) → String. No I/O.

use serde::Serialize;

use crate::episodes::Episode;
use crate::grouping::{Arrangement, Projection, anchor};
use crate::types::{OutputFormat, TreeReport, WalkReport};
use crate::validate::format_path;

/// Format the outcome of validating one or more trees.
pub fn format_tree_reports(reports: &[TreeReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => trees_human(reports),
        OutputFormat::Json => to_json(reports),
    }
}

/// Format where a scripted walk ended.
pub fn format_walk(report: &WalkReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => walk_human(report),
        OutputFormat::Json => to_json(report),
    }
}

/// Format an arranged episode catalogue.
///
/// With a group selected, only that group is listed.
pub fn format_arrangement(projection: &Projection<'_, Episode>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => arrangement_human(projection),
        OutputFormat::Json => to_json(&ArrangementView::from(projection)),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn trees_human(reports: &[TreeReport]) -> String {
    let mut out = String::new();

    for report in reports {
        out.push_str(&format!("=== {} ===\n", report.source));
        if let Some(digest) = &report.digest {
            out.push_str(&format!("Digest:    {}\n", digest.short()));
        }
        if let Some(stats) = &report.stats {
            out.push_str(&format!(
                "Nodes:     {} ({} terminal)\n",
                stats.nodes, stats.terminals
            ));
            out.push_str(&format!("Depth:     {}\n", stats.depth));
        }
        if report.is_valid() {
            out.push_str("Status:    valid\n");
        } else {
            out.push_str(&format!("Defects ({}):\n", report.defects.len()));
            for defect in &report.defects {
                out.push_str(&format!("  └─ {}\n", defect));
            }
        }
        out.push('\n');
    }

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    out.push_str("=== Summary ===\n");
    out.push_str(&format!("Trees checked: {}\n", reports.len()));
    out.push_str(&format!("Valid:         {}\n", reports.len() - invalid));
    out.push_str(&format!("With defects:  {}\n", invalid));
    out
}

fn walk_human(report: &WalkReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Path: {}\n\n", format_path(report.path.as_slice())));

    for line in &report.prompt {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    if report.terminal {
        out.push_str("(final recommendation)\n");
    } else {
        out.push_str("Options:\n");
        for (i, name) in report.options.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, name));
        }
    }
    out
}

fn arrangement_human(projection: &Projection<'_, Episode>) -> String {
    let mut out = format!("=== {} ===\n", projection.label);

    match (&projection.arrangement, projection.active_group()) {
        (_, Some(group)) => {
            out.push_str(&group_heading(&group.name, &projection.selection.strategy, &group.key));
            push_episodes(&mut out, &group.items);
        }
        (Arrangement::Flat(items), None) => push_episodes(&mut out, items),
        (Arrangement::Grouped(groups), None) => {
            for group in groups {
                out.push_str(&group_heading(&group.name, &projection.selection.strategy, &group.key));
                push_episodes(&mut out, &group.items);
            }
        }
    }

    out.push_str(&format!(
        "\n{} episodes\n",
        projection.arrangement.item_count()
    ));
    out
}

fn group_heading(name: &str, strategy: &str, key: &str) -> String {
    format!("--- {} [#{}] ---\n", name, anchor(strategy, key))
}

fn push_episodes(out: &mut String, episodes: &[&Episode]) {
    for episode in episodes {
        out.push_str(&format!(
            "  #{:<4} {}  ({})\n",
            episode.number,
            episode.edition,
            episode.broadcast.format("%Y-%m-%d")
        ));
    }
}

// ============================================================================
// JSON FORMAT
// ============================================================================

#[derive(Serialize)]
struct ArrangementView<'p> {
    strategy: &'p str,
    label: &'p str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'p str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    episodes: Option<&'p [&'p Episode]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<GroupView<'p>>>,
}

#[derive(Serialize)]
struct GroupView<'p> {
    key: &'p str,
    name: &'p str,
    anchor: String,
    episodes: &'p [&'p Episode],
}

impl<'p> From<&'p Projection<'_, Episode>> for ArrangementView<'p> {
    fn from(projection: &'p Projection<'_, Episode>) -> Self {
        let strategy = projection.selection.strategy.as_str();
        let group_view = |key: &'p str, name: &'p str, episodes: &'p [&'p Episode]| GroupView {
            key,
            name,
            anchor: anchor(strategy, key),
            episodes,
        };

        let (episodes, groups) = match (&projection.arrangement, projection.active_group()) {
            (_, Some(group)) => (
                None,
                Some(vec![group_view(&group.key, &group.name, &group.items)]),
            ),
            (Arrangement::Flat(items), None) => (Some(items.as_slice()), None),
            (Arrangement::Grouped(groups), None) => (
                None,
                Some(
                    groups
                        .iter()
                        .map(|g| group_view(&g.key, &g.name, &g.items))
                        .collect(),
                ),
            ),
        };

        ArrangementView {
            strategy,
            label: &projection.label,
            group: projection.selection.group.as_deref(),
            episodes,
            groups,
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

// ============================================================================
// TESTS
// ============================================================================
