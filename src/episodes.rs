//! Episode catalogue and its sort/group strategies.
//!
//! Only what the grouping engine needs: number, edition title, broadcast
//! time, and the classification of the featured ambassador.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::grouping::{Arrangement, StrategyRegistry, group_by};

/// Key of the strategy that keeps catalogue order.
pub const ALL: &str = "all";
/// Key of the strategy grouping by featured classification.
pub const CLASSIFICATION: &str = "classification";
/// Key of the strategy grouping by broadcast year.
pub const BROADCAST: &str = "broadcast";

// ============================================================================
// TYPES
// ============================================================================

/// Taxonomic class of an episode's featured ambassador.
///
/// Declaration order is display order when grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Mammalia,
    Aves,
    Reptilia,
    Amphibia,
    Actinopterygii,
    Arachnida,
    Insecta,
    Chilopoda,
    Diplopoda,
    Gastropoda,
    Malacostraca,
}

impl Classification {
    /// Plain-English group name.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Mammalia => "Mammals",
            Classification::Aves => "Birds",
            Classification::Reptilia => "Reptiles",
            Classification::Amphibia => "Amphibians",
            Classification::Actinopterygii => "Fish",
            Classification::Arachnida => "Arachnids",
            Classification::Insecta => "Insects",
            Classification::Chilopoda => "Centipedes",
            Classification::Diplopoda => "Millipedes",
            Classification::Gastropoda => "Snails",
            Classification::Malacostraca => "Crustaceans",
        }
    }
}

/// An episode as stored in the catalogue file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EpisodeRecord {
    pub edition: String,
    pub broadcast: DateTime<Utc>,
    pub classification: Classification,
}

/// A numbered episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    /// 1-based position in broadcast order.
    pub number: u32,
    pub edition: String,
    pub broadcast: DateTime<Utc>,
    pub classification: Classification,
}

// ============================================================================
// CATALOGUE
// ============================================================================

/// Number records from file order (first is episode 1), newest first.
pub fn catalogue(records: Vec<EpisodeRecord>) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = records
        .into_iter()
        .zip(1u32..)
        .map(|(record, number)| Episode {
            number,
            edition: record.edition,
            broadcast: record.broadcast,
            classification: record.classification,
        })
        .collect();
    episodes.reverse();
    episodes
}

/// The standard strategies, in picker order.
pub fn strategies() -> StrategyRegistry<Episode> {
    StrategyRegistry::new()
        .with(ALL, "All Episodes", all)
        .with(CLASSIFICATION, "Ambassador Classification", by_classification)
        .with(BROADCAST, "Broadcast Date", by_broadcast)
}

fn all(episodes: &[Episode]) -> Arrangement<'_, Episode> {
    Arrangement::Flat(episodes.iter().collect())
}

/// Classification order, then newest episode first.
fn by_classification(episodes: &[Episode]) -> Arrangement<'_, Episode> {
    let mut sorted: Vec<&Episode> = episodes.iter().collect();
    sorted.sort_by(|a, b| {
        a.classification
            .cmp(&b.classification)
            .then(b.number.cmp(&a.number))
    });

    Arrangement::Grouped(group_by(sorted, |episode| {
        let label = episode.classification.label();
        (slug(label), label.to_string())
    }))
}

/// Newest broadcast first, grouped by UTC year.
fn by_broadcast(episodes: &[Episode]) -> Arrangement<'_, Episode> {
    let mut sorted: Vec<&Episode> = episodes.iter().collect();
    sorted.sort_by(|a, b| {
        b.broadcast
            .cmp(&a.broadcast)
            .then(b.number.cmp(&a.number))
    });

    Arrangement::Grouped(group_by(sorted, |episode| {
        let year = episode.broadcast.year().to_string();
        (year.clone(), year)
    }))
}

/// Lowercase, ASCII alphanumerics kept, every other run becomes one dash.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
