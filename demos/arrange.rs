//! Arrange a small catalogue - run with: cargo run --example arrange [fragment]
//!
//! The fragment is a shared link such as "classification:birds".

use std::env;

use chrono::{TimeZone, Utc};

use sanctuary_guide::episodes::{self, Classification, EpisodeRecord, catalogue, strategies};
use sanctuary_guide::grouping::{Selection, arrange};
use sanctuary_guide::report::format_arrangement;
use sanctuary_guide::types::OutputFormat;

fn record(edition: &str, year: i32, month: u32, classification: Classification) -> EpisodeRecord {
    EpisodeRecord {
        edition: edition.to_string(),
        broadcast: Utc
            .with_ymd_and_hms(year, month, 1, 18, 0, 0)
            .single()
            .unwrap_or_default(),
        classification,
    }
}

fn main() {
    let items = catalogue(vec![
        record("Barn Owl Edition", 2021, 3, Classification::Aves),
        record("Red Fox Edition", 2021, 9, Classification::Mammalia),
        record("Corn Snake Edition", 2022, 2, Classification::Reptilia),
        record("Crow Edition", 2022, 6, Classification::Aves),
        record("Tree Frog Edition", 2023, 4, Classification::Amphibia),
    ]);

    let selection = env::args()
        .nth(1)
        .and_then(|fragment| Selection::parse(&fragment))
        .unwrap_or_else(|| Selection::new(episodes::CLASSIFICATION));

    let registry = strategies();
    println!("Strategies:");
    for (key, label) in registry.picker() {
        println!("  {:<16} {}", key, label);
    }
    println!();

    match arrange(&items, &registry, &selection) {
        Ok(projection) => {
            print!("{}", format_arrangement(&projection, OutputFormat::Human));
            println!();
            println!("Links:");
            for (group, anchor) in projection.anchors() {
                println!("  {:<10} #{}", group, anchor);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}
