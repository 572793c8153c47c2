//! Output formatting and persistence for ranked results.
//!
//! Writes the subject -> rating mapping the chart consumers expect as CSV
//! and JSON artifacts, and prints the human-readable ranked summary.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::rating::RankedResult;

/// JSON artifact shape: the full result plus a generation timestamp.
#[derive(Serialize)]
struct RatingsArtifact<'a> {
    generated_at: DateTime<Utc>,
    ratings: &'a BTreeMap<String, f64>,
    raw_scores: &'a BTreeMap<String, f64>,
    counts: &'a BTreeMap<String, usize>,
}

/// Writes the ranked result as a CSV file, one row per subject, sorted by
/// rating descending. Overwrites any existing file.
pub fn write_ratings_csv(path: &Path, result: &RankedResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["subject", "rating", "raw_score", "tweet_count"])?;

    for (subject, rating) in result.sorted_ratings() {
        let raw = result.raw_scores.get(subject).copied().unwrap_or(0.0);
        let count = result.counts.get(subject).copied().unwrap_or(0);

        writer.write_record([
            subject.to_string(),
            format!("{rating:.4}"),
            format!("{raw:.4}"),
            count.to_string(),
        ])?;
    }

    writer.flush()?;
    info!(path = %path.display(), "Ratings CSV written");

    Ok(())
}

/// Writes the ranked result as a pretty-printed JSON artifact.
pub fn write_ratings_json(path: &Path, result: &RankedResult) -> Result<()> {
    let artifact = RatingsArtifact {
        generated_at: Utc::now(),
        ratings: &result.ratings,
        raw_scores: &result.raw_scores,
        counts: &result.counts,
    };

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &artifact)?;

    info!(path = %path.display(), "Ratings JSON written");
    Ok(())
}

/// Prints the ranked summary table to stdout.
pub fn print_summary(result: &RankedResult) {
    println!("\n{:=<58}", "");
    println!(
        "{:<4} {:<20} {:>10} {:>11} {:>8}",
        "#", "subject", "rating %", "raw score", "tweets"
    );
    println!("{:-<58}", "");

    for (rank, (subject, rating)) in result.sorted_ratings().iter().enumerate() {
        let raw = result.raw_scores.get(*subject).copied().unwrap_or(0.0);
        let count = result.counts.get(*subject).copied().unwrap_or(0);

        println!(
            "{:<4} {:<20} {:>10.2} {:>11.4} {:>8}",
            rank + 1,
            subject,
            rating,
            raw,
            count
        );
    }

    println!("{:=<58}\n", "");
}
