//! Sentiment scoring of cleaned records.
//!
//! The actual text-to-score model is an injected capability behind the
//! [`SentimentModel`] trait, so the pipeline can run against any backend
//! and tests can use a deterministic fake. A small valence-lexicon model
//! ships as the stock backend.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::cleaner::CleanedRecordSet;

/// Threshold above which a compound score counts as a positive post, and
/// below whose negation it counts as negative.
const COMPOUND_THRESHOLD: f64 = 0.05;

/// Four-part sentiment score for one text. Components sum to 1.0 within
/// floating tolerance; `compound` is in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
    pub compound: f64,
}

impl SentimentScore {
    /// The neutral default substituted when the scoring backend fails.
    pub fn neutral() -> Self {
        SentimentScore {
            negative: 0.0,
            neutral: 1.0,
            positive: 0.0,
            compound: 0.0,
        }
    }
}

/// Injected scoring capability: maps free text to a [`SentimentScore`].
pub trait SentimentModel {
    fn score(&self, text: &str) -> anyhow::Result<SentimentScore>;
}

/// One cleaned record plus its sentiment score.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub date: String,
    pub text: String,
    pub authority: String,
    pub score: SentimentScore,
}

/// Scored records for one subject.
#[derive(Debug)]
pub struct ScoredRecordSet {
    subject_id: String,
    rows: Vec<ScoredRow>,
}

impl ScoredRecordSet {
    pub fn new(subject_id: impl Into<String>, rows: Vec<ScoredRow>) -> Self {
        ScoredRecordSet {
            subject_id: subject_id.into(),
            rows,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compound scores in row order.
    pub fn compound_scores(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.score.compound).collect()
    }
}

/// Summary statistics over a subject's compound scores.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of posts with compound > 0.05.
    pub positive_ratio: f64,
    /// Fraction of posts with compound < -0.05.
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub(crate) fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Applies an injected [`SentimentModel`] to cleaned records.
pub struct SentimentScorer {
    model: Box<dyn SentimentModel>,
}

impl SentimentScorer {
    pub fn new(model: Box<dyn SentimentModel>) -> Self {
        SentimentScorer { model }
    }

    /// Scores every row in the set. A model failure on one row substitutes
    /// the neutral default for that row only and never fails the subject.
    pub fn score_set(&self, set: CleanedRecordSet) -> ScoredRecordSet {
        let (subject_id, rows) = set.into_parts();

        let scored: Vec<ScoredRow> = rows
            .into_iter()
            .map(|row| {
                let score = match self.model.score(&row.text) {
                    Ok(score) => score,
                    Err(e) => {
                        warn!(subject = %subject_id, error = %e, "Scoring failed for post, using neutral score");
                        SentimentScore::neutral()
                    }
                };

                ScoredRow {
                    date: row.date,
                    text: row.text,
                    authority: row.authority,
                    score,
                }
            })
            .collect();

        ScoredRecordSet::new(subject_id, scored)
    }

    /// Summary statistics over a scored set's compound scores, or `None`
    /// when the set is empty.
    pub fn statistics(set: &ScoredRecordSet) -> Option<SentimentStats> {
        let compounds = set.compound_scores();
        if compounds.is_empty() {
            return None;
        }

        let total = compounds.len();
        let avg = mean(&compounds);

        let mut sorted = compounds.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let positive = compounds
            .iter()
            .filter(|&&c| c > COMPOUND_THRESHOLD)
            .count();
        let negative = compounds
            .iter()
            .filter(|&&c| c < -COMPOUND_THRESHOLD)
            .count();
        let neutral = total - positive - negative;

        Some(SentimentStats {
            mean: avg,
            median: median(&sorted),
            std_dev: stddev(&compounds, avg),
            min: sorted[0],
            max: sorted[total - 1],
            positive_ratio: positive as f64 / total as f64,
            negative_ratio: negative as f64 / total as f64,
            neutral_ratio: neutral as f64 / total as f64,
        })
    }
}

/// Valence entries for the stock lexicon model. Values are in [-1, 1].
static LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.7),
    ("authentic", 0.5),
    ("awful", -0.7),
    ("best", 0.7),
    ("boring", -0.5),
    ("deserve", 0.4),
    ("deserves", 0.4),
    ("disappointing", -0.6),
    ("evict", -0.6),
    ("evicted", -0.6),
    ("fake", -0.6),
    ("fantastic", 0.7),
    ("genuine", 0.5),
    ("great", 0.6),
    ("hate", -0.8),
    ("impressed", 0.5),
    ("leave", -0.4),
    ("losing", -0.5),
    ("love", 0.8),
    ("perfect", 0.7),
    ("proud", 0.6),
    ("terrible", -0.7),
    ("weak", -0.5),
    ("win", 0.6),
    ("winner", 0.6),
    ("worst", -0.8),
];

/// Normalization constant for the compound score, dampening short texts.
const COMPOUND_ALPHA: f64 = 15.0;

/// Stock scoring backend: a small valence lexicon over lowercased,
/// punctuation-trimmed tokens. Deterministic, no external data files.
pub struct LexiconModel {
    lexicon: HashMap<&'static str, f64>,
}

impl LexiconModel {
    pub fn new() -> Self {
        LexiconModel {
            lexicon: LEXICON.iter().copied().collect(),
        }
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        LexiconModel::new()
    }
}

impl SentimentModel for LexiconModel {
    fn score(&self, text: &str) -> anyhow::Result<SentimentScore> {
        let mut positive_sum = 0.0;
        let mut negative_sum = 0.0;
        let mut positive_hits = 0usize;
        let mut negative_hits = 0usize;
        let mut tokens = 0usize;

        for word in text.split_whitespace() {
            let token = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            tokens += 1;

            if let Some(&valence) = self.lexicon.get(token.as_str()) {
                if valence > 0.0 {
                    positive_sum += valence;
                    positive_hits += 1;
                } else {
                    negative_sum += -valence;
                    negative_hits += 1;
                }
            }
        }

        if tokens == 0 {
            return Ok(SentimentScore::neutral());
        }

        let valence_total = positive_sum - negative_sum;
        let compound = valence_total / (valence_total * valence_total + COMPOUND_ALPHA).sqrt();

        let positive = positive_hits as f64 / tokens as f64;
        let negative = negative_hits as f64 / tokens as f64;

        Ok(SentimentScore {
            negative,
            neutral: 1.0 - positive - negative,
            positive,
            compound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::{CleanRow, CleanedRecordSet};
    use anyhow::anyhow;

    fn clean_row(text: &str) -> CleanRow {
        CleanRow {
            date: "2020-08-01".to_string(),
            text: text.to_string(),
            authority: "twitter.com".to_string(),
        }
    }

    fn scored_set(compounds: &[f64]) -> ScoredRecordSet {
        let rows = compounds
            .iter()
            .map(|&c| ScoredRow {
                date: "2020-08-01".to_string(),
                text: "t".to_string(),
                authority: "twitter.com".to_string(),
                score: SentimentScore {
                    negative: 0.0,
                    neutral: 1.0,
                    positive: 0.0,
                    compound: c,
                },
            })
            .collect();
        ScoredRecordSet::new("Ozo", rows)
    }

    /// Model that fails on every text.
    struct FailingModel;

    impl SentimentModel for FailingModel {
        fn score(&self, _text: &str) -> anyhow::Result<SentimentScore> {
            Err(anyhow!("backend unavailable"))
        }
    }

    #[test]
    fn test_model_failure_substitutes_neutral() {
        let scorer = SentimentScorer::new(Box::new(FailingModel));
        let set = CleanedRecordSet::new("Ozo", vec![clean_row("hello"), clean_row("world")]);

        let scored = scorer.score_set(set);

        assert_eq!(scored.row_count(), 2);
        for row in scored.rows() {
            assert_eq!(row.score, SentimentScore::neutral());
        }
    }

    #[test]
    fn test_statistics_empty_set_is_none() {
        let set = ScoredRecordSet::new("Ozo", vec![]);
        assert!(SentimentScorer::statistics(&set).is_none());
    }

    #[test]
    fn test_statistics_values() {
        let set = scored_set(&[0.5, -0.5, 0.2, 0.0]);
        let stats = SentimentScorer::statistics(&set).unwrap();

        assert!((stats.mean - 0.05).abs() < 1e-9);
        assert!((stats.median - 0.1).abs() < 1e-9);
        assert_eq!(stats.min, -0.5);
        assert_eq!(stats.max, 0.5);
        assert!((stats.positive_ratio - 0.5).abs() < 1e-9);
        assert!((stats.negative_ratio - 0.25).abs() < 1e-9);
        assert!((stats.neutral_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_ratio_thresholds() {
        // 0.05 and -0.05 exactly are neutral, not positive/negative.
        let set = scored_set(&[0.05, -0.05]);
        let stats = SentimentScorer::statistics(&set).unwrap();

        assert_eq!(stats.positive_ratio, 0.0);
        assert_eq!(stats.negative_ratio, 0.0);
        assert_eq!(stats.neutral_ratio, 1.0);
    }

    #[test]
    fn test_statistics_median_odd_count() {
        let set = scored_set(&[0.9, -0.3, 0.1]);
        let stats = SentimentScorer::statistics(&set).unwrap();
        assert!((stats.median - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_lexicon_positive_text() {
        let model = LexiconModel::new();
        let score = model.score("I love this, best housemate ever").unwrap();

        assert!(score.compound > 0.0);
        assert!(score.positive > 0.0);
        assert!(score.compound <= 1.0);
    }

    #[test]
    fn test_lexicon_negative_text() {
        let model = LexiconModel::new();
        let score = model.score("terrible and fake, should be evicted").unwrap();

        assert!(score.compound < 0.0);
        assert!(score.negative > 0.0);
        assert!(score.compound >= -1.0);
    }

    #[test]
    fn test_lexicon_empty_text_is_neutral() {
        let model = LexiconModel::new();
        assert_eq!(model.score("").unwrap(), SentimentScore::neutral());
    }

    #[test]
    fn test_lexicon_components_sum_to_one() {
        let model = LexiconModel::new();
        let score = model.score("love the great winner, hate the fake drama").unwrap();

        let sum = score.negative + score.neutral + score.positive;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lexicon_is_deterministic() {
        let model = LexiconModel::new();
        let a = model.score("such an amazing winner").unwrap();
        let b = model.score("such an amazing winner").unwrap();
        assert_eq!(a, b);
    }
}
