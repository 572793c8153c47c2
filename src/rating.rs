//! Rating aggregation and normalization.
//!
//! Two-pass: collect one raw rating (mean compound score) per subject,
//! then rescale all raw ratings into percentages summing to 100.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::sentiment::{ScoredRecordSet, mean};

/// Raw rating for one subject before normalization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubjectRating {
    /// Mean compound score over the subject's retained posts.
    pub raw_score: f64,
    pub tweet_count: usize,
}

/// Final ranked result across all rated subjects.
///
/// The three maps always share the same key set, and the normalized ratings
/// sum to 100 within floating tolerance whenever the result is non-empty.
/// `BTreeMap` keeps iteration deterministic; ties are broken by the map's
/// iteration order.
#[derive(Debug, Default, Serialize)]
pub struct RankedResult {
    /// Normalized percentage rating per subject.
    pub ratings: BTreeMap<String, f64>,
    /// Raw mean compound score per subject.
    pub raw_scores: BTreeMap<String, f64>,
    /// Retained post count per subject.
    pub counts: BTreeMap<String, usize>,
}

impl RankedResult {
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn subject_count(&self) -> usize {
        self.ratings.len()
    }

    /// The subject with the lowest normalized rating, or `None` on an empty
    /// result. Ties keep the first-encountered subject.
    pub fn get_lowest_rated(&self) -> Option<(&str, f64)> {
        self.ratings
            .iter()
            .fold(None, |best, (name, &rating)| match best {
                Some((_, lowest)) if rating >= lowest => best,
                _ => Some((name.as_str(), rating)),
            })
    }

    /// The subject with the highest normalized rating, or `None` on an empty
    /// result. Ties keep the first-encountered subject.
    pub fn get_highest_rated(&self) -> Option<(&str, f64)> {
        self.ratings
            .iter()
            .fold(None, |best, (name, &rating)| match best {
                Some((_, highest)) if rating <= highest => best,
                _ => Some((name.as_str(), rating)),
            })
    }

    /// All ratings sorted descending, for display and chart consumers.
    pub fn sorted_ratings(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .ratings
            .iter()
            .map(|(name, &rating)| (name.as_str(), rating))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }
}

/// Computes per-subject raw ratings and normalizes them across the batch.
pub struct RatingCalculator;

impl RatingCalculator {
    pub fn new() -> Self {
        RatingCalculator
    }

    /// Mean compound score for one subject. A subject with zero scoreable
    /// rows cannot be rated; the batch level logs and skips it.
    pub fn raw_rating(&self, set: &ScoredRecordSet) -> Result<SubjectRating> {
        if set.is_empty() {
            return Err(Error::EmptyInput(set.subject_id().to_string()));
        }

        let compounds = set.compound_scores();
        let raw_score = mean(&compounds);

        info!(
            subject = %set.subject_id(),
            raw_score,
            tweets = compounds.len(),
            "Raw rating calculated"
        );

        Ok(SubjectRating {
            raw_score,
            tweet_count: compounds.len(),
        })
    }

    /// Rescales raw ratings into percentages summing to 100.
    ///
    /// When every raw rating is exactly zero, each subject gets an equal
    /// share. Otherwise each share is `(raw / total) * 100`, unclamped:
    /// with negative raw scores an individual share can leave [0, 100]
    /// even though the set still sums to 100. That is a documented property
    /// of the linear-share formula, not a bug.
    pub fn normalize(&self, raw_scores: &BTreeMap<String, f64>) -> Result<BTreeMap<String, f64>> {
        if raw_scores.is_empty() {
            return Err(Error::NoRatableSubjects);
        }

        let total: f64 = raw_scores.values().sum();

        if total == 0.0 {
            warn!("Total raw rating is zero, using equal distribution");
            let equal_share = 100.0 / raw_scores.len() as f64;
            return Ok(raw_scores
                .keys()
                .map(|name| (name.clone(), equal_share))
                .collect());
        }

        Ok(raw_scores
            .iter()
            .map(|(name, &raw)| (name.clone(), (raw / total) * 100.0))
            .collect())
    }

    /// Two-pass batch aggregation: collect every subject's raw rating
    /// (skipping empty subjects with a warning), then normalize.
    pub fn calculate_all(&self, scored_sets: &[ScoredRecordSet]) -> Result<RankedResult> {
        let mut raw_scores = BTreeMap::new();
        let mut counts = BTreeMap::new();

        for set in scored_sets {
            match self.raw_rating(set) {
                Ok(rating) => {
                    raw_scores.insert(set.subject_id().to_string(), rating.raw_score);
                    counts.insert(set.subject_id().to_string(), rating.tweet_count);
                }
                Err(e) => {
                    warn!(subject = %set.subject_id(), error = %e, "Skipping unratable subject");
                }
            }
        }

        let ratings = self.normalize(&raw_scores)?;

        info!(subjects = ratings.len(), "Ratings normalized");

        Ok(RankedResult {
            ratings,
            raw_scores,
            counts,
        })
    }
}

impl Default for RatingCalculator {
    fn default() -> Self {
        RatingCalculator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{ScoredRow, SentimentScore};

    fn scored_set(subject: &str, compounds: &[f64]) -> ScoredRecordSet {
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
        ScoredRecordSet::new(subject, rows)
    }

    fn raw_map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(name, raw)| (name.to_string(), *raw))
            .collect()
    }

    #[test]
    fn test_raw_rating_is_mean_compound() {
        let calc = RatingCalculator::new();
        let rating = calc.raw_rating(&scored_set("Ozo", &[0.5, 0.3, -0.2])).unwrap();

        assert!((rating.raw_score - 0.2).abs() < 1e-9);
        assert_eq!(rating.tweet_count, 3);
    }

    #[test]
    fn test_raw_rating_empty_set_fails() {
        let calc = RatingCalculator::new();
        let err = calc.raw_rating(&scored_set("Ozo", &[])).unwrap_err();

        assert!(matches!(err, Error::EmptyInput(name) if name == "Ozo"));
    }

    #[test]
    fn test_normalize_sums_to_100() {
        let calc = RatingCalculator::new();
        let normalized = calc
            .normalize(&raw_map(&[("A", 0.4), ("B", 0.1), ("C", 0.25)]))
            .unwrap();

        let sum: f64 = normalized.values().sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_all_zero_gives_equal_shares() {
        let calc = RatingCalculator::new();
        let normalized = calc.normalize(&raw_map(&[("A", 0.0), ("B", 0.0)])).unwrap();

        assert_eq!(normalized["A"], 50.0);
        assert_eq!(normalized["B"], 50.0);
    }

    #[test]
    fn test_normalize_negative_total() {
        let calc = RatingCalculator::new();
        let normalized = calc
            .normalize(&raw_map(&[("A", -0.5), ("B", -0.3)]))
            .unwrap();

        assert!((normalized["A"] - 62.5).abs() < 1e-9);
        assert!((normalized["B"] - 37.5).abs() < 1e-9);

        let sum: f64 = normalized.values().sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_shares_are_unclamped() {
        // Mixed signs can push an individual share outside [0, 100]
        // while the set still sums to 100.
        let calc = RatingCalculator::new();
        let normalized = calc.normalize(&raw_map(&[("A", 0.5), ("B", -0.1)])).unwrap();

        assert!((normalized["A"] - 125.0).abs() < 1e-9);
        assert!((normalized["B"] + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_empty_map_fails() {
        let calc = RatingCalculator::new();
        assert!(matches!(
            calc.normalize(&BTreeMap::new()),
            Err(Error::NoRatableSubjects)
        ));
    }

    #[test]
    fn test_calculate_all_skips_empty_subjects() {
        let calc = RatingCalculator::new();
        let sets = vec![
            scored_set("A", &[0.5, 0.5]),
            scored_set("B", &[]),
            scored_set("C", &[0.5]),
        ];

        let result = calc.calculate_all(&sets).unwrap();

        assert_eq!(result.subject_count(), 2);
        assert!(!result.ratings.contains_key("B"));
        assert_eq!(result.counts["A"], 2);
        assert_eq!(result.counts["C"], 1);
    }

    #[test]
    fn test_calculate_all_no_survivors_fails() {
        let calc = RatingCalculator::new();
        let sets = vec![scored_set("A", &[]), scored_set("B", &[])];

        assert!(matches!(
            calc.calculate_all(&sets),
            Err(Error::NoRatableSubjects)
        ));
    }

    #[test]
    fn test_calculate_all_key_sets_match() {
        let calc = RatingCalculator::new();
        let sets = vec![scored_set("A", &[0.2]), scored_set("B", &[0.4])];

        let result = calc.calculate_all(&sets).unwrap();

        let keys: Vec<_> = result.ratings.keys().collect();
        assert_eq!(keys, result.raw_scores.keys().collect::<Vec<_>>());
        assert_eq!(keys, result.counts.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_lowest_and_highest_rated() {
        let result = RankedResult {
            ratings: raw_map(&[("A", 60.0), ("B", 15.0), ("C", 25.0)]),
            raw_scores: BTreeMap::new(),
            counts: BTreeMap::new(),
        };

        assert_eq!(result.get_lowest_rated(), Some(("B", 15.0)));
        assert_eq!(result.get_highest_rated(), Some(("A", 60.0)));
    }

    #[test]
    fn test_lowest_rated_tie_keeps_first_encountered() {
        let result = RankedResult {
            ratings: raw_map(&[("A", 50.0), ("B", 50.0)]),
            raw_scores: BTreeMap::new(),
            counts: BTreeMap::new(),
        };

        // BTreeMap iterates alphabetically, so A comes first.
        assert_eq!(result.get_lowest_rated(), Some(("A", 50.0)));
    }

    #[test]
    fn test_empty_result_queries_return_none() {
        let result = RankedResult::default();
        assert!(result.get_lowest_rated().is_none());
        assert!(result.get_highest_rated().is_none());
    }

    #[test]
    fn test_sorted_ratings_descending() {
        let result = RankedResult {
            ratings: raw_map(&[("A", 10.0), ("B", 70.0), ("C", 20.0)]),
            raw_scores: BTreeMap::new(),
            counts: BTreeMap::new(),
        };

        let sorted = result.sorted_ratings();
        assert_eq!(sorted, vec![("B", 70.0), ("C", 20.0), ("A", 10.0)]);
    }
}
