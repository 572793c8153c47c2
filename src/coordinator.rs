//! Workflow orchestration: load -> clean -> score -> aggregate -> persist.
//!
//! The coordinator holds no state beyond its injected collaborators. It
//! sequences the pipeline, isolates per-subject failures, and surfaces the
//! final ranked result and the eviction prediction.

use tracing::info;

use crate::cleaner::RecordCleaner;
use crate::config::Config;
use crate::error::Result;
use crate::loader::RecordLoader;
use crate::output;
use crate::rating::{RankedResult, RatingCalculator};
use crate::sentiment::{LexiconModel, ScoredRecordSet, SentimentScorer};

/// Drives the full analysis workflow from explicitly injected collaborators.
pub struct AnalysisCoordinator {
    config: Config,
    loader: RecordLoader,
    cleaner: RecordCleaner,
    scorer: SentimentScorer,
    calculator: RatingCalculator,
}

impl AnalysisCoordinator {
    /// Builds a coordinator from already-constructed collaborators. No
    /// hidden defaults; tests can substitute any subset.
    pub fn new(
        config: Config,
        loader: RecordLoader,
        cleaner: RecordCleaner,
        scorer: SentimentScorer,
        calculator: RatingCalculator,
    ) -> Self {
        AnalysisCoordinator {
            config,
            loader,
            cleaner,
            scorer,
            calculator,
        }
    }

    /// Builds the stock pipeline for the given config, with the built-in
    /// lexicon model as the scoring backend.
    pub fn with_defaults(config: Config) -> Self {
        let loader = RecordLoader::new(config.clone());
        let scorer = SentimentScorer::new(Box::new(LexiconModel::new()));

        AnalysisCoordinator::new(
            config,
            loader,
            RecordCleaner::new(),
            scorer,
            RatingCalculator::new(),
        )
    }

    /// Runs the complete analysis workflow and writes the ratings artifacts.
    ///
    /// Per-subject failures during load, clean, and aggregation are logged
    /// and skipped; conditions that leave zero subjects abort with a named
    /// error.
    pub fn run_analysis(&self) -> Result<RankedResult> {
        info!("Starting sentiment analysis workflow");

        self.config.validate_paths()?;

        let raw_sets = self.loader.load_all()?;
        let cleaned = self.cleaner.clean_all(raw_sets);

        let scored: Vec<ScoredRecordSet> = cleaned
            .into_iter()
            .map(|set| {
                let scored = self.scorer.score_set(set);

                if let Some(stats) = SentimentScorer::statistics(&scored) {
                    info!(
                        subject = %scored.subject_id(),
                        mean = stats.mean,
                        positive_ratio = stats.positive_ratio,
                        negative_ratio = stats.negative_ratio,
                        "Subject sentiment"
                    );
                }

                scored
            })
            .collect();

        let result = self.calculator.calculate_all(&scored)?;

        output::write_ratings_csv(&self.config.ratings_csv_path(), &result)?;
        output::write_ratings_json(&self.config.ratings_json_path(), &result)?;

        info!(subjects = result.subject_count(), "Analysis workflow completed");

        Ok(result)
    }

    /// The subject most likely to be evicted: lowest normalized rating.
    /// `None` when the result is empty.
    pub fn get_eviction_prediction(&self, result: &RankedResult) -> Option<(String, f64)> {
        let prediction = result
            .get_lowest_rated()
            .map(|(name, rating)| (name.to_string(), rating));

        if let Some((name, rating)) = &prediction {
            info!(subject = %name, rating, "Eviction prediction");
        }

        prediction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_eviction_prediction_is_lowest_rated() {
        let config = Config::new("unused", "unused_out");
        let coordinator = AnalysisCoordinator::with_defaults(config);

        let mut ratings = BTreeMap::new();
        ratings.insert("Ozo".to_string(), 70.0);
        ratings.insert("Dorathy".to_string(), 30.0);

        let result = RankedResult {
            ratings,
            raw_scores: BTreeMap::new(),
            counts: BTreeMap::new(),
        };

        let prediction = coordinator.get_eviction_prediction(&result).unwrap();
        assert_eq!(prediction.0, "Dorathy");
        assert_eq!(prediction.1, 30.0);
    }

    #[test]
    fn test_eviction_prediction_empty_result() {
        let config = Config::new("unused", "unused_out");
        let coordinator = AnalysisCoordinator::with_defaults(config);

        assert!(coordinator
            .get_eviction_prediction(&RankedResult::default())
            .is_none());
    }
}
