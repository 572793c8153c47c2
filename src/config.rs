//! Application configuration: input/output paths and schema constants.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Columns every subject CSV must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "tweet", "urls"];

/// Extension of subject data files, matched case-insensitively.
pub const DATA_FILE_EXTENSION: &str = "csv";

/// The primary-source domain. Posts whose extracted URL authority is any
/// other (longer) domain are treated as likely ads and dropped.
pub const PRIMARY_DOMAIN: &str = "twitter.com";

/// Paths used by the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing one CSV file per subject.
    pub data_path: PathBuf,
    /// Directory receiving ratings artifacts. Created on demand.
    pub output_path: PathBuf,
}

impl Config {
    pub const DEFAULT_DATA_PATH: &str = "scraped_tweets";
    pub const DEFAULT_OUTPUT_PATH: &str = "analysis_results";

    pub fn new(data_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Config {
            data_path: data_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Full path of the ratings CSV artifact.
    pub fn ratings_csv_path(&self) -> PathBuf {
        self.output_path.join("ratings.csv")
    }

    /// Full path of the ratings JSON artifact.
    pub fn ratings_json_path(&self) -> PathBuf {
        self.output_path.join("ratings.json")
    }

    /// Checks that the data path is an existing directory and creates the
    /// output directory if it does not exist yet.
    pub fn validate_paths(&self) -> Result<()> {
        if !self.data_path.exists() {
            return Err(Error::DataPathNotFound(self.data_path.clone()));
        }

        if !self.data_path.is_dir() {
            return Err(Error::NotADirectory(self.data_path.clone()));
        }

        std::fs::create_dir_all(&self.output_path)?;
        debug!(output_path = %self.output_path.display(), "Output directory ready");

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Self::DEFAULT_DATA_PATH, Self::DEFAULT_OUTPUT_PATH)
    }
}
