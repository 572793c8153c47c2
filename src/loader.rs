//! Subject CSV discovery and loading.
//!
//! One CSV file per subject; the subject identifier is the file stem,
//! case preserved. Files that are unreadable, empty, or missing required
//! columns are logged and skipped so the remaining subjects still load.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::{Config, DATA_FILE_EXTENSION, REQUIRED_COLUMNS};
use crate::error::{Error, Result};

/// One raw record as read from a subject CSV, projected to the required
/// columns. Other columns are discarded at parse time.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub date: String,
    pub text: String,
    pub url_field: String,
}

/// All raw records for one subject. Immutable once constructed; the
/// cleaning stage consumes it by value.
#[derive(Debug)]
pub struct RawRecordSet {
    subject_id: String,
    rows: Vec<RawRow>,
    source_ref: String,
}

impl RawRecordSet {
    /// Builds a record set. An empty row list is a load-time error, not a
    /// valid entity.
    pub fn new(
        subject_id: impl Into<String>,
        rows: Vec<RawRow>,
        source_ref: impl Into<String>,
    ) -> Result<Self> {
        let subject_id = subject_id.into();

        if rows.is_empty() {
            return Err(Error::EmptyInput(subject_id));
        }

        Ok(RawRecordSet {
            subject_id,
            rows,
            source_ref: source_ref.into(),
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    /// Consumes the set, handing its parts to the next stage.
    pub fn into_parts(self) -> (String, Vec<RawRow>) {
        (self.subject_id, self.rows)
    }
}

/// Discovers and parses subject CSV files from the configured directory.
pub struct RecordLoader {
    config: Config,
}

impl RecordLoader {
    pub fn new(config: Config) -> Self {
        RecordLoader { config }
    }

    /// Loads every subject CSV in the data directory.
    ///
    /// Individual file failures are logged and skipped. Fails outright when
    /// the directory is invalid, contains no CSV files, or every file fails.
    pub fn load_all(&self) -> Result<Vec<RawRecordSet>> {
        info!(data_path = %self.config.data_path.display(), "Loading subject files");

        let files = self.find_data_files()?;

        if files.is_empty() {
            return Err(Error::NoData(self.config.data_path.clone()));
        }

        let mut sets = Vec::new();

        for (path, subject_id) in &files {
            match self.load_single(path, subject_id) {
                Ok(set) => {
                    info!(
                        subject = %subject_id,
                        rows = set.row_count(),
                        "Loaded subject file"
                    );
                    sets.push(set);
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Failed to load subject file, skipping");
                }
            }
        }

        if sets.is_empty() {
            return Err(Error::NoValidData);
        }

        info!(subjects = sets.len(), "Subject files loaded");
        Ok(sets)
    }

    /// Lists `*.csv` files in the data directory, sorted by name so the load
    /// order is reproducible. The subject id is the file stem.
    fn find_data_files(&self) -> Result<Vec<(PathBuf, String)>> {
        let dir = &self.config.data_path;

        if !dir.exists() {
            return Err(Error::DataPathNotFound(dir.clone()));
        }
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.clone()));
        }

        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(DATA_FILE_EXTENSION));

            if !path.is_file() || !is_csv {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                debug!(file = %path.display(), subject = %stem, "Found subject file");
                files.push((path.clone(), stem.to_string()));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Parses one subject CSV into a [`RawRecordSet`], validating that the
    /// header carries every required column.
    fn load_single(&self, path: &Path, subject_id: &str) -> Result<RawRecordSet> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();

        let date_idx = headers.iter().position(|h| h == "date");
        let text_idx = headers.iter().position(|h| h == "tweet");
        let urls_idx = headers.iter().position(|h| h == "urls");

        let (Some(date_idx), Some(text_idx), Some(urls_idx)) = (date_idx, text_idx, urls_idx)
        else {
            let missing: Vec<String> = REQUIRED_COLUMNS
                .iter()
                .filter(|c| !headers.iter().any(|h| h == **c))
                .map(|c| c.to_string())
                .collect();

            return Err(Error::Schema {
                file: path.display().to_string(),
                missing,
            });
        };

        let mut rows = Vec::new();

        for record in reader.records() {
            let record = record?;
            rows.push(RawRow {
                date: record.get(date_idx).unwrap_or("").to_string(),
                text: record.get(text_idx).unwrap_or("").to_string(),
                url_field: record.get(urls_idx).unwrap_or("").to_string(),
            });
        }

        // An empty table trips the non-empty invariant and skips the file.
        RawRecordSet::new(subject_id, rows, path.display().to_string())
    }
}
