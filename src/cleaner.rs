//! Record cleaning: URL authority extraction, ad filtering, and removal of
//! incomplete rows.

use tracing::{debug, info};

use crate::config::PRIMARY_DOMAIN;
use crate::loader::RawRecordSet;

/// One cleaned record. `authority` is the domain extracted from the raw
/// bracketed URL field.
#[derive(Debug, Clone)]
pub struct CleanRow {
    pub date: String,
    pub text: String,
    pub authority: String,
}

/// Cleaned records for one subject. May legitimately be empty when every
/// row was an ad or incomplete; that only becomes an error at the rating
/// stage.
#[derive(Debug)]
pub struct CleanedRecordSet {
    subject_id: String,
    rows: Vec<CleanRow>,
}

impl CleanedRecordSet {
    pub fn new(subject_id: impl Into<String>, rows: Vec<CleanRow>) -> Self {
        CleanedRecordSet {
            subject_id: subject_id.into(),
            rows,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn rows(&self) -> &[CleanRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<CleanRow>) {
        (self.subject_id, self.rows)
    }
}

/// Extracts the URL authority from the scraper's bracketed field format,
/// e.g. `[twitter.com/user/status/123]` -> `twitter.com`.
///
/// Strips one leading `[` and one trailing `]` if present, splits on `/`,
/// and takes the third segment. Fewer than three segments yields an empty
/// authority.
fn extract_authority(url_field: &str) -> String {
    let inner = url_field.strip_prefix('[').unwrap_or(url_field);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    inner.split('/').nth(2).unwrap_or("").to_string()
}

/// Ad heuristic: an authority longer than the primary domain that is not the
/// primary domain is treated as a likely ad and blanked, so the row gets
/// dropped. This is a deliberately approximate rule kept for behavioral
/// parity; shorter strings and the exact domain pass through untouched.
fn filter_ad_authority(authority: String) -> String {
    if authority.len() > PRIMARY_DOMAIN.len() && authority != PRIMARY_DOMAIN {
        String::new()
    } else {
        authority
    }
}

/// Cleans raw record sets into [`CleanedRecordSet`]s.
pub struct RecordCleaner;

impl RecordCleaner {
    pub fn new() -> Self {
        RecordCleaner
    }

    /// Cleans one subject's records: extract authorities, blank likely ads,
    /// then drop every row with a blank date, text, or authority.
    pub fn clean(&self, raw: RawRecordSet) -> CleanedRecordSet {
        let before = raw.row_count();
        let (subject_id, rows) = raw.into_parts();

        let cleaned: Vec<CleanRow> = rows
            .into_iter()
            .map(|row| CleanRow {
                date: row.date,
                text: row.text,
                authority: filter_ad_authority(extract_authority(&row.url_field)),
            })
            .filter(|row| {
                !row.date.trim().is_empty()
                    && !row.text.trim().is_empty()
                    && !row.authority.is_empty()
            })
            .collect();

        let dropped = before - cleaned.len();
        if dropped > 0 {
            debug!(subject = %subject_id, dropped, "Dropped ad or incomplete rows");
        }

        info!(
            subject = %subject_id,
            remaining = cleaned.len(),
            from = before,
            "Cleaned subject records"
        );

        CleanedRecordSet::new(subject_id, cleaned)
    }

    /// Cleans every subject in the batch.
    pub fn clean_all(&self, sets: Vec<RawRecordSet>) -> Vec<CleanedRecordSet> {
        sets.into_iter().map(|set| self.clean(set)).collect()
    }
}

impl Default for RecordCleaner {
    fn default() -> Self {
        RecordCleaner::new()
    }
}
