//! Record normalization
//!
//! This module orders raw historical performance records newest-first and
//! isolates malformed timestamps. A record that cannot be placed on the
//! time axis sorts after every dated record; the relative order of such
//! records is preserved. Nothing here ever fails.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::HistoricalPerformanceRecord;

/// Display format for exam date labels ("Jan 15, 2026")
const DATE_LABEL_FORMAT: &str = "%b %-d, %Y";

/// Normalizer for ordering historical performance records
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Return a new sequence sorted newest-first by parsed timestamp.
    /// Records with missing or unparseable timestamps sort last, keeping
    /// their relative order. The input is never mutated.
    pub fn normalize(records: &[HistoricalPerformanceRecord]) -> Vec<HistoricalPerformanceRecord> {
        let mut keyed: Vec<(Option<DateTime<Utc>>, HistoricalPerformanceRecord)> = records
            .iter()
            .map(|record| {
                let parsed = record
                    .exam
                    .timestamp
                    .as_deref()
                    .and_then(parse_timestamp);
                (parsed, record.clone())
            })
            .collect();

        // Stable sort: undated records keep their relative order at the end.
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(ta), Some(tb)) => tb.cmp(ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        keyed.into_iter().map(|(_, record)| record).collect()
    }
}

/// Parse a backend timestamp string defensively. Accepts RFC 3339, the
/// space-separated `YYYY-MM-DD HH:MM:SS` form, and bare dates. Anything
/// else is treated as missing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    log::debug!("unparseable exam timestamp: {trimmed:?}");
    None
}

/// Format a parsed timestamp as a display date label
pub fn date_label(ts: &DateTime<Utc>) -> String {
    ts.format(DATE_LABEL_FORMAT).to_string()
}

/// Outcome of turning a raw timestamp into a display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLabel {
    /// Timestamp parsed; holds the formatted calendar date
    Formatted(String),
    /// Timestamp absent
    Missing,
    /// Timestamp present but unparseable
    Invalid,
}

impl DateLabel {
    /// Classify a raw timestamp field
    pub fn from_raw(raw: Option<&str>) -> DateLabel {
        match raw {
            None => DateLabel::Missing,
            Some(s) => match parse_timestamp(s) {
                Some(ts) => DateLabel::Formatted(date_label(&ts)),
                None => DateLabel::Invalid,
            },
        }
    }

    /// The formatted date, or the standard synthetic fallbacks
    pub fn display(self) -> String {
        match self {
            DateLabel::Formatted(s) => s,
            DateLabel::Missing => "Unknown".to_string(),
            DateLabel::Invalid => "Invalid Date".to_string(),
        }
    }

    /// The formatted date, or a caller-supplied synthetic label such as
    /// "Exam 12" when the record cannot be dated at all
    pub fn display_or(self, synthetic: String) -> String {
        match self {
            DateLabel::Formatted(s) => s,
            DateLabel::Missing | DateLabel::Invalid => synthetic,
        }
    }
}
