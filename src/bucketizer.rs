//! Attempt bucketing
//!
//! This module flattens question attempts across the normalized record
//! sequence and classifies them three ways:
//! - all attempts, preserving record order
//! - per formatted exam date (insertion-ordered, oldest exam first so that
//!   downstream series end at the most recent sitting)
//! - per difficulty label and per confidence tier
//!
//! Bucketing is purely read-derived and never mutates its input.

use crate::normalizer::{date_label, parse_timestamp};
use crate::types::{ConfidenceTier, Difficulty, HistoricalPerformanceRecord, QuestionAttempt};

/// Attempts grouped by one formatted date label
#[derive(Debug, Clone, PartialEq)]
pub struct DateBucket {
    pub label: String,
    pub attempts: Vec<QuestionAttempt>,
}

/// Output of the bucketing stage
#[derive(Debug, Clone, Default)]
pub struct AttemptBuckets {
    /// Every attempt across every record, in record order
    pub all: Vec<QuestionAttempt>,
    /// Date-label buckets in first-seen (chronological) order. Only exams
    /// with a non-null timestamp and at least one attempt contribute.
    pub by_date: Vec<DateBucket>,
    by_difficulty: Vec<(Difficulty, Vec<QuestionAttempt>)>,
    by_tier: Vec<(ConfidenceTier, Vec<QuestionAttempt>)>,
}

impl AttemptBuckets {
    /// Attempts carrying the given difficulty label. Empty slice for an
    /// empty bucket.
    pub fn difficulty(&self, difficulty: Difficulty) -> &[QuestionAttempt] {
        self.by_difficulty
            .iter()
            .find(|(d, _)| *d == difficulty)
            .map(|(_, attempts)| attempts.as_slice())
            .unwrap_or(&[])
    }

    /// Attempts whose confidence rating falls in the given tier
    pub fn tier(&self, tier: ConfidenceTier) -> &[QuestionAttempt] {
        self.by_tier
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, attempts)| attempts.as_slice())
            .unwrap_or(&[])
    }
}

/// Bucketizer for classifying question attempts
pub struct Bucketizer;

impl Bucketizer {
    /// Bucketize the normalized (newest-first) record sequence.
    pub fn bucketize(records: &[HistoricalPerformanceRecord]) -> AttemptBuckets {
        let mut all = Vec::new();
        for record in records {
            all.extend(record.attempts.iter().cloned());
        }

        // Date buckets run oldest-first; the normalized sequence is
        // newest-first, so iterate it in reverse.
        let mut by_date: Vec<DateBucket> = Vec::new();
        for record in records.iter().rev() {
            if record.attempts.is_empty() {
                continue;
            }
            let Some(raw) = record.exam.timestamp.as_deref() else {
                continue;
            };
            let label = match parse_timestamp(raw) {
                Some(ts) => date_label(&ts),
                // Present but unparseable: grouped under the shared
                // "Invalid Date" bucket rather than dropped.
                None => "Invalid Date".to_string(),
            };

            match by_date.iter_mut().find(|bucket| bucket.label == label) {
                Some(bucket) => bucket.attempts.extend(record.attempts.iter().cloned()),
                None => by_date.push(DateBucket {
                    label,
                    attempts: record.attempts.clone(),
                }),
            }
        }

        let by_difficulty = Difficulty::ALL
            .iter()
            .map(|&d| {
                let subset: Vec<QuestionAttempt> = all
                    .iter()
                    .filter(|a| a.difficulty == Some(d))
                    .cloned()
                    .collect();
                (d, subset)
            })
            .collect();

        let by_tier = ConfidenceTier::ALL
            .iter()
            .map(|&t| {
                let subset: Vec<QuestionAttempt> = all
                    .iter()
                    .filter(|a| ConfidenceTier::classify(a.confidence) == t)
                    .cloned()
                    .collect();
                (t, subset)
            })
            .collect();

        AttemptBuckets {
            all,
            by_date,
            by_difficulty,
            by_tier,
        }
    }
}
