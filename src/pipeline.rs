//! Pipeline orchestration
//!
//! This module provides the public API of the engine: the pure
//! `assemble_metrics` function and the `AnalyticsEngine`, which drives a
//! `PerformanceDataSource` port. Aggregation is synchronous and
//! recomputed wholesale from scratch on every invocation; identical
//! inputs and an identical time-range filter always produce identical
//! output.

use uuid::Uuid;

use crate::assembler::MetricAssembler;
use crate::bucketizer::Bucketizer;
use crate::calibration::CalibrationAnalyzer;
use crate::normalizer::{parse_timestamp, RecordNormalizer};
use crate::sources::PerformanceDataSource;
use crate::types::{
    HistoricalPerformanceRecord, MetricSections, PredictionResult, StatisticsSummary, TimeRange,
};

/// Convert the three source payloads into the five metric sections.
///
/// Returns `None` when any source is absent: the engine never attempts a
/// partial aggregation, so the caller sees a single "not ready" state
/// instead of a half-populated structure.
pub fn assemble_metrics(
    historical: Option<&[HistoricalPerformanceRecord]>,
    statistics: Option<&StatisticsSummary>,
    prediction: Option<&PredictionResult>,
    time_range: TimeRange,
) -> Option<MetricSections> {
    let (historical, statistics, prediction) = match (historical, statistics, prediction) {
        (Some(h), Some(s), Some(p)) => (h, s, p),
        _ => return None,
    };

    let ordered = RecordNormalizer::normalize(historical);
    let ordered = apply_time_range(ordered, time_range);
    let summary = filter_summary(statistics, time_range);

    let buckets = Bucketizer::bucketize(&ordered);
    let report = CalibrationAnalyzer::analyze(&buckets);

    Some(MetricAssembler::assemble(
        &ordered, &buckets, &report, &summary, prediction,
    ))
}

/// Restrict the normalized (newest-first) sequence to the active range.
/// A `Since` cutoff drops records that cannot be placed on the time axis.
fn apply_time_range(
    records: Vec<HistoricalPerformanceRecord>,
    range: TimeRange,
) -> Vec<HistoricalPerformanceRecord> {
    match range {
        TimeRange::All => records,
        TimeRange::Since(cutoff) => records
            .into_iter()
            .filter(|record| {
                matches!(
                    record.exam.timestamp.as_deref().and_then(parse_timestamp),
                    Some(ts) if ts >= cutoff
                )
            })
            .collect(),
        TimeRange::LastExams(count) => records.into_iter().take(count).collect(),
    }
}

/// Apply the same range to the backend score series so both historical
/// series stay on the same time axis
fn filter_summary(summary: &StatisticsSummary, range: TimeRange) -> StatisticsSummary {
    let mut filtered = summary.clone();
    match range {
        TimeRange::All => {}
        TimeRange::Since(cutoff) => {
            filtered.exam_dates.retain(|point| {
                matches!(
                    point.timestamp.as_deref().and_then(parse_timestamp),
                    Some(ts) if ts >= cutoff
                )
            });
        }
        TimeRange::LastExams(count) => {
            // The backend series is oldest-first; keep its tail.
            let len = filtered.exam_dates.len();
            if len > count {
                filtered.exam_dates.drain(..len - count);
            }
        }
    }
    filtered
}

/// Engine wrapper that drives a data-access port.
///
/// The engine owns no data and keeps no state between invocations beyond
/// an instance id used to correlate log lines.
pub struct AnalyticsEngine<S> {
    source: S,
    instance_id: String,
}

impl<S: PerformanceDataSource> AnalyticsEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(source: S, instance_id: String) -> Self {
        Self {
            source,
            instance_id,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Fetch all three payloads through the port and recompute wholesale.
    ///
    /// Any port failure yields `None` ("analytics unavailable") with the
    /// cause logged; there is no retry or timeout logic here.
    pub fn refresh(&self, student_id: &str, time_range: TimeRange) -> Option<MetricSections> {
        let historical = match self.source.historical_performance(student_id) {
            Ok(records) => records,
            Err(err) => {
                log::warn!("[{}] historical performance unavailable: {err}", self.instance_id);
                return None;
            }
        };

        let statistics = match self.source.statistics_summary() {
            Ok(summary) => summary,
            Err(err) => {
                log::warn!("[{}] statistics summary unavailable: {err}", self.instance_id);
                return None;
            }
        };

        let prediction = match self.source.prediction(student_id) {
            Ok(prediction) => prediction,
            Err(err) => {
                log::warn!("[{}] prediction unavailable: {err}", self.instance_id);
                return None;
            }
        };

        assemble_metrics(
            Some(&historical),
            Some(&statistics),
            Some(&prediction),
            time_range,
        )
    }
}
