//! Metric assembly
//!
//! This module combines the statistics summary, the ML prediction, and the
//! derived bucket/calibration outputs into the five display-ready metric
//! sections. All percentage values render with exactly one decimal place;
//! numeric strings from the backend go through a single parse-or-zero
//! helper so fallback behavior is identical across fields.

use crate::bucketizer::AttemptBuckets;
use crate::calibration::{success_rate, CalibrationAnalyzer, CalibrationReport};
use crate::normalizer::DateLabel;
use crate::trend::{compute_trend, round1, DEFAULT_TREND_WINDOW};
use crate::types::{
    ConfidenceTier, HistoricalPerformanceRecord, Metric, MetricColor, MetricPoint, MetricSections,
    PredictionResult, StatisticsSummary,
};

/// Assembler for the final metric-section structure
pub struct MetricAssembler;

impl MetricAssembler {
    /// Assemble the five sections. `records` is the normalized
    /// (newest-first), time-filtered sequence the buckets were built from.
    pub fn assemble(
        records: &[HistoricalPerformanceRecord],
        buckets: &AttemptBuckets,
        report: &CalibrationReport,
        summary: &StatisticsSummary,
        prediction: &PredictionResult,
    ) -> MetricSections {
        MetricSections {
            historical: build_historical(records, summary),
            predictive: build_predictive(prediction),
            strengths: build_strengths(buckets, report),
            weaknesses: build_weaknesses(buckets, report),
            engagement: build_engagement(summary),
        }
    }
}

fn build_historical(
    records: &[HistoricalPerformanceRecord],
    summary: &StatisticsSummary,
) -> Vec<Metric> {
    // Average Exam Score: backend summary value over the backend score
    // series, labels falling back to "Exam {id}" when a point has no
    // usable date.
    let score_series: Vec<MetricPoint> = summary
        .exam_dates
        .iter()
        .map(|point| MetricPoint {
            label: DateLabel::from_raw(point.timestamp.as_deref())
                .display_or(format!("Exam {}", point.exam_id)),
            value: point.score,
        })
        .collect();
    let score_values = series_values(&score_series);

    let average_score = Metric {
        title: "Average Exam Score".to_string(),
        value: format_pct(parse_or_zero(&summary.average_score)),
        trend: compute_trend(&score_values, DEFAULT_TREND_WINDOW),
        color: MetricColor::Blue,
        series: Some(score_series),
        description: "Mean score across all recorded exam sittings".to_string(),
        inverse: false,
    };

    // Correct Answer Percentage: per-exam correct rate, oldest exam first.
    // Exams without question attempts carry no answer data and emit no
    // point.
    let mut correct_series = Vec::new();
    for record in records.iter().rev() {
        if record.attempts.is_empty() {
            continue;
        }
        correct_series.push(MetricPoint {
            label: DateLabel::from_raw(record.exam.timestamp.as_deref())
                .display_or(format!("Exam {}", record.exam.exam_id)),
            value: round1(success_rate(&record.attempts)),
        });
    }
    let correct_values = series_values(&correct_series);

    let correct_percentage = Metric {
        title: "Correct Answer Percentage".to_string(),
        value: format_pct(parse_or_zero(&summary.correct_percentage)),
        trend: compute_trend(&correct_values, DEFAULT_TREND_WINDOW),
        color: MetricColor::Green,
        series: Some(correct_series),
        description: "Share of answered questions marked correct".to_string(),
        inverse: false,
    };

    // Exam Pass Rate: binary 100/0 series per exam. The trend stays at 0;
    // there is no historical comparison for the pass flag.
    let pass_series: Vec<MetricPoint> = records
        .iter()
        .rev()
        .map(|record| MetricPoint {
            label: DateLabel::from_raw(record.exam.timestamp.as_deref()).display(),
            value: if record.exam.passed { 100.0 } else { 0.0 },
        })
        .collect();
    let pass_rate = if records.is_empty() {
        0.0
    } else {
        let passed = records.iter().filter(|r| r.exam.passed).count();
        passed as f64 / records.len() as f64 * 100.0
    };

    let exam_pass_rate = Metric {
        title: "Exam Pass Rate".to_string(),
        value: format_pct(pass_rate),
        trend: 0.0,
        color: MetricColor::Purple,
        series: Some(pass_series),
        description: "Percentage of exam sittings flagged as passed".to_string(),
        inverse: false,
    };

    vec![average_score, correct_percentage, exam_pass_rate]
}

fn build_predictive(prediction: &PredictionResult) -> Vec<Metric> {
    // Point-in-time estimates: no series, no trend.
    let graduation = Metric {
        title: "Graduation Likelihood".to_string(),
        value: format_pct(prediction.confidence_score.round()),
        trend: 0.0,
        color: MetricColor::Green,
        series: None,
        description: "Model confidence that the student stays on track to graduate".to_string(),
        inverse: false,
    };

    let probability = Metric {
        title: "Success Probability".to_string(),
        value: format_pct((prediction.probability * 100.0).round()),
        trend: 0.0,
        color: MetricColor::Blue,
        series: None,
        description: "Predicted probability of passing the next exam".to_string(),
        inverse: false,
    };

    vec![graduation, probability]
}

fn build_strengths(buckets: &AttemptBuckets, report: &CalibrationReport) -> Vec<Metric> {
    let high_series = CalibrationAnalyzer::tier_series(buckets, ConfidenceTier::High);
    let high = Metric {
        title: "High Confidence Success".to_string(),
        value: format_pct(report.high_confidence_success),
        trend: compute_trend(&series_values(&high_series), DEFAULT_TREND_WINDOW),
        color: MetricColor::Teal,
        series: Some(high_series),
        description: "Success rate on questions answered with high confidence".to_string(),
        inverse: false,
    };

    let medium_series = CalibrationAnalyzer::tier_series(buckets, ConfidenceTier::Medium);
    let medium = Metric {
        title: "Medium Confidence Success".to_string(),
        value: format_pct(report.medium_confidence_success),
        trend: compute_trend(&series_values(&medium_series), DEFAULT_TREND_WINDOW),
        color: MetricColor::Green,
        series: Some(medium_series),
        description: "Success rate on questions answered with medium confidence".to_string(),
        inverse: false,
    };

    vec![high, medium]
}

fn build_weaknesses(buckets: &AttemptBuckets, report: &CalibrationReport) -> Vec<Metric> {
    let low_series = CalibrationAnalyzer::tier_series(buckets, ConfidenceTier::Low);
    let low = Metric {
        title: "Low Confidence Accuracy".to_string(),
        value: format_pct(report.low_confidence_success),
        trend: compute_trend(&series_values(&low_series), DEFAULT_TREND_WINDOW),
        color: MetricColor::Orange,
        series: Some(low_series),
        description: "Success rate on questions answered with low confidence".to_string(),
        inverse: false,
    };

    let gap = Metric {
        title: "Confidence-Accuracy Gap".to_string(),
        value: format_pct(report.calibration_gap),
        trend: 0.0,
        color: MetricColor::Red,
        series: None,
        description: "Absolute distance between average self-confidence and actual accuracy; \
                      smaller means better calibration"
            .to_string(),
        inverse: true,
    };

    vec![low, gap]
}

fn build_engagement(summary: &StatisticsSummary) -> Vec<Metric> {
    // Raw counts: no percent sign, no decimals, no trend, no series.
    let exams = Metric {
        title: "Total Exams Taken".to_string(),
        value: summary.total_exams.to_string(),
        trend: 0.0,
        color: MetricColor::Blue,
        series: None,
        description: "Number of exam sittings on record".to_string(),
        inverse: false,
    };

    let questions = Metric {
        title: "Questions Answered".to_string(),
        value: format_count(parse_or_zero(&summary.total_questions)),
        trend: 0.0,
        color: MetricColor::Purple,
        series: None,
        description: "Number of practice questions answered".to_string(),
        inverse: false,
    };

    vec![exams, questions]
}

/// Shared parse-or-zero for backend numeric strings
pub(crate) fn parse_or_zero(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn format_pct(value: f64) -> String {
    format!("{value:.1}%")
}

fn format_count(value: f64) -> String {
    format!("{}", value as i64)
}

fn series_values(series: &[MetricPoint]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}
