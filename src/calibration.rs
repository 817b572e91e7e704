//! Confidence calibration analysis
//!
//! This module computes confidence-vs-accuracy statistics over the
//! bucketed attempts:
//! - success rate per confidence tier and per difficulty label
//! - overall average confidence rescaled to a 0-100 percentage
//! - overall average accuracy and the absolute calibration gap
//! - sparse per-date series for any tier or difficulty category
//!
//! Empty buckets resolve to 0 by contract, never to NaN or an error.

use serde::Serialize;

use crate::bucketizer::AttemptBuckets;
use crate::trend::round1;
use crate::types::{ConfidenceTier, Difficulty, MetricPoint, QuestionAttempt};

/// Confidence-accuracy statistics over one attempt population
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    /// Success rate (0-100) on attempts rated with high confidence
    pub high_confidence_success: f64,
    /// Success rate (0-100) on attempts rated with medium confidence
    pub medium_confidence_success: f64,
    /// Success rate (0-100) on attempts rated with low confidence
    pub low_confidence_success: f64,
    /// Mean raw confidence rescaled to 0-100
    pub average_confidence_pct: f64,
    /// Overall accuracy as a percentage
    pub average_accuracy_pct: f64,
    /// |average confidence % - average accuracy %|; smaller is better
    pub calibration_gap: f64,
    /// Success rate per difficulty label, in closed-set order
    pub difficulty_success: Vec<(Difficulty, f64)>,
}

/// Analyzer for confidence-accuracy calibration
pub struct CalibrationAnalyzer;

impl CalibrationAnalyzer {
    /// Compute the calibration report over the bucketed attempts
    pub fn analyze(buckets: &AttemptBuckets) -> CalibrationReport {
        let high_confidence_success = success_rate(buckets.tier(ConfidenceTier::High));
        let medium_confidence_success = success_rate(buckets.tier(ConfidenceTier::Medium));
        let low_confidence_success = success_rate(buckets.tier(ConfidenceTier::Low));

        let average_confidence_pct = if buckets.all.is_empty() {
            0.0
        } else {
            let total: f64 = buckets.all.iter().map(|a| a.confidence as f64).sum();
            total / buckets.all.len() as f64 / 5.0 * 100.0
        };
        let average_accuracy_pct = success_rate(&buckets.all);
        let calibration_gap = (average_confidence_pct - average_accuracy_pct).abs();

        let difficulty_success = Difficulty::ALL
            .iter()
            .map(|&d| (d, success_rate(buckets.difficulty(d))))
            .collect();

        CalibrationReport {
            high_confidence_success,
            medium_confidence_success,
            low_confidence_success,
            average_confidence_pct,
            average_accuracy_pct,
            calibration_gap,
            difficulty_success,
        }
    }

    /// Sparse per-date success-rate series for one confidence tier. A date
    /// emits a point only when it has at least one attempt in the tier.
    pub fn tier_series(buckets: &AttemptBuckets, tier: ConfidenceTier) -> Vec<MetricPoint> {
        sparse_series(buckets, |a| ConfidenceTier::classify(a.confidence) == tier)
    }

    /// Sparse per-date success-rate series for one difficulty label
    pub fn difficulty_series(buckets: &AttemptBuckets, difficulty: Difficulty) -> Vec<MetricPoint> {
        sparse_series(buckets, |a| a.difficulty == Some(difficulty))
    }
}

/// Percentage of attempts marked correct; 0 for an empty slice
pub fn success_rate(attempts: &[QuestionAttempt]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let correct = attempts.iter().filter(|a| a.correct).count();
    correct as f64 / attempts.len() as f64 * 100.0
}

fn sparse_series(
    buckets: &AttemptBuckets,
    matches: impl Fn(&QuestionAttempt) -> bool,
) -> Vec<MetricPoint> {
    let mut points = Vec::new();
    for bucket in &buckets.by_date {
        let subset: Vec<QuestionAttempt> = bucket
            .attempts
            .iter()
            .filter(|a| matches(a))
            .cloned()
            .collect();
        if subset.is_empty() {
            // Sparse: dates without data for the category are omitted,
            // not zero-filled.
            continue;
        }
        points.push(MetricPoint {
            label: bucket.label.clone(),
            value: round1(success_rate(&subset)),
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketizer::Bucketizer;
    use crate::types::{ExamAttemptRecord, HistoricalPerformanceRecord};

    fn make_attempt(correct: bool, confidence: u8, difficulty: Option<Difficulty>) -> QuestionAttempt {
        QuestionAttempt {
            question_id: "q".to_string(),
            correct,
            confidence,
            prompt: "prompt".to_string(),
            difficulty,
        }
    }

    fn make_record(
        id: &str,
        timestamp: Option<&str>,
        attempts: Vec<QuestionAttempt>,
    ) -> HistoricalPerformanceRecord {
        HistoricalPerformanceRecord {
            exam: ExamAttemptRecord {
                id: id.to_string(),
                student_id: "stu-1".to_string(),
                exam_id: id.to_string(),
                exam_name: format!("Shelf Exam {id}"),
                score: 75.0,
                passed: true,
                timestamp: timestamp.map(|s| s.to_string()),
                clerkship_id: None,
            },
            attempts,
        }
    }

    fn analyze(attempts: Vec<QuestionAttempt>) -> CalibrationReport {
        let records = vec![make_record("e1", Some("2026-01-01T09:00:00Z"), attempts)];
        let buckets = Bucketizer::bucketize(&records);
        CalibrationAnalyzer::analyze(&buckets)
    }

    #[test]
    fn test_high_confidence_split_is_fifty_percent() {
        let report = analyze(vec![
            make_attempt(true, 5, None),
            make_attempt(false, 5, None),
        ]);
        assert_eq!(report.high_confidence_success, 50.0);
    }

    #[test]
    fn test_tier_rates_stay_within_bounds() {
        let report = analyze(vec![
            make_attempt(true, 5, None),
            make_attempt(false, 4, None),
            make_attempt(true, 3, None),
            make_attempt(false, 2, None),
            make_attempt(true, 1, None),
        ]);

        for rate in [
            report.high_confidence_success,
            report.medium_confidence_success,
            report.low_confidence_success,
        ] {
            assert!((0.0..=100.0).contains(&rate));
        }
    }

    #[test]
    fn test_empty_population_resolves_to_zero() {
        let report = analyze(vec![]);
        assert_eq!(report.high_confidence_success, 0.0);
        assert_eq!(report.medium_confidence_success, 0.0);
        assert_eq!(report.low_confidence_success, 0.0);
        assert_eq!(report.average_confidence_pct, 0.0);
        assert_eq!(report.average_accuracy_pct, 0.0);
        assert_eq!(report.calibration_gap, 0.0);
        assert!(report.difficulty_success.iter().all(|(_, rate)| *rate == 0.0));
    }

    #[test]
    fn test_average_confidence_rescaled_to_percent() {
        // Ratings 5 and 3 average to 4, i.e. 80% of the 1-5 scale.
        let report = analyze(vec![
            make_attempt(true, 5, None),
            make_attempt(true, 3, None),
        ]);
        assert_eq!(report.average_confidence_pct, 80.0);
        assert_eq!(report.average_accuracy_pct, 100.0);
        assert_eq!(report.calibration_gap, 20.0);
    }

    #[test]
    fn test_calibration_gap_is_symmetric() {
        // Underconfident: confidence 40% (all rated 2), accuracy 100%.
        let underconfident = analyze(vec![
            make_attempt(true, 2, None),
            make_attempt(true, 2, None),
            make_attempt(true, 2, None),
            make_attempt(true, 2, None),
            make_attempt(true, 2, None),
        ]);
        // Overconfident mirror image: confidence 100%, accuracy 40%.
        let overconfident = analyze(vec![
            make_attempt(true, 5, None),
            make_attempt(true, 5, None),
            make_attempt(false, 5, None),
            make_attempt(false, 5, None),
            make_attempt(false, 5, None),
        ]);

        // Swapping which side is larger leaves the gap unchanged.
        assert_eq!(underconfident.calibration_gap, 60.0);
        assert_eq!(overconfident.calibration_gap, 60.0);
    }

    #[test]
    fn test_difficulty_success_rates() {
        let report = analyze(vec![
            make_attempt(true, 4, Some(Difficulty::Easy)),
            make_attempt(true, 4, Some(Difficulty::Easy)),
            make_attempt(false, 4, Some(Difficulty::Hard)),
            make_attempt(true, 4, None),
        ]);

        let rates: Vec<(Difficulty, f64)> = report.difficulty_success;
        assert_eq!(rates[0], (Difficulty::Easy, 100.0));
        assert_eq!(rates[1], (Difficulty::Medium, 0.0));
        assert_eq!(rates[2], (Difficulty::Hard, 0.0));
    }

    #[test]
    fn test_sparse_series_omits_dates_without_category_data() {
        let records = vec![
            make_record(
                "feb",
                Some("2026-02-01T09:00:00Z"),
                vec![make_attempt(true, 2, None)],
            ),
            make_record(
                "jan",
                Some("2026-01-01T09:00:00Z"),
                vec![
                    make_attempt(true, 5, None),
                    make_attempt(false, 5, None),
                ],
            ),
        ];
        let buckets = Bucketizer::bucketize(&records);

        let high = CalibrationAnalyzer::tier_series(&buckets, ConfidenceTier::High);
        assert_eq!(
            high,
            vec![MetricPoint {
                label: "Jan 1, 2026".to_string(),
                value: 50.0,
            }]
        );

        let low = CalibrationAnalyzer::tier_series(&buckets, ConfidenceTier::Low);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].label, "Feb 1, 2026");
        assert_eq!(low[0].value, 100.0);
    }

    #[test]
    fn test_difficulty_series_is_sparse_too() {
        let records = vec![
            make_record(
                "feb",
                Some("2026-02-01T09:00:00Z"),
                vec![make_attempt(false, 3, Some(Difficulty::Hard))],
            ),
            make_record(
                "jan",
                Some("2026-01-01T09:00:00Z"),
                vec![make_attempt(true, 3, Some(Difficulty::Easy))],
            ),
        ];
        let buckets = Bucketizer::bucketize(&records);

        let hard = CalibrationAnalyzer::difficulty_series(&buckets, Difficulty::Hard);
        assert_eq!(hard.len(), 1);
        assert_eq!(hard[0].label, "Feb 1, 2026");
        assert_eq!(hard[0].value, 0.0);
    }

    #[test]
    fn test_series_values_are_rounded() {
        // 2 of 3 correct -> 66.666... -> 66.7
        let records = vec![make_record(
            "jan",
            Some("2026-01-01T09:00:00Z"),
            vec![
                make_attempt(true, 5, None),
                make_attempt(true, 5, None),
                make_attempt(false, 5, None),
            ],
        )];
        let buckets = Bucketizer::bucketize(&records);

        let high = CalibrationAnalyzer::tier_series(&buckets, ConfidenceTier::High);
        assert_eq!(high[0].value, 66.7);
    }
}
