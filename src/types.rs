//! Core types for the examlens aggregation pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: raw historical performance records, the backend statistics
//! summary, the ML prediction, and the display-ready metric sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Question difficulty label (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Parse a difficulty label, case-insensitively. Labels outside the
    /// closed set yield `None` and stay out of per-difficulty buckets.
    pub fn parse(label: &str) -> Option<Difficulty> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Self-reported confidence tier derived from the raw 1-5 rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub const ALL: [ConfidenceTier; 3] = [
        ConfidenceTier::High,
        ConfidenceTier::Medium,
        ConfidenceTier::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }

    /// Classify a raw confidence rating: >= 4 is High, exactly 3 is Medium,
    /// everything else (including out-of-domain 0) is Low.
    pub fn classify(rating: u8) -> ConfidenceTier {
        if rating >= 4 {
            ConfidenceTier::High
        } else if rating == 3 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// One answered question within an exam sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAttempt {
    /// Question identifier
    pub question_id: String,
    /// Whether the answer was correct
    pub correct: bool,
    /// Self-reported confidence rating (domain 1-5)
    pub confidence: u8,
    /// Question prompt text
    pub prompt: String,
    /// Difficulty label; `None` when the label is outside the closed set
    pub difficulty: Option<Difficulty>,
}

/// One exam sitting. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamAttemptRecord {
    /// Record identifier
    pub id: String,
    /// Student identifier
    pub student_id: String,
    /// Exam identifier
    pub exam_id: String,
    /// Exam display name
    pub exam_name: String,
    /// Numeric score for this sitting
    pub score: f64,
    /// Pass/fail flag
    pub passed: bool,
    /// Raw timestamp string as supplied by the backend; may be absent or
    /// unparseable, in which case the record sorts after all dated records
    pub timestamp: Option<String>,
    /// Clerkship this sitting belongs to, when known
    pub clerkship_id: Option<String>,
}

/// One exam sitting paired with its owned question attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPerformanceRecord {
    pub exam: ExamAttemptRecord,
    /// May be empty; order on input is irrelevant
    pub attempts: Vec<QuestionAttempt>,
}

/// One (exam, timestamp, score) point from the backend summary series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamScorePoint {
    pub exam_id: String,
    pub timestamp: Option<String>,
    pub score: f64,
}

/// Backend-precomputed aggregate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    /// Total exams taken
    pub total_exams: u32,
    /// Average score as a numeric string (e.g. "80.0")
    pub average_score: String,
    /// Total questions answered as a numeric string
    pub total_questions: String,
    /// Correct-answer percentage as a numeric string
    pub correct_percentage: String,
    /// Score points in backend order (oldest first)
    pub exam_dates: Vec<ExamScorePoint>,
}

/// ML prediction output consumed (never produced) by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Binary prediction class from the model
    pub predicted_class: i64,
    /// Probability in [0, 1]
    pub probability: f64,
    /// Human-readable prediction text
    pub message: String,
    /// Model confidence in [0, 100]
    pub confidence_score: f64,
}

/// One (date label, value) pair in a time-series display
///
/// Labels are formatted calendar dates ("Jan 15, 2026") or one of the
/// synthetic fallbacks "Exam {id}", "Unknown", "Invalid Date".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub label: String,
    pub value: f64,
}

/// Presentation color token attached to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricColor {
    Blue,
    Green,
    Purple,
    Orange,
    Red,
    Teal,
}

impl MetricColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricColor::Blue => "blue",
            MetricColor::Green => "green",
            MetricColor::Purple => "purple",
            MetricColor::Orange => "orange",
            MetricColor::Red => "red",
            MetricColor::Teal => "teal",
        }
    }
}

/// One display-ready metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub title: String,
    /// Formatted display value; percentages carry exactly one decimal place
    pub value: String,
    /// Signed percentage, one decimal place, always finite
    pub trend: f64,
    pub color: MetricColor,
    /// Time-series points, oldest first; absent for point-in-time metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<MetricPoint>>,
    pub description: String,
    /// Marks smaller-is-better metrics so presentation can invert its
    /// color/status logic
    #[serde(default)]
    pub inverse: bool,
}

/// The five named metric sections consumed by the presentation layer.
/// Recomputed wholesale on every input change, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSections {
    pub historical: Vec<Metric>,
    pub predictive: Vec<Metric>,
    pub strengths: Vec<Metric>,
    pub weaknesses: Vec<Metric>,
    pub engagement: Vec<Metric>,
}

/// Active time-range filter
///
/// The cutoff is always caller-supplied; the engine never reads the wall
/// clock, so identical inputs and an identical filter produce identical
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// No filtering
    All,
    /// Keep records whose timestamp parses to a value at or after the cutoff
    Since(DateTime<Utc>),
    /// Keep only the N most recent exams
    LastExams(usize),
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::All
    }
}
