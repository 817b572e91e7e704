//! JSON payload source
//!
//! Maps collaborator-supplied JSON payloads to the engine's input types.
//! Payload-level shape violations (a non-list historical response, a
//! statistics summary without `exam_dates`, a prediction without a numeric
//! `confidence_score`) reject the whole payload; anything below that level
//! is mapped tolerantly so a single malformed record degrades instead of
//! failing the fetch cycle.

use serde_json::Value;

use super::PerformanceDataSource;
use crate::error::AnalyticsError;
use crate::types::{
    Difficulty, ExamAttemptRecord, ExamScorePoint, HistoricalPerformanceRecord, PredictionResult,
    QuestionAttempt, StatisticsSummary,
};

/// Port implementation over three already-fetched JSON payloads
pub struct JsonApiSource {
    historical: Value,
    statistics: Value,
    prediction: Value,
}

impl JsonApiSource {
    pub fn new(historical: Value, statistics: Value, prediction: Value) -> Self {
        Self {
            historical,
            statistics,
            prediction,
        }
    }
}

impl PerformanceDataSource for JsonApiSource {
    fn historical_performance(
        &self,
        _student_id: &str,
    ) -> Result<Vec<HistoricalPerformanceRecord>, AnalyticsError> {
        parse_historical(&self.historical)
    }

    fn statistics_summary(&self) -> Result<StatisticsSummary, AnalyticsError> {
        parse_statistics(&self.statistics)
    }

    fn prediction(&self, _student_id: &str) -> Result<PredictionResult, AnalyticsError> {
        parse_prediction(&self.prediction)
    }
}

/// Parse the historical performance payload. Must be a JSON array.
pub fn parse_historical(value: &Value) -> Result<Vec<HistoricalPerformanceRecord>, AnalyticsError> {
    let rows = value.as_array().ok_or_else(|| {
        AnalyticsError::InvalidPayload("historical performance payload is not a list".to_string())
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if !row.is_object() {
            log::debug!("skipping non-object historical record: {row}");
            continue;
        }
        records.push(record_from_value(row));
    }
    Ok(records)
}

/// Parse the statistics summary payload. Must carry an `exam_dates` list.
pub fn parse_statistics(value: &Value) -> Result<StatisticsSummary, AnalyticsError> {
    let dates = value
        .get("exam_dates")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AnalyticsError::InvalidPayload(
                "statistics summary is missing the exam_dates list".to_string(),
            )
        })?;

    let exam_dates = dates
        .iter()
        .map(|point| ExamScorePoint {
            exam_id: field_string(point, &["exam_id", "id"]),
            timestamp: field_opt_string(point, &["timestamp", "date"]),
            score: field_f64(point, &["score"]),
        })
        .collect();

    Ok(StatisticsSummary {
        total_exams: field_f64(value, &["total_exams", "total_exams_taken"]).max(0.0) as u32,
        average_score: numeric_string(value, &["average_score"]),
        total_questions: numeric_string(value, &["total_questions", "total_questions_answered"]),
        correct_percentage: numeric_string(
            value,
            &["correct_percentage", "correct_answer_percentage"],
        ),
        exam_dates,
    })
}

/// Parse the prediction payload. Must carry a numeric `confidence_score`.
pub fn parse_prediction(value: &Value) -> Result<PredictionResult, AnalyticsError> {
    let confidence_score = value
        .get("confidence_score")
        .and_then(Value::as_f64)
        .ok_or_else(|| AnalyticsError::MissingField("confidence_score".to_string()))?;

    Ok(PredictionResult {
        predicted_class: first_field(value, &["predicted_class", "prediction"])
            .and_then(Value::as_i64)
            .unwrap_or(0),
        probability: field_f64(value, &["probability"]).clamp(0.0, 1.0),
        message: field_string(value, &["message", "prediction_text"]),
        confidence_score: confidence_score.clamp(0.0, 100.0),
    })
}

fn record_from_value(row: &Value) -> HistoricalPerformanceRecord {
    let attempts = first_field(row, &["question_attempts", "attempts"])
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(attempt_from_value)
                .collect()
        })
        .unwrap_or_default();

    HistoricalPerformanceRecord {
        exam: ExamAttemptRecord {
            id: field_string(row, &["id"]),
            student_id: field_string(row, &["student_id"]),
            exam_id: field_string(row, &["exam_id"]),
            exam_name: field_string(row, &["exam_name", "name"]),
            score: field_f64(row, &["score"]),
            passed: field_bool(row, &["passed", "pass"]),
            timestamp: field_opt_string(row, &["timestamp"]),
            clerkship_id: field_opt_string(row, &["clerkship_id"]),
        },
        attempts,
    }
}

fn attempt_from_value(item: &Value) -> QuestionAttempt {
    // Confidence arrives as 1-5; non-numeric ratings degrade to 0 (Low
    // tier), values above the scale clamp to 5.
    let confidence = field_f64(item, &["confidence"]).clamp(0.0, 5.0).round() as u8;

    QuestionAttempt {
        question_id: field_string(item, &["question_id", "id"]),
        correct: field_bool(item, &["correct", "result", "Result"]),
        confidence,
        prompt: field_string(item, &["prompt", "question_text"]),
        difficulty: first_field(item, &["difficulty"])
            .and_then(Value::as_str)
            .and_then(Difficulty::parse),
    }
}

fn first_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value.get(key))
        .filter(|v| !v.is_null())
}

/// Strings pass through, numbers are stringified, anything else is empty
fn field_string(value: &Value, keys: &[&str]) -> String {
    match first_field(value, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn field_opt_string(value: &Value, keys: &[&str]) -> Option<String> {
    match first_field(value, keys) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings pass through; anything else becomes "0" so
/// downstream parse-or-zero behavior stays uniform
fn numeric_string(value: &Value, keys: &[&str]) -> String {
    match first_field(value, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}

fn field_f64(value: &Value, keys: &[&str]) -> f64 {
    match first_field(value, keys) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn field_bool(value: &Value, keys: &[&str]) -> bool {
    match first_field(value, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) != 0.0,
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}
