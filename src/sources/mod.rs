//! Data-access port
//!
//! The engine never fetches anything itself: the surrounding application
//! supplies three read-only operations producing the historical
//! performance list, the statistics summary, and the ML prediction.
//! `JsonApiSource` adapts already-fetched JSON payloads to this port and
//! enforces the boundary shape rules.

mod json;

pub use json::{parse_historical, parse_prediction, parse_statistics, JsonApiSource};

use crate::error::AnalyticsError;
use crate::types::{HistoricalPerformanceRecord, PredictionResult, StatisticsSummary};

/// Port supplying the three source payloads for one aggregation cycle
pub trait PerformanceDataSource {
    /// Historical exam/question-attempt records for one student. Must be a
    /// list (possibly empty); anything else is an invalid payload.
    fn historical_performance(
        &self,
        student_id: &str,
    ) -> Result<Vec<HistoricalPerformanceRecord>, AnalyticsError>;

    /// Backend-precomputed aggregate statistics. A payload without an
    /// `exam_dates` list is invalid.
    fn statistics_summary(&self) -> Result<StatisticsSummary, AnalyticsError>;

    /// ML prediction for one student. A payload without a numeric
    /// `confidence_score` is invalid.
    fn prediction(&self, student_id: &str) -> Result<PredictionResult, AnalyticsError>;
}
