//! Error types for examlens

use thiserror::Error;

/// Errors surfaced at the engine's boundaries.
///
/// The aggregation stages themselves never fail: malformed records degrade
/// in place (sort last, fall out of a bucket, default to zero). Errors only
/// arise where collaborator-supplied payloads are validated or fetched.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid source payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Data source failure: {0}")]
    Source(String),
}
