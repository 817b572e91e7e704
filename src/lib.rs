//! examlens - Performance analytics aggregation engine for a medical exam
//! preparation dashboard
//!
//! The engine converts three independently fetched payloads (a historical
//! exam/question-attempt list, a backend-computed statistics summary, and
//! an ML prediction) into normalized, time-indexed metric sections
//! through a deterministic pipeline: record normalization → attempt
//! bucketing → trend and calibration analysis → metric assembly.
//!
//! Aggregation only begins once all three payloads are available; a
//! missing or invalid source yields a single "not ready" state rather
//! than a partially populated result.

pub mod assembler;
pub mod bucketizer;
pub mod calibration;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod sources;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::AnalyticsError;
pub use pipeline::{assemble_metrics, AnalyticsEngine};
pub use sources::{JsonApiSource, PerformanceDataSource};
pub use types::{Metric, MetricPoint, MetricSections, TimeRange};

/// Engine version embedded in log lines and the FFI surface
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
