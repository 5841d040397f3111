//! Opt-in scan timing.
//!
//! Kept as a separate `RunMetrics`/`FieldMetrics` pair rather than folded
//! into the hot path: `classify` never pays for this, and a caller who
//! wants visibility calls `classify_with_metrics` instead.

use std::time::Duration;

/// Timing for one field's classification.
#[derive(Debug, Default, Clone)]
pub struct FieldMetrics {
    pub field: String,
    pub field_name_pass: Duration,
    pub data_value_pass: Duration,
    pub date_pass: Duration,
}

/// Timing for a whole scan.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    pub total: Duration,
    pub analysis: Duration,
    pub fields: Vec<FieldMetrics>,
}

/// A [`crate::engine::ScanReport`] bundled with the timings collected while
/// producing it.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub report: crate::engine::ScanReport,
    pub metrics: RunMetrics,
}
