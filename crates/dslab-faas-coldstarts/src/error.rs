//! Errors reported by the analysis core.

use thiserror::Error;

/// Any of these aborts the whole batch, no partial results are returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// A function record has different numbers of timestamps and durations.
    #[error("function {function_id}: len(timestamps) is {timestamps} while len(durations) is {durations}")]
    InconsistentRecord {
        function_id: String,
        timestamps: usize,
        durations: usize,
    },
    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl AnalysisError {
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }
}
