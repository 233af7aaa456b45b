//! Normalized per-function invocation data shared by every stage of the analysis.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// All invocations of a single function, as produced by a trace parser.
///
/// `timestamps[i]` is the start time of the i-th invocation and `durations[i]` is its execution time,
/// both in milliseconds. The order is the one supplied by the parser, nothing downstream re-sorts it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub function_id: String,
    pub timestamps: Vec<f64>,
    pub durations: Vec<f64>,
}

impl InvocationRecord {
    pub fn new(function_id: impl Into<String>, timestamps: Vec<f64>, durations: Vec<f64>) -> Self {
        Self {
            function_id: function_id.into(),
            timestamps,
            durations,
        }
    }

    /// Builds a record where every invocation has zero duration.
    pub fn with_zero_durations(function_id: impl Into<String>, timestamps: Vec<f64>) -> Self {
        let durations = vec![0.; timestamps.len()];
        Self::new(function_id, timestamps, durations)
    }

    /// Appends one invocation.
    pub fn push(&mut self, start: f64, duration: f64) {
        self.timestamps.push(start);
        self.durations.push(duration);
    }

    pub fn invocations(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that every invocation has exactly one duration.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.timestamps.len() != self.durations.len() {
            return Err(AnalysisError::InconsistentRecord {
                function_id: self.function_id.clone(),
                timestamps: self.timestamps.len(),
                durations: self.durations.len(),
            });
        }
        Ok(())
    }

    /// Iterates over (start, duration) pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.durations.iter().copied())
    }
}

/// Validates a whole batch, stopping at the first inconsistent record.
pub fn validate_records(records: &[InvocationRecord]) -> Result<(), AnalysisError> {
    records.iter().try_for_each(InvocationRecord::validate)
}

/// Total number of invocations over all records.
pub fn total_invocations(records: &[InvocationRecord]) -> usize {
    records.iter().map(InvocationRecord::invocations).sum()
}

/// A detected cold start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledEvent {
    /// Start time of the invocation that had to provision a new instance, in milliseconds.
    pub timestamp: f64,
    pub function_id: String,
}

impl LabeledEvent {
    pub fn new(timestamp: f64, function_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            function_id: function_id.into(),
        }
    }
}
