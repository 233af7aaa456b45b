//! Common pieces of the trace parsers: errors and per-function record assembly.

use indexmap::IndexMap;

use crate::invocation::InvocationRecord;

/// Errors of the trace parsing layer. They never reach the analysis core: a parser either returns
/// complete records or one of these.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed trace at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("empty trace file")]
    Empty,
}

impl TraceError {
    pub(crate) fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<T, TraceError> {
    let field = record
        .get(idx)
        .ok_or_else(|| TraceError::malformed(line_of(record), format!("missing field {}", name)))?;
    field
        .trim()
        .parse()
        .map_err(|_| TraceError::malformed(line_of(record), format!("cannot parse {} from {:?}", name, field)))
}

/// Collects invocations into one record per function, keeping functions in first-seen order.
#[derive(Default)]
pub struct RecordCollector {
    records: IndexMap<String, InvocationRecord>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn function_mut(&mut self, function_id: &str) -> &mut InvocationRecord {
        if !self.records.contains_key(function_id) {
            self.records
                .insert(function_id.to_string(), InvocationRecord::new(function_id, Vec::new(), Vec::new()));
        }
        &mut self.records[function_id]
    }

    pub fn push(&mut self, function_id: &str, start: f64, duration: f64) {
        self.function_mut(function_id).push(start, duration);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<InvocationRecord> {
        self.records.into_values().collect()
    }
}

/// Sorts the invocations of every record by start time, keeping durations attached.
pub fn sort_by_start(records: &mut [InvocationRecord]) {
    for record in records.iter_mut() {
        let mut pairs: Vec<(f64, f64)> = record.iter().collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        (record.timestamps, record.durations) = pairs.into_iter().unzip();
    }
}
