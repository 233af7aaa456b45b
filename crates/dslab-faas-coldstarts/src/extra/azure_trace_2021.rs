//! Functions for parsing Azure Functions 2021 trace.
//!
//! Trace description: <https://github.com/Azure/AzurePublicDataset/blob/master/AzureFunctionsInvocationTrace2021.md>
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::info;

use crate::invocation::InvocationRecord;
use crate::trace::{line_of, parse_field, sort_by_start, RecordCollector, TraceError};

/// Struct with Azure 2021 trace settings.
#[derive(Clone, Debug, Default)]
pub struct Azure2021TraceConfig {
    /// Added to every start time, in milliseconds. Useful to place the trace at the start of a given day.
    pub start_offset_ms: f64,
    /// Sort invocations of every function by start time. The trace is ordered by end time, so start times
    /// may be out of order otherwise.
    pub sort_by_start: bool,
}

/// Parses the trace from any reader. Expects a header row followed by `app,func,end_timestamp,duration`
/// rows, times in seconds. Both times are truncated to whole milliseconds before the start time is derived.
/// The function id is `app` concatenated with `func`.
pub fn process_azure_2021_trace_from_reader<R: Read>(
    reader: R,
    config: &Azure2021TraceConfig,
) -> Result<Vec<InvocationRecord>, TraceError> {
    let mut file = ReaderBuilder::new().flexible(true).from_reader(reader);
    if file.headers()?.is_empty() {
        return Err(TraceError::Empty);
    }
    let mut collector = RecordCollector::new();
    let mut invocations = 0;
    for rec in file.records() {
        let record = rec?;
        if record.len() < 4 {
            return Err(TraceError::malformed(
                line_of(&record),
                format!("expected 4 columns, found {}", record.len()),
            ));
        }
        let end: f64 = parse_field(&record, 2, "end timestamp")?;
        let duration: f64 = parse_field(&record, 3, "duration")?;
        // whole milliseconds
        let end_ms = (end * 1000.).trunc();
        let duration_ms = (duration * 1000.).trunc();
        let start_ms = end_ms - duration_ms + config.start_offset_ms;
        let mut function_id = record[0].to_string();
        function_id.push_str(&record[1]);
        collector.push(&function_id, start_ms, duration_ms);
        invocations += 1;
    }
    let mut records = collector.into_records();
    if config.sort_by_start {
        sort_by_start(&mut records);
    }
    info!(
        "Azure 2021 trace parsed: {} functions, {} invocations",
        records.len(),
        invocations
    );
    Ok(records)
}

/// This function parses Azure Functions 2021 trace file.
pub fn process_azure_2021_trace(
    path: &Path,
    config: &Azure2021TraceConfig,
) -> Result<Vec<InvocationRecord>, TraceError> {
    process_azure_2021_trace_from_reader(File::open(path)?, config)
}
