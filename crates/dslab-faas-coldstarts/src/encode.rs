//! CSV encoding of the aligned cold start table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::align::AlignedRow;

pub const CSV_HEADER: [&str; 4] = ["FunctionName", "Time", "ColdstartFrom0", "PeriodicInvocation"];

/// Formats a timestamp as the shortest decimal that parses back to the same value, never using
/// exponent notation (`70000`, `0.5`, `1234.125`).
pub fn format_timestamp(timestamp: f64) -> String {
    format!("{}", timestamp)
}

/// Row of the output table with every field already rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRow {
    pub function_name: String,
    pub time: String,
    pub cold_start_from_zero: String,
    pub periodic_invocation: String,
}

impl From<&AlignedRow> for CsvRow {
    fn from(row: &AlignedRow) -> Self {
        Self {
            function_name: row.function_id.clone(),
            time: format_timestamp(row.timestamp),
            cold_start_from_zero: row.cold_start_from_zero.to_string(),
            periodic_invocation: row.periodic.to_string(),
        }
    }
}

impl CsvRow {
    pub fn fields(&self) -> [&str; 4] {
        [
            self.function_name.as_str(),
            self.time.as_str(),
            self.cold_start_from_zero.as_str(),
            self.periodic_invocation.as_str(),
        ]
    }
}

/// Writes the header and one record per row.
pub fn write_csv<W: Write>(rows: &[AlignedRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for row in rows.iter() {
        writer.write_record(CsvRow::from(row).fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the table into a newly created (or truncated) file.
pub fn encode_to_csv(rows: &[AlignedRow], path: &Path) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_csv(rows, file)?;
    info!("{} rows written to {}", rows.len(), path.display());
    Ok(())
}
