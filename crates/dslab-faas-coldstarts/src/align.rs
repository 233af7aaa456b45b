//! Merging the three cold start label sets into one table.

use log::info;

use crate::invocation::LabeledEvent;

/// One output row: a cold start of the duration-aware simulation over all functions, annotated with
/// whether the from-0 simulation and the periodic-subset simulation found a cold start at the same time.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedRow {
    pub function_id: String,
    pub timestamp: f64,
    pub cold_start_from_zero: bool,
    pub periodic: bool,
}

fn sort_by_timestamp(events: &mut [LabeledEvent]) {
    // stable, equal timestamps keep their input order
    events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// Moves `cursor` past every event earlier than `timestamp` and reports an exact match at the new position.
fn advance_and_match(events: &[LabeledEvent], cursor: &mut usize, timestamp: f64) -> bool {
    while *cursor < events.len() && events[*cursor].timestamp < timestamp {
        *cursor += 1;
    }
    *cursor < events.len() && events[*cursor].timestamp == timestamp
}

/// Sorts the three lists by timestamp and walks them with a multi-pointer linear merge.
///
/// The join key is the timestamp alone, compared with exact floating point equality. Function ids are
/// not compared, and a cursor is never moved past a matching event, so it may match several rows.
pub fn align(
    mut all_cold_starts: Vec<LabeledEvent>,
    mut cold_starts_from_zero: Vec<LabeledEvent>,
    mut periodic_cold_starts: Vec<LabeledEvent>,
) -> Vec<AlignedRow> {
    sort_by_timestamp(&mut all_cold_starts);
    sort_by_timestamp(&mut cold_starts_from_zero);
    sort_by_timestamp(&mut periodic_cold_starts);

    let (mut j, mut k) = (0, 0);
    let mut rows = Vec::with_capacity(all_cold_starts.len());
    for event in all_cold_starts {
        let cold_start_from_zero = advance_and_match(&cold_starts_from_zero, &mut j, event.timestamp);
        let periodic = advance_and_match(&periodic_cold_starts, &mut k, event.timestamp);
        rows.push(AlignedRow {
            function_id: event.function_id,
            timestamp: event.timestamp,
            cold_start_from_zero,
            periodic,
        });
    }
    info!(
        "aligned {} rows: {} cold starts from 0, {} periodic",
        rows.len(),
        rows.iter().filter(|r| r.cold_start_from_zero).count(),
        rows.iter().filter(|r| r.periodic).count()
    );
    rows
}
