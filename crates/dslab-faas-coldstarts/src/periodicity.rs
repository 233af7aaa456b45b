//! Splitting functions into periodic and non-periodic ones by their inter-arrival intervals.

use log::{debug, info};

use crate::error::AnalysisError;
use crate::invocation::InvocationRecord;

/// Minimum time covered by the dominant interval for a function to be periodic: 12 hours in ms.
pub const MIN_PERIODIC_SPAN_MS: f64 = 12. * 60. * 60. * 1000.;

/// Interval buckets with greedy first-fit assignment.
///
/// A new interval joins the first bucket (in order of creation) whose representative is within the
/// tolerance, otherwise it opens a new bucket. Representatives are never re-centered, so the result
/// depends on the order in which intervals arrive.
#[derive(Clone, Debug, Default)]
pub struct IntervalBuckets {
    tolerance: f64,
    buckets: Vec<(f64, usize)>,
}

impl IntervalBuckets {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            buckets: Vec::new(),
        }
    }

    pub fn add(&mut self, interval: f64) {
        let tolerance = self.tolerance;
        match self
            .buckets
            .iter_mut()
            .find(|(representative, _)| (interval - *representative).abs() <= tolerance)
        {
            Some((_, count)) => *count += 1,
            None => self.buckets.push((interval, 1)),
        }
    }

    /// (representative, count) pairs in order of creation.
    pub fn buckets(&self) -> &[(f64, usize)] {
        &self.buckets
    }

    /// The bucket with the largest count, the earliest one wins ties.
    pub fn dominant(&self) -> Option<(f64, usize)> {
        let mut best: Option<(f64, usize)> = None;
        for &(representative, count) in self.buckets.iter() {
            if best.map_or(true, |(_, max_count)| count > max_count) {
                best = Some((representative, count));
            }
        }
        best
    }
}

/// Returns the dominant inter-arrival interval of the record and the number of intervals in its bucket.
/// Records with less than two invocations have no intervals.
pub fn dominant_interval(record: &InvocationRecord, tolerance_ms: f64) -> Option<(f64, usize)> {
    let mut buckets = IntervalBuckets::new(tolerance_ms);
    for pair in record.timestamps.windows(2) {
        buckets.add(pair[1] - pair[0]);
    }
    buckets.dominant()
}

/// Whether the dominant interval repeated `count` times covers at least [`MIN_PERIODIC_SPAN_MS`].
pub fn is_periodic(record: &InvocationRecord, tolerance_ms: f64) -> bool {
    match dominant_interval(record, tolerance_ms) {
        Some((interval, count)) => {
            debug!(
                "function {}: dominant interval {} ms repeated {} times",
                record.function_id, interval, count
            );
            interval * (count as f64) >= MIN_PERIODIC_SPAN_MS
        }
        None => false,
    }
}

pub(crate) fn check_tolerance(tolerance_ms: f64) -> Result<(), AnalysisError> {
    if tolerance_ms.is_nan() || tolerance_ms < 0. {
        return Err(AnalysisError::invalid_parameter(
            "tolerance_ms",
            tolerance_ms,
            "must be non-negative",
        ));
    }
    Ok(())
}

/// Periodic and non-periodic records, each in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub periodic: Vec<InvocationRecord>,
    pub non_periodic: Vec<InvocationRecord>,
}

/// Partitions the records into periodic and non-periodic ones. The input is left untouched.
pub fn classify(records: &[InvocationRecord], tolerance_ms: f64) -> Result<Classification, AnalysisError> {
    check_tolerance(tolerance_ms)?;
    let mut result = Classification::default();
    for record in records.iter() {
        if is_periodic(record, tolerance_ms) {
            result.periodic.push(record.clone());
        } else {
            result.non_periodic.push(record.clone());
        }
    }
    info!(
        "classified {} functions: {} periodic, {} non-periodic",
        records.len(),
        result.periodic.len(),
        result.non_periodic.len()
    );
    Ok(result)
}
