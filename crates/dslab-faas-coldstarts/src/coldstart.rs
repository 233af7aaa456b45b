//! Keep-alive simulation policies that label invocations as cold starts.
//!
//! Each function is simulated on its own [`WarmPool`], invocations are processed in record order.

use log::{debug, info};

use crate::error::AnalysisError;
use crate::instance::{SimulatedInstance, WarmPool};
use crate::invocation::{validate_records, InvocationRecord, LabeledEvent};

pub trait ColdStartPolicy: Send + Sync {
    /// Short policy name used in logs and summaries.
    fn name(&self) -> &str;
    /// Simulates the warm pool of a single function and returns its cold starts in record order.
    /// The record is assumed to be validated.
    fn simulate_function(&self, record: &InvocationRecord) -> Vec<LabeledEvent>;
}

pub(crate) fn check_keepalive(keepalive_ms: f64) -> Result<(), AnalysisError> {
    if !keepalive_ms.is_finite() || keepalive_ms <= 0. {
        return Err(AnalysisError::invalid_parameter(
            "keepalive_ms",
            keepalive_ms,
            "must be positive and finite",
        ));
    }
    Ok(())
}

/// An instance is reused only while it is idle and not expired (both bounds exclusive).
/// Reuse and creation set expiry to `start + duration + keepalive`, expired instances are swept after
/// every invocation.
pub struct DurationAwarePolicy {
    keepalive: f64,
}

impl DurationAwarePolicy {
    pub fn new(keepalive_ms: f64) -> Result<Self, AnalysisError> {
        check_keepalive(keepalive_ms)?;
        Ok(Self { keepalive: keepalive_ms })
    }

    pub fn keepalive(&self) -> f64 {
        self.keepalive
    }
}

impl ColdStartPolicy for DurationAwarePolicy {
    fn name(&self) -> &str {
        "duration-aware"
    }

    fn simulate_function(&self, record: &InvocationRecord) -> Vec<LabeledEvent> {
        let mut pool = WarmPool::new();
        let mut cold_starts = Vec::new();
        for (start, duration) in record.iter() {
            let end = start + duration;
            match pool.find_idle_mut(start) {
                Some(instance) => {
                    instance.last_end_time = end;
                    instance.expiry_time = end + self.keepalive;
                }
                None => {
                    cold_starts.push(LabeledEvent::new(start, record.function_id.as_str()));
                    pool.add(SimulatedInstance::new(end, end + self.keepalive));
                }
            }
            pool.evict_expired(start);
        }
        cold_starts
    }
}

/// Duration-agnostic ("from-0") policy: every invocation is treated as if it took no time.
///
/// An instance is reused whenever it has not expired (bound inclusive), even if it is still busy.
/// Reuse sets expiry to `start + keepalive`, a new instance gets `last_end = start` and
/// `expiry = start + keepalive`. Expired instances are dropped while searching, and only those newer
/// than the reused one.
pub struct FromZeroPolicy {
    keepalive: f64,
}

impl FromZeroPolicy {
    pub fn new(keepalive_ms: f64) -> Result<Self, AnalysisError> {
        check_keepalive(keepalive_ms)?;
        Ok(Self { keepalive: keepalive_ms })
    }

    pub fn keepalive(&self) -> f64 {
        self.keepalive
    }
}

impl ColdStartPolicy for FromZeroPolicy {
    fn name(&self) -> &str {
        "from-0"
    }

    fn simulate_function(&self, record: &InvocationRecord) -> Vec<LabeledEvent> {
        let mut pool = WarmPool::new();
        let mut cold_starts = Vec::new();
        for &start in record.timestamps.iter() {
            match pool.find_alive_evicting_mut(start) {
                Some(instance) => {
                    instance.expiry_time = start + self.keepalive;
                }
                None => {
                    cold_starts.push(LabeledEvent::new(start, record.function_id.as_str()));
                    pool.add(SimulatedInstance::new(start, start + self.keepalive));
                }
            }
        }
        cold_starts
    }
}

/// Runs the policy over all records sequentially. Cold starts are grouped by function in record order.
pub fn simulate(
    records: &[InvocationRecord],
    policy: &dyn ColdStartPolicy,
) -> Result<Vec<LabeledEvent>, AnalysisError> {
    validate_records(records)?;
    let mut results = Vec::new();
    for record in records.iter() {
        let cold_starts = policy.simulate_function(record);
        debug!(
            "{} policy, function {}: {} cold starts out of {} invocations",
            policy.name(),
            record.function_id,
            cold_starts.len(),
            record.invocations()
        );
        results.extend(cold_starts);
    }
    info!("{} policy: {} cold starts in {} functions", policy.name(), results.len(), records.len());
    Ok(results)
}

/// Cold starts under [`DurationAwarePolicy`].
pub fn simulate_cold_starts(
    records: &[InvocationRecord],
    keepalive_ms: f64,
) -> Result<Vec<LabeledEvent>, AnalysisError> {
    let policy = DurationAwarePolicy::new(keepalive_ms)?;
    simulate(records, &policy)
}

/// Cold starts under [`FromZeroPolicy`].
pub fn simulate_cold_starts_from_zero(
    records: &[InvocationRecord],
    keepalive_ms: f64,
) -> Result<Vec<LabeledEvent>, AnalysisError> {
    let policy = FromZeroPolicy::new(keepalive_ms)?;
    simulate(records, &policy)
}
