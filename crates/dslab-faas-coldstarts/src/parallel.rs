//! Utilities for simulating many functions in parallel.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc::channel, Arc};

use log::info;
use threadpool::ThreadPool;

use crate::coldstart::ColdStartPolicy;
use crate::error::AnalysisError;
use crate::invocation::{validate_records, InvocationRecord, LabeledEvent};

/// Simulates every function as a separate task in a thread pool with `n_workers` worker threads.
///
/// The output is the same as the one of [`crate::coldstart::simulate`]: functions keep their input order
/// and cold starts of each function keep their record order. A panic inside the policy is re-raised on
/// the calling thread.
pub fn parallel_simulation_n_workers(
    records: &[InvocationRecord],
    policy: Arc<dyn ColdStartPolicy>,
    n_workers: usize,
) -> Result<Vec<LabeledEvent>, AnalysisError> {
    if n_workers == 0 {
        return Err(AnalysisError::invalid_parameter(
            "workers",
            0.,
            "at least one worker is required",
        ));
    }
    validate_records(records)?;
    let pool = ThreadPool::new(n_workers);
    let (tx, rx) = channel();
    let len = records.len();
    for (id, record) in records.iter().cloned().enumerate() {
        let tx = tx.clone();
        let policy = policy.clone();
        pool.execute(move || {
            let cold_starts = panic::catch_unwind(AssertUnwindSafe(|| policy.simulate_function(&record)));
            // the receiver outlives the pool, so sending can't fail
            let _ = tx.send((id, cold_starts));
        });
    }
    drop(tx);
    let mut results = Vec::with_capacity(len);
    for (id, cold_starts) in rx.iter().take(len) {
        match cold_starts {
            Ok(cold_starts) => results.push((id, cold_starts)),
            // a panicking policy panics the caller, as in sequential simulation
            Err(payload) => panic::resume_unwind(payload),
        }
    }
    results.sort_by_key(|x| x.0);
    let cold_starts: Vec<_> = results.drain(..).flat_map(|x| x.1).collect();
    info!(
        "{} policy: {} cold starts in {} functions ({} workers)",
        policy.name(),
        cold_starts.len(),
        len,
        n_workers
    );
    Ok(cold_starts)
}

/// Similar to [`parallel_simulation_n_workers`], but with one worker per available CPU.
pub fn parallel_simulation(
    records: &[InvocationRecord],
    policy: Arc<dyn ColdStartPolicy>,
) -> Result<Vec<LabeledEvent>, AnalysisError> {
    let n_workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    parallel_simulation_n_workers(records, policy, n_workers)
}
