//! End-to-end analysis of a batch of function records.

use std::sync::Arc;

use log::info;

use crate::align::{align, AlignedRow};
use crate::coldstart::{simulate, ColdStartPolicy, DurationAwarePolicy, FromZeroPolicy};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::invocation::{total_invocations, validate_records, InvocationRecord, LabeledEvent};
use crate::parallel::parallel_simulation_n_workers;
use crate::periodicity::classify;
use crate::stats::{PolicyStats, Stats};

/// Everything produced by one run.
#[derive(Clone, Debug, Default)]
pub struct AnalysisResult {
    pub periodic_functions: Vec<String>,
    pub non_periodic_functions: Vec<String>,
    /// Duration-aware cold starts of all functions, grouped by function in input order.
    pub cold_starts: Vec<LabeledEvent>,
    /// From-0 cold starts of all functions.
    pub cold_starts_from_zero: Vec<LabeledEvent>,
    /// Duration-aware cold starts of periodic functions.
    pub periodic_cold_starts: Vec<LabeledEvent>,
    pub rows: Vec<AlignedRow>,
    pub stats: Stats,
}

pub struct ColdStartAnalyzer {
    config: AnalysisConfig,
}

impl ColdStartAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn run_policy(
        &self,
        records: &[InvocationRecord],
        policy: Arc<dyn ColdStartPolicy>,
    ) -> Result<Vec<LabeledEvent>, AnalysisError> {
        if self.config.workers > 1 {
            parallel_simulation_n_workers(records, policy, self.config.workers)
        } else {
            simulate(records, policy.as_ref())
        }
    }

    /// Classifies the records, runs both policies and aligns the results.
    /// Fails before doing any work if some record is inconsistent.
    pub fn analyze(&self, records: &[InvocationRecord]) -> Result<AnalysisResult, AnalysisError> {
        validate_records(records)?;
        info!(
            "analyzing {} functions, {} invocations, keepalive = {} ms, tolerance = {} ms",
            records.len(),
            total_invocations(records),
            self.config.keepalive_ms,
            self.config.tolerance_ms
        );
        let classification = classify(records, self.config.tolerance_ms)?;

        let duration_aware: Arc<dyn ColdStartPolicy> = Arc::new(DurationAwarePolicy::new(self.config.keepalive_ms)?);
        let from_zero: Arc<dyn ColdStartPolicy> = Arc::new(FromZeroPolicy::new(self.config.keepalive_ms)?);
        let periodic_cold_starts = self.run_policy(&classification.periodic, duration_aware.clone())?;
        let cold_starts = self.run_policy(records, duration_aware)?;
        let cold_starts_from_zero = self.run_policy(records, from_zero)?;

        let stats = Stats {
            functions: records.len() as u64,
            periodic_functions: classification.periodic.len() as u64,
            all: PolicyStats::new(total_invocations(records), cold_starts.len()),
            from_zero: PolicyStats::new(total_invocations(records), cold_starts_from_zero.len()),
            periodic: PolicyStats::new(
                total_invocations(&classification.periodic),
                periodic_cold_starts.len(),
            ),
        };
        let rows = align(
            cold_starts.clone(),
            cold_starts_from_zero.clone(),
            periodic_cold_starts.clone(),
        );
        Ok(AnalysisResult {
            periodic_functions: classification.periodic.iter().map(|r| r.function_id.clone()).collect(),
            non_periodic_functions: classification
                .non_periodic
                .iter()
                .map(|r| r.function_id.clone())
                .collect(),
            cold_starts,
            cold_starts_from_zero,
            periodic_cold_starts,
            rows,
            stats,
        })
    }
}

/// Shortcut for [`ColdStartAnalyzer::analyze`].
pub fn analyze_cold_starts(
    records: &[InvocationRecord],
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    ColdStartAnalyzer::new(config)?.analyze(records)
}
