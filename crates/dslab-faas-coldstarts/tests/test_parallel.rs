mod common;
use common::{init_logger, periodic_timestamps, record, zero_record};

use std::sync::Arc;

use dslab_faas_coldstarts::coldstart::{simulate, ColdStartPolicy, DurationAwarePolicy, FromZeroPolicy};
use dslab_faas_coldstarts::error::AnalysisError;
use dslab_faas_coldstarts::invocation::{InvocationRecord, LabeledEvent};
use dslab_faas_coldstarts::parallel::{parallel_simulation, parallel_simulation_n_workers};

fn workload() -> Vec<InvocationRecord> {
    let mut records = Vec::new();
    for i in 0..20 {
        let period = 10000. * ((i % 7) as f64 + 1.);
        let timestamps = periodic_timestamps((i as f64) * 13., period, 50 + i);
        let durations: Vec<f64> = (0..timestamps.len()).map(|j| ((j * 31 + i) % 17) as f64 * 1000.).collect();
        records.push(record(&format!("f{}", i), &timestamps, &durations));
    }
    records.push(zero_record("empty", &[]));
    records
}

#[test]
fn test_parallel_matches_sequential() {
    init_logger();
    let records = workload();
    let policies: Vec<Arc<dyn ColdStartPolicy>> = vec![
        Arc::new(DurationAwarePolicy::new(60000.).unwrap()),
        Arc::new(FromZeroPolicy::new(60000.).unwrap()),
    ];
    for policy in policies {
        let sequential = simulate(&records, policy.as_ref()).unwrap();
        for n_workers in [1, 2, 4, 8] {
            let parallel = parallel_simulation_n_workers(&records, policy.clone(), n_workers).unwrap();
            assert_eq!(parallel, sequential);
        }
        assert_eq!(parallel_simulation(&records, policy).unwrap(), sequential);
    }
}

#[test]
fn test_no_workers() {
    init_logger();
    let policy: Arc<dyn ColdStartPolicy> = Arc::new(FromZeroPolicy::new(1000.).unwrap());
    let result = parallel_simulation_n_workers(&workload(), policy, 0);
    assert!(matches!(result, Err(AnalysisError::InvalidParameter { name: "workers", .. })));
}

#[test]
fn test_inconsistent_record() {
    init_logger();
    let mut records = workload();
    records.push(record("broken", &[1., 2.], &[0.]));
    let policy: Arc<dyn ColdStartPolicy> = Arc::new(DurationAwarePolicy::new(1000.).unwrap());
    let result = parallel_simulation_n_workers(&records, policy, 4);
    assert_eq!(
        result,
        Err(AnalysisError::InconsistentRecord {
            function_id: "broken".to_string(),
            timestamps: 2,
            durations: 1,
        })
    );
}

#[test]
fn test_empty_input() {
    init_logger();
    let policy: Arc<dyn ColdStartPolicy> = Arc::new(DurationAwarePolicy::new(1000.).unwrap());
    assert_eq!(parallel_simulation_n_workers(&[], policy, 3).unwrap(), Vec::new());
}

struct FailingPolicy;

impl ColdStartPolicy for FailingPolicy {
    fn name(&self) -> &str {
        "failing"
    }

    fn simulate_function(&self, record: &InvocationRecord) -> Vec<LabeledEvent> {
        if record.function_id == "f7" {
            panic!("cannot simulate {}", record.function_id);
        }
        Vec::new()
    }
}

#[test]
#[should_panic(expected = "cannot simulate f7")]
fn test_policy_panic_reaches_caller() {
    init_logger();
    let _ = parallel_simulation_n_workers(&workload(), Arc::new(FailingPolicy), 4);
}

#[test]
#[should_panic(expected = "cannot simulate f7")]
fn test_policy_panic_sequential() {
    init_logger();
    let _ = simulate(&workload(), &FailingPolicy);
}
