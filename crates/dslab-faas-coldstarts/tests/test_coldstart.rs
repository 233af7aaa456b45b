mod common;
use common::{init_logger, record, timestamps, zero_record};

use dslab_faas_coldstarts::coldstart::{
    simulate, simulate_cold_starts, simulate_cold_starts_from_zero, ColdStartPolicy, DurationAwarePolicy,
    FromZeroPolicy,
};
use dslab_faas_coldstarts::error::AnalysisError;
use dslab_faas_coldstarts::invocation::{InvocationRecord, LabeledEvent};

#[test]
fn test_keepalive_window_scenario() {
    init_logger();
    let records = vec![zero_record("f", &[0., 1000., 70000.])];
    let cold_starts = simulate_cold_starts(&records, 60000.).unwrap();
    assert_eq!(
        cold_starts,
        vec![LabeledEvent::new(0., "f"), LabeledEvent::new(70000., "f")]
    );
}

#[test]
fn test_duration_aware_bounds_are_exclusive() {
    init_logger();
    // starts exactly when the previous invocation ends
    let at_end = vec![record("f", &[0., 100.], &[100., 0.])];
    assert_eq!(timestamps(&simulate_cold_starts(&at_end, 1000.).unwrap()), vec![0., 100.]);
    // starts exactly at expiry
    let at_expiry = vec![zero_record("f", &[0., 1000.])];
    assert_eq!(timestamps(&simulate_cold_starts(&at_expiry, 1000.).unwrap()), vec![0., 1000.]);
    // strictly inside the window
    let inside = vec![zero_record("f", &[0., 999.])];
    assert_eq!(timestamps(&simulate_cold_starts(&inside, 1000.).unwrap()), vec![0.]);
}

#[test]
fn test_from_zero_expiry_bound_is_inclusive() {
    init_logger();
    let records = vec![zero_record("f", &[0., 1000.])];
    assert_eq!(timestamps(&simulate_cold_starts_from_zero(&records, 1000.).unwrap()), vec![0.]);
    let records = vec![zero_record("f", &[0., 1000.5])];
    assert_eq!(timestamps(&simulate_cold_starts_from_zero(&records, 1000.).unwrap()), vec![0., 1000.5]);
}

#[test]
fn test_from_zero_ignores_durations() {
    init_logger();
    // the second invocation arrives while the first one is still running
    let records = vec![record("f", &[0., 10.], &[100., 100.])];
    assert_eq!(timestamps(&simulate_cold_starts(&records, 1000.).unwrap()), vec![0., 10.]);
    assert_eq!(timestamps(&simulate_cold_starts_from_zero(&records, 1000.).unwrap()), vec![0.]);
}

#[test]
fn test_from_zero_expiry_does_not_include_duration() {
    init_logger();
    // expiry after reuse at 900 is 1900, not 1900 + duration
    let records = vec![record("f", &[0., 900., 1950.], &[500., 500., 500.])];
    assert_eq!(timestamps(&simulate_cold_starts_from_zero(&records, 1000.).unwrap()), vec![0., 1950.]);
}

#[test]
fn test_duration_aware_expiry_includes_duration() {
    init_logger();
    // instance ends at 600, so it stays warm until 1600
    let records = vec![record("f", &[0., 1500.], &[600., 0.])];
    assert_eq!(timestamps(&simulate_cold_starts(&records, 1000.).unwrap()), vec![0.]);
    assert_eq!(timestamps(&simulate_cold_starts_from_zero(&records, 1000.).unwrap()), vec![0., 1500.]);
}

#[test]
fn test_concurrent_invocations_create_instances() {
    init_logger();
    let records = vec![record("f", &[0., 10., 20., 200.], &[100., 100., 100., 0.])];
    assert_eq!(timestamps(&simulate_cold_starts(&records, 1000.).unwrap()), vec![0., 10., 20.]);
}

#[test]
fn test_records_are_not_resorted() {
    init_logger();
    let records = vec![zero_record("f", &[5000., 0., 500.])];
    // 0 arrives before the instance created at 5000 became idle, 500 reuses the instance created at 0
    assert_eq!(timestamps(&simulate_cold_starts(&records, 1000.).unwrap()), vec![5000., 0.]);
}

#[test]
fn test_functions_do_not_share_instances() {
    init_logger();
    let records = vec![
        zero_record("a", &[0., 100.]),
        zero_record("b", &[50., 150.]),
        zero_record("c", &[]),
    ];
    let cold_starts = simulate_cold_starts(&records, 1000.).unwrap();
    assert_eq!(
        cold_starts,
        vec![LabeledEvent::new(0., "a"), LabeledEvent::new(50., "b")]
    );
    let cold_starts = simulate_cold_starts_from_zero(&records, 1000.).unwrap();
    assert_eq!(
        cold_starts,
        vec![LabeledEvent::new(0., "a"), LabeledEvent::new(50., "b")]
    );
}

#[test]
fn test_cold_start_count_bounds() {
    init_logger();
    let records: Vec<InvocationRecord> = (0..20)
        .map(|i| {
            let ts: Vec<f64> = (0..(i + 1)).map(|j| (j * j * 137 % 5000) as f64 * (i as f64)).collect();
            let dur: Vec<f64> = (0..(i + 1)).map(|j| ((j * 31) % 700) as f64).collect();
            InvocationRecord::new(format!("f{}", i), ts, dur)
        })
        .collect();
    let policies: Vec<Box<dyn ColdStartPolicy>> = vec![
        Box::new(DurationAwarePolicy::new(1500.).unwrap()),
        Box::new(FromZeroPolicy::new(1500.).unwrap()),
    ];
    for policy in policies.iter() {
        for rec in records.iter() {
            let cold_starts = policy.simulate_function(rec);
            assert!(cold_starts.len() <= rec.invocations());
            assert!(!cold_starts.is_empty());
            assert_eq!(cold_starts[0].timestamp, rec.timestamps[0]);
        }
    }
}

#[test]
fn test_simulation_is_deterministic() {
    init_logger();
    let records = vec![
        record("a", &[0., 10., 20., 3000., 3001.], &[50., 5., 0., 10., 10.]),
        record("b", &[7., 8., 9., 10000.], &[1., 1., 1., 1.]),
    ];
    let first = simulate_cold_starts(&records, 1000.).unwrap();
    let first_from_zero = simulate_cold_starts_from_zero(&records, 1000.).unwrap();
    for _ in 0..10 {
        assert_eq!(first, simulate_cold_starts(&records, 1000.).unwrap());
        assert_eq!(first_from_zero, simulate_cold_starts_from_zero(&records, 1000.).unwrap());
    }
}

#[test]
fn test_inconsistent_record_aborts_batch() {
    init_logger();
    let records = vec![zero_record("ok", &[0., 1.]), record("broken", &[0., 1.], &[0.])];
    let expected = AnalysisError::InconsistentRecord {
        function_id: "broken".to_string(),
        timestamps: 2,
        durations: 1,
    };
    assert_eq!(simulate_cold_starts(&records, 1000.), Err(expected.clone()));
    assert_eq!(simulate_cold_starts_from_zero(&records, 1000.), Err(expected));
}

#[test]
fn test_invalid_keepalive_is_rejected() {
    init_logger();
    let records = vec![zero_record("f", &[0.])];
    for keepalive in [0., -1., f64::NAN, f64::INFINITY] {
        assert!(matches!(
            simulate_cold_starts(&records, keepalive),
            Err(AnalysisError::InvalidParameter { name: "keepalive_ms", .. })
        ));
        assert!(simulate_cold_starts_from_zero(&records, keepalive).is_err());
    }
}

#[test]
fn test_policy_names() {
    init_logger();
    let policy = DurationAwarePolicy::new(1.).unwrap();
    assert_eq!(policy.name(), "duration-aware");
    assert_eq!(simulate(&[], &policy).unwrap(), vec![]);
    assert_eq!(FromZeroPolicy::new(1.).unwrap().name(), "from-0");
    assert_eq!(policy.keepalive(), 1.);
    assert_eq!(FromZeroPolicy::new(2500.).unwrap().keepalive(), 2500.);
}
