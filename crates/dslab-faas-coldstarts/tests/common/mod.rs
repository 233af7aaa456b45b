#![allow(dead_code)]

use dslab_faas_coldstarts::invocation::{InvocationRecord, LabeledEvent};

/// Enables library logs in tests, controlled by `RUST_LOG`.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps);
}

pub fn record(id: &str, timestamps: &[f64], durations: &[f64]) -> InvocationRecord {
    InvocationRecord::new(id, timestamps.to_vec(), durations.to_vec())
}

pub fn zero_record(id: &str, timestamps: &[f64]) -> InvocationRecord {
    InvocationRecord::with_zero_durations(id, timestamps.to_vec())
}

pub fn timestamps(events: &[LabeledEvent]) -> Vec<f64> {
    events.iter().map(|e| e.timestamp).collect()
}

pub fn events(id: &str, timestamps: &[f64]) -> Vec<LabeledEvent> {
    timestamps.iter().map(|&t| LabeledEvent::new(t, id)).collect()
}

/// Invocations every `period` ms starting at `start`.
pub fn periodic_timestamps(start: f64, period: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + (i as f64) * period).collect()
}
