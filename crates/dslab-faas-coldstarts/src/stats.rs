//! Summary statistics of an analysis run.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::encode::format_timestamp;
use crate::invocation::LabeledEvent;

pub const MILLIS_PER_MINUTE: f64 = 60_000.;
pub const MINUTES_PER_DAY: usize = 1440;

/// Invocation and cold start counters of one simulation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyStats {
    pub invocations: u64,
    pub cold_starts: u64,
}

impl PolicyStats {
    pub fn new(invocations: usize, cold_starts: usize) -> Self {
        Self {
            invocations: invocations as u64,
            cold_starts: cold_starts as u64,
        }
    }

    /// Fraction of invocations that were cold starts, zero when there were no invocations.
    pub fn cold_start_rate(&self) -> f64 {
        if self.invocations == 0 {
            0.
        } else {
            (self.cold_starts as f64) / (self.invocations as f64)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub functions: u64,
    pub periodic_functions: u64,
    /// Duration-aware policy over all functions.
    pub all: PolicyStats,
    /// From-0 policy over all functions.
    pub from_zero: PolicyStats,
    /// Duration-aware policy over periodic functions only.
    pub periodic: PolicyStats,
}

impl Stats {
    pub fn print_summary(&self, name: &str) {
        println!("describing {}", name);
        println!(
            "{} functions, {} periodic",
            self.functions, self.periodic_functions
        );
        for (descr, stats) in [
            ("duration-aware", &self.all),
            ("from-0", &self.from_zero),
            ("periodic", &self.periodic),
        ] {
            println!(
                "- {}: {} invocations, {} cold starts, cold start rate = {}",
                descr,
                stats.invocations,
                stats.cold_starts,
                stats.cold_start_rate()
            );
        }
    }
}

/// Cold starts counted per one-minute bucket, starting at `start`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColdStartTimeline {
    start: f64,
    counts: Vec<u64>,
}

impl ColdStartTimeline {
    /// Counts cold starts in `buckets` consecutive minutes starting at `start` (ms).
    /// Events outside the window are ignored.
    pub fn from_events(events: &[LabeledEvent], start: f64, buckets: usize) -> Self {
        let mut counts = vec![0; buckets];
        for event in events.iter() {
            let offset = event.timestamp - start;
            if offset < 0. {
                continue;
            }
            let bucket = (offset / MILLIS_PER_MINUTE).floor() as usize;
            if bucket < buckets {
                counts[bucket] += 1;
            }
        }
        Self { start, counts }
    }

    /// One day of minutes starting at `start`.
    pub fn daily(events: &[LabeledEvent], start: f64) -> Self {
        Self::from_events(events, start, MINUTES_PER_DAY)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// (bucket start in ms, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (self.start + (i as f64) * MILLIS_PER_MINUTE, count))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["Minute", "ColdStarts"])?;
        for (minute, count) in self.iter() {
            writer.write_record([format_timestamp(minute), count.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), csv::Error> {
        self.write_csv(File::create(path)?)
    }
}
