/// Functions responsible for parsing Azure Functions 2019 trace and expanding it into invocations.
/// Trace description: https://github.com/Azure/AzurePublicDataset/blob/master/AzureFunctionsDataset2019.md
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use rand::prelude::*;
use rand_distr::Exp1;
use rand_pcg::Pcg64;

use crate::invocation::InvocationRecord;
use crate::trace::{line_of, parse_field, TraceError};

/// Percentile levels of the duration file columns `percentile_Average_{0,1,25,50,75,99,100}`.
pub const DURATION_PERCENTILES: [f64; 7] = [0., 0.01, 0.25, 0.50, 0.75, 0.99, 1.];

/// Index of the first per-bucket count column in the invocations file.
const FIRST_COUNT_COLUMN: usize = 4;
/// Index of the first percentile column in the durations file.
const FIRST_PERCENTILE_COLUMN: usize = 7;

/// Shortest duration assigned to an invocation, in milliseconds.
const MIN_DURATION_MS: f64 = 1.;

/// How invocations of one bucket are spread inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IatDistribution {
    /// Exponential inter-arrival times rescaled to fill the bucket.
    #[default]
    Exponential,
    /// Start times drawn uniformly at random within the bucket.
    Uniform,
    /// Start times evenly spaced from the beginning of the bucket.
    Equidistant,
}

/// Width of one count column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Minute,
    Second,
}

impl Granularity {
    pub fn bucket_ms(&self) -> f64 {
        match self {
            Granularity::Minute => 60_000.,
            Granularity::Second => 1_000.,
        }
    }
}

/// Struct with Azure 2019 trace settings.
#[derive(Clone, Debug)]
pub struct Azure2019TraceConfig {
    pub iat_distribution: IatDistribution,
    /// Cyclically shift start times inside each bucket by a random offset.
    pub shift_iat: bool,
    pub granularity: Granularity,
    /// This option sets the seed used to initialize random generator.
    pub random_seed: u64,
    /// Added to every start time, in milliseconds.
    pub start_offset_ms: f64,
}

impl Default for Azure2019TraceConfig {
    fn default() -> Self {
        Self {
            iat_distribution: IatDistribution::Exponential,
            shift_iat: false,
            granularity: Granularity::Minute,
            random_seed: 123456789,
            start_offset_ms: 0.,
        }
    }
}

fn function_id(record: &StringRecord) -> Result<String, TraceError> {
    if record.len() < 3 {
        return Err(TraceError::malformed(line_of(record), "missing function hashes"));
    }
    let mut id = record[0].to_string();
    id.push_str(&record[1]);
    id.push_str(&record[2]);
    Ok(id)
}

/// Reads the duration percentiles (in ms) of every function.
fn read_duration_percentiles<R: Read>(reader: R) -> Result<HashMap<String, [f64; 7]>, TraceError> {
    let mut file = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut result = HashMap::new();
    for rec in file.records() {
        let record = rec?;
        let id = function_id(&record)?;
        let mut perc = [0.; 7];
        for (i, value) in perc.iter_mut().enumerate() {
            *value = parse_field(&record, FIRST_PERCENTILE_COLUMN + i, "duration percentile")?;
        }
        result.insert(id, perc);
    }
    Ok(result)
}

/// Samples a duration by picking a uniform quantile and interpolating between the neighbouring percentiles.
pub fn sample_duration<R: Rng>(perc: &[f64; 7], gen: &mut R) -> f64 {
    let p = gen.gen_range(0.0..1.0);
    let mut i = 1;
    while i + 1 < DURATION_PERCENTILES.len() && p >= DURATION_PERCENTILES[i] {
        i += 1;
    }
    let (lo, hi) = (DURATION_PERCENTILES[i - 1], DURATION_PERCENTILES[i]);
    let frac = (p - lo) / (hi - lo);
    f64::max(MIN_DURATION_MS, perc[i - 1] + (perc[i] - perc[i - 1]) * frac)
}

/// Offsets (from the bucket start) of `count` invocations inside a bucket of width `bucket`, ascending.
pub fn bucket_offsets<R: Rng>(
    count: usize,
    bucket: f64,
    distribution: IatDistribution,
    shift: bool,
    gen: &mut R,
) -> Vec<f64> {
    let mut offsets: Vec<f64> = match distribution {
        IatDistribution::Equidistant => (0..count).map(|i| (i as f64) * bucket / (count as f64)).collect(),
        IatDistribution::Uniform => (0..count).map(|_| gen.gen_range(0.0..bucket)).collect(),
        IatDistribution::Exponential => {
            let iats: Vec<f64> = (0..count).map(|_| gen.sample::<f64, _>(Exp1)).collect();
            let total: f64 = iats.iter().sum();
            let mut time = 0.;
            let mut offsets = Vec::with_capacity(count);
            for iat in iats {
                offsets.push(time);
                if total > 0. {
                    time += iat / total * bucket;
                }
            }
            offsets
        }
    };
    if shift && count > 0 {
        let delta = gen.gen_range(0.0..bucket);
        for offset in offsets.iter_mut() {
            *offset = (*offset + delta) % bucket;
        }
    }
    offsets.sort_by(|a, b| a.total_cmp(b));
    offsets
}

/// Parses the trace from readers of the invocation counts file and the duration percentiles file.
pub fn process_azure_2019_trace_from_readers<R1: Read, R2: Read>(
    invocations: R1,
    durations: R2,
    config: &Azure2019TraceConfig,
) -> Result<Vec<InvocationRecord>, TraceError> {
    let durations = read_duration_percentiles(durations)?;
    let mut gen = Pcg64::seed_from_u64(config.random_seed);
    let bucket = config.granularity.bucket_ms();
    let mut inv_file = ReaderBuilder::new().flexible(true).from_reader(invocations);
    if inv_file.headers()?.is_empty() {
        return Err(TraceError::Empty);
    }
    let mut results = Vec::new();
    let mut skipped = 0;
    for inv_rec in inv_file.records() {
        let record = inv_rec?;
        let id = function_id(&record)?;
        let mut counts = Vec::with_capacity(record.len().saturating_sub(FIRST_COUNT_COLUMN));
        for i in FIRST_COUNT_COLUMN..record.len() {
            counts.push(parse_field::<usize>(&record, i, "invocation count")?);
        }
        let perc = match durations.get(&id) {
            Some(perc) => perc,
            None => {
                warn!("function {} has no duration record, skipping it", id);
                skipped += 1;
                continue;
            }
        };
        let mut function = InvocationRecord::new(id, Vec::new(), Vec::new());
        for (t, &count) in counts.iter().enumerate() {
            let bucket_start = config.start_offset_ms + (t as f64) * bucket;
            for offset in bucket_offsets(count, bucket, config.iat_distribution, config.shift_iat, &mut gen) {
                let duration = sample_duration(perc, &mut gen);
                function.push(bucket_start + offset, duration);
            }
        }
        results.push(function);
    }
    info!(
        "Azure 2019 trace parsed: {} functions, {} invocations, {} functions skipped",
        results.len(),
        results.iter().map(|r| r.invocations()).sum::<usize>(),
        skipped
    );
    Ok(results)
}

/// This function parses Azure Functions 2019 trace given its invocations and durations files.
pub fn process_azure_2019_trace(
    invocations_path: &Path,
    durations_path: &Path,
    config: &Azure2019TraceConfig,
) -> Result<Vec<InvocationRecord>, TraceError> {
    process_azure_2019_trace_from_readers(File::open(invocations_path)?, File::open(durations_path)?, config)
}
