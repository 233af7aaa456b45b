use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::{info, LevelFilter};

use dslab_faas_coldstarts::analysis::ColdStartAnalyzer;
use dslab_faas_coldstarts::config::AnalysisConfig;
use dslab_faas_coldstarts::encode::encode_to_csv;
use dslab_faas_coldstarts::extra::azure_trace_2019::{
    process_azure_2019_trace, Azure2019TraceConfig, Granularity, IatDistribution,
};
use dslab_faas_coldstarts::extra::azure_trace_2021::{process_azure_2021_trace, Azure2021TraceConfig};
use dslab_faas_coldstarts::invocation::InvocationRecord;
use dslab_faas_coldstarts::stats::{ColdStartTimeline, MILLIS_PER_MINUTE};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TraceFormat {
    Azure2019,
    Azure2021,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum IatArg {
    Exponential,
    Uniform,
    Equidistant,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GranularityArg {
    Minute,
    Second,
}

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Labels cold starts of a serverless trace under two keep-alive policies and marks periodic functions
struct Args {
    /// Trace format
    #[arg(long, value_enum)]
    trace_format: TraceFormat,

    /// Input files followed by the output CSV path:
    /// `<invocations> <durations> <output>` for azure2019, `<trace> <output>` for azure2021
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Path to YAML file with analysis parameters, overridden by the flags below
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep-alive period in seconds
    #[arg(long)]
    keepalive: Option<f64>,

    /// Tolerance for grouping inter-arrival intervals in milliseconds
    #[arg(long)]
    tolerance: Option<f64>,

    /// Number of simulation threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// How invocations are spread inside a bucket (azure2019)
    #[arg(long, value_enum, default_value_t = IatArg::Exponential)]
    iat_distribution: IatArg,

    /// Randomly shift invocations inside each bucket (azure2019)
    #[arg(long)]
    shift_iat: bool,

    /// Width of one invocation count bucket (azure2019)
    #[arg(long, value_enum, default_value_t = GranularityArg::Minute)]
    granularity: GranularityArg,

    /// Random seed (azure2019)
    #[arg(long, default_value_t = 123456789)]
    seed: u64,

    /// Sort invocations of every function by start time (azure2021)
    #[arg(long)]
    sort_by_start: bool,

    /// Path to produced CSV file with cold starts per minute over the first day
    #[arg(long)]
    timeline: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            AnalysisConfig::from_yaml(path).with_context(|| format!("cannot load config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(keepalive) = args.keepalive {
        config.keepalive_ms = keepalive * 1000.;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance_ms = tolerance;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;
    Ok(config)
}

fn load_trace(args: &Args) -> anyhow::Result<(Vec<InvocationRecord>, PathBuf)> {
    match (args.trace_format, args.paths.as_slice()) {
        (TraceFormat::Azure2019, [invocations, durations, output]) => {
            let config = Azure2019TraceConfig {
                iat_distribution: match args.iat_distribution {
                    IatArg::Exponential => IatDistribution::Exponential,
                    IatArg::Uniform => IatDistribution::Uniform,
                    IatArg::Equidistant => IatDistribution::Equidistant,
                },
                shift_iat: args.shift_iat,
                granularity: match args.granularity {
                    GranularityArg::Minute => Granularity::Minute,
                    GranularityArg::Second => Granularity::Second,
                },
                random_seed: args.seed,
                ..Default::default()
            };
            let records = process_azure_2019_trace(invocations, durations, &config)
                .with_context(|| format!("cannot parse trace {}", invocations.display()))?;
            Ok((records, output.clone()))
        }
        (TraceFormat::Azure2021, [trace, output]) => {
            let config = Azure2021TraceConfig {
                sort_by_start: args.sort_by_start,
                ..Default::default()
            };
            let records = process_azure_2021_trace(trace, &config)
                .with_context(|| format!("cannot parse trace {}", trace.display()))?;
            Ok((records, output.clone()))
        }
        (TraceFormat::Azure2019, paths) => bail!(
            "azure2019 expects <invocations> <durations> <output>, got {} paths",
            paths.len()
        ),
        (TraceFormat::Azure2021, paths) => bail!("azure2021 expects <trace> <output>, got {} paths", paths.len()),
    }
}

/// Start of the minute containing the earliest invocation.
fn first_minute(records: &[InvocationRecord]) -> f64 {
    let earliest = records
        .iter()
        .flat_map(|r| r.timestamps.iter().copied())
        .fold(f64::INFINITY, f64::min);
    if earliest.is_finite() {
        (earliest / MILLIS_PER_MINUTE).floor() * MILLIS_PER_MINUTE
    } else {
        0.
    }
}

fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let (records, output) = load_trace(&args)?;
    info!("trace processed successfully, {} functions", records.len());

    let result = ColdStartAnalyzer::new(config)?.analyze(&records)?;
    encode_to_csv(&result.rows, &output).with_context(|| format!("cannot write {}", output.display()))?;

    if let Some(path) = &args.timeline {
        let timeline = ColdStartTimeline::daily(&result.cold_starts, first_minute(&records));
        timeline
            .write_to_file(path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("{} cold starts in the first day", timeline.total());
    }

    result.stats.print_summary(&output.display().to_string());
    Ok(())
}
