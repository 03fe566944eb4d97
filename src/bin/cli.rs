use std::path::PathBuf;

use clap::Parser;
use mpegts_latency::monitor::{run, SessionConfig, SourceSpec};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Compare PCR timing between two redundant MPEG-TS inputs
#[derive(Parser)]
struct Opt {
    /// Output file name for CSV reporting (standard error by default)
    #[clap(short = 'o', long = "output-file")]
    output_file: Option<PathBuf>,

    /// Latency threshold between the two inputs in milliseconds
    #[clap(long, default_value_t = 0)]
    latency: u64,

    /// Maximum number of packets to read from an input at a time
    #[clap(long, default_value_t = 128)]
    batch: usize,

    /// First input descriptor (udp://ADDR:PORT or a TS file path)
    input1: SourceSpec,

    /// Second input descriptor (udp://ADDR:PORT or a TS file path)
    input2: SourceSpec,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();

    let mut config = SessionConfig::new(vec![opt.input1, opt.input2]);
    config.latency_threshold_ms = opt.latency as f64;
    config.output_path = opt.output_file;
    config.packet_batch_max = opt.batch;

    if let Err(err) = run(config) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
