use std::{
    env,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use motion_estimator::{
    estimation::EstimatorParams,
    parameters::ParameterSet,
    replay::{ReplayOptions, replay},
};

/// Replays a CSV accelerometer recording (`x,y,z,timestamp`) through a motion
/// session and prints the estimates as JSON lines.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    /// Parameter file, defaults are used when omitted
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Print one estimate every N accepted samples
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Also print the plot geometry whenever a visualization refresh is due
    #[arg(short, long)]
    frames: bool,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let args = Args::parse();

    let params = match &args.params {
        Some(path) => load_params(path)?,
        None => EstimatorParams::default(),
    };

    let input = File::open(&args.input)
        .with_context(|| format!("Cannot open recording '{}'", args.input.display()))?;

    let options = ReplayOptions {
        every: args.every,
        frames: args.frames,
    };

    let stats = replay(input, io::stdout().lock(), params, &options)?;

    info!(
        "Replay done: {} accepted, {} dropped, {} rejected",
        stats.accepted, stats.dropped, stats.rejected
    );

    Ok(())
}

fn load_params(path: &Path) -> Result<EstimatorParams> {
    info!("Reading parameters from '{}'", path.display());

    let params_toml = fs::read_to_string(path)
        .with_context(|| format!("Cannot read parameter file '{}'", path.display()))?;
    let params = ParameterSet::parse(&params_toml)?;

    Ok(EstimatorParams::from_params(&params.section("estimator")?)?)
}
