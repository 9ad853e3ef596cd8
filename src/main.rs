use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use grf_prep::export::SampleExport;
use grf_prep::{dataset, Pipeline, PipelineConfig, PrepareOptions};

#[derive(Parser, Debug)]
#[command(name = "grf_prep")]
#[command(about = "Align pose and ground-reaction-force captures into training windows", long_about = None)]
struct Args {
    /// Trial dataset (.json or .json.gz)
    #[arg(long)]
    data: PathBuf,

    /// Pipeline config JSON (subject masses, axis corrections, scaler dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Movement to select, or "all"
    #[arg(long, default_value = "all")]
    movement: String,

    /// Rows per sample window
    #[arg(long, default_value = "10")]
    sample_size: usize,

    /// Upsample pose to 600 Hz instead of averaging force down to 50 Hz
    #[arg(long, default_value_t = false)]
    interpolate: bool,

    /// Label windows with their last row instead of their midpoint
    #[arg(long, default_value_t = false)]
    end_force: bool,

    /// Correct mirrored x/z force-plate axes
    #[arg(long, default_value_t = false)]
    fix_axes: bool,

    /// Standardize with (or fit and save) the scaler for this model
    #[arg(long)]
    model_name: Option<String>,

    /// Write features and labels here (.json or .json.gz)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let trials = dataset::load_trials(&args.data)
        .with_context(|| format!("loading trials {}", args.data.display()))?;

    let options = PrepareOptions {
        movement: args.movement,
        sample_size: args.sample_size,
        linear_interpolation: args.interpolate,
        end_force: args.end_force,
        fix_axes: args.fix_axes,
        model_name: args.model_name,
    };
    info!("Preparing {:?}", options);

    let pipeline = Pipeline::new(config);
    let samples = pipeline.prepare(&trials, &options)?;
    info!(
        "features {:?}, labels {:?}, cumulative trial samples {:?}",
        samples.features.shape(),
        samples.labels.shape(),
        samples.trial_lengths
    );

    if let Some(path) = &args.output {
        SampleExport::from_samples(&samples)
            .write_to(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {} samples to {}", samples.len(), path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
