use clap::Parser;
use geo_deep_water::{init_logging, run, RunConfig, RunError};
use std::path::PathBuf;
use std::process;
use tracing::error;

/// Turn bathymetric contours into deep-water areas trimmed to the coastline
#[derive(Debug, Parser)]
#[command(name = "deep-water", version)]
struct Args {
    /// JSON run configuration
    config: PathBuf,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = execute(&args) {
        error!(error = %e, "run failed");
        process::exit(1);
    }
}

fn execute(args: &Args) -> Result<(), RunError> {
    let config = RunConfig::load(&args.config)?;
    run(&config)?;
    Ok(())
}
