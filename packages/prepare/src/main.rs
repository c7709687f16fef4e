#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the preparation stage.

use std::path::PathBuf;

use accident_map_source::progress::null_progress;
use accident_map_source::registry::resolve_dataset;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "accident_map_prepare",
    about = "Normalize raw accident tables and boundary maps"
)]
struct Cli {
    /// Embedded dataset id (overrides `ACCIDENT_MAP_DATASET`)
    #[arg(long)]
    dataset: Option<String>,
    /// Path to a dataset definition TOML file (overrides `--dataset`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the dataset's relative paths are resolved against
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let dataset = resolve_dataset(cli.config.as_deref(), cli.dataset.as_deref())?;
    let report = accident_map_prepare::run(&dataset, &cli.data_dir, &null_progress())?;

    println!(
        "Prepared {} records ({} unparseable dates) and {} boundaries",
        report.records, report.unparseable_dates, report.boundary_features
    );
    println!("  {}", report.accidents_path.display());
    println!("  {}", report.boundaries_path.display());

    Ok(())
}
