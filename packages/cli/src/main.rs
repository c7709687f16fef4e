#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the accident map toolchain.
//!
//! Every stage is reachable as a subcommand; running without one opens a
//! `dialoguer` menu instead. Logging goes through
//! [`accident_map_cli_utils::init_logger`] so log lines and the
//! preparation progress bar never fight for the terminal.

mod commands;
mod interactive;
mod report;

use std::path::PathBuf;

use accident_map_analytics_models::{DashboardFilter, MonthFilter, YearFilter};
use accident_map_source::registry::resolve_dataset;
use accident_map_source_models::DatasetDefinition;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "accident_map", about = "Traffic accident map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    dataset: DatasetArgs,
}

/// Selects the dataset definition and where its files live.
#[derive(Args, Clone)]
struct DatasetArgs {
    /// Embedded dataset id (overrides `ACCIDENT_MAP_DATASET`)
    #[arg(long, global = true)]
    dataset: Option<String>,
    /// Path to a dataset definition TOML file (overrides `--dataset`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory the dataset's relative paths are resolved against
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,
}

impl DatasetArgs {
    fn resolve(&self) -> Result<DatasetDefinition, accident_map_source::SourceError> {
        resolve_dataset(self.config.as_deref(), self.dataset.as_deref())
    }
}

#[derive(Args, Clone, Copy)]
struct FilterArgs {
    /// Year to select, or "all"
    #[arg(long, default_value = "all")]
    year: YearFilter,
    /// Month (1-12) to select, or "all"
    #[arg(long, default_value = "all")]
    month: MonthFilter,
}

impl From<FilterArgs> for DashboardFilter {
    fn from(args: FilterArgs) -> Self {
        Self::new(args.year, args.month)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the embedded dataset definitions
    Datasets,
    /// Normalize the raw accident table and boundary map
    Prepare,
    /// Print the years and months present in the prepared table
    Periods,
    /// Print every aggregate view for a year/month selection
    Views {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Write the choropleth `GeoJSON` and the views JSON
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = accident_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi, &cli.dataset);
    };

    match command {
        Commands::Datasets => commands::list_datasets(),
        Commands::Prepare => {
            let dataset = cli.dataset.resolve()?;
            commands::prepare(&multi, &dataset, &cli.dataset.data_dir)?;
        }
        Commands::Periods => {
            let dataset = cli.dataset.resolve()?;
            commands::show_periods(&dataset, &cli.dataset.data_dir)?;
        }
        Commands::Views { filter, json } => {
            let dataset = cli.dataset.resolve()?;
            commands::show_views(&dataset, &cli.dataset.data_dir, filter.into(), json)?;
        }
        Commands::Export { filter, out } => {
            let dataset = cli.dataset.resolve()?;
            commands::export(&dataset, &cli.dataset.data_dir, filter.into(), &out)?;
        }
    }

    Ok(())
}
