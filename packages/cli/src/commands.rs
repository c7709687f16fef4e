//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::path::Path;

use accident_map_analytics::Dashboard;
use accident_map_analytics::export::{export_all, without_geometry};
use accident_map_analytics_models::DashboardFilter;
use accident_map_cli_utils::{IndicatifProgress, MultiProgress};
use accident_map_source::registry::all_datasets;
use accident_map_source_models::DatasetDefinition;

use crate::report;

pub fn list_datasets() {
    let datasets = all_datasets();
    println!("{:<20} NAME", "ID");
    println!("{}", "-".repeat(50));
    for dataset in &datasets {
        println!("{:<20} {}", dataset.id(), dataset.name());
    }
}

/// Runs the preparation stage with a progress bar.
///
/// # Errors
///
/// Returns an error if an input is missing or an output cannot be written.
pub fn prepare(
    multi: &MultiProgress,
    dataset: &DatasetDefinition,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::records_bar(multi, &format!("Preparing {}", dataset.id));
    let report = accident_map_prepare::run(dataset, data_dir, &progress)?;

    println!(
        "Prepared {} records ({} unparseable dates) and {} boundaries in {:.1}s",
        report.records,
        report.unparseable_dates,
        report.boundary_features,
        report.duration.as_secs_f64()
    );
    println!("  {}", report.accidents_path.display());
    println!("  {}", report.boundaries_path.display());

    Ok(())
}

/// Prints the years and months present in the prepared table.
///
/// # Errors
///
/// Returns an error if the prepared outputs cannot be loaded.
pub fn show_periods(
    dataset: &DatasetDefinition,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = Dashboard::load(dataset, data_dir)?;
    print!("{}", report::format_periods(&dashboard.available_periods()));
    Ok(())
}

/// Prints every view for `filter`, as tables or as JSON.
///
/// # Errors
///
/// Returns an error if the prepared outputs cannot be loaded.
pub fn show_views(
    dataset: &DatasetDefinition,
    data_dir: &Path,
    filter: DashboardFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = Dashboard::load(dataset, data_dir)?;
    print_views(&dashboard, filter, json)
}

pub fn print_views(
    dashboard: &Dashboard,
    filter: DashboardFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let views = dashboard.views(filter);
    if json {
        println!("{}", serde_json::to_string_pretty(&without_geometry(&views))?);
    } else {
        print!("{}", report::format_views(&views));
    }
    Ok(())
}

/// Writes the choropleth and views JSON for `filter` into `out`.
///
/// # Errors
///
/// Returns an error if the prepared outputs cannot be loaded or the export
/// cannot be written.
pub fn export(
    dataset: &DatasetDefinition,
    data_dir: &Path,
    filter: DashboardFilter,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = Dashboard::load(dataset, data_dir)?;
    export_dashboard(&dashboard, filter, out)
}

pub fn export_dashboard(
    dashboard: &Dashboard,
    filter: DashboardFilter,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let views = dashboard.views(filter);
    export_all(out, &views)?;
    println!("Exported '{}' to {}", views.filter, out.display());
    Ok(())
}
