#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Preparation stage.
//!
//! Turns the raw accident table and raw boundary map into their prepared
//! forms:
//!
//! * the accident date is parsed with the dataset's format and rewritten
//!   as ISO 8601 (blank when it could not be parsed);
//! * month and year columns are derived from it (blank alongside a blank
//!   date);
//! * municipality codes and boundary ids go through
//!   [`RegionKey::normalize`] so both sides of the join are string-equal.
//!
//! Every other column and property is carried through untouched. Both
//! inputs are read and normalized before anything is written, and outputs
//! are renamed into place only once both have been staged, so a failed
//! write never leaves a partial file behind. If a rename fails, outputs
//! already renamed stay in place and the remaining staged files are
//! removed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use accident_map_accident_models::{AccidentField, derive_month_year};
use accident_map_geography::GeoError;
use accident_map_geography::boundaries::{
    normalize_feature_collection, read_feature_collection, to_geojson_string,
};
use accident_map_geography_models::RegionKey;
use accident_map_source::parsing::{format_iso_date, parse_accident_date};
use accident_map_source::progress::ProgressCallback;
use accident_map_source::table::DelimitedTable;
use accident_map_source::SourceError;
use accident_map_source_models::DatasetDefinition;
use geojson::FeatureCollection;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during preparation.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// Reading the accident table or dataset definition failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Reading or serializing the boundary map failed.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Writing an output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The raw accident table lacks columns preparation depends on.
    #[error("Missing required field(s) in raw accident table: {}", fields.join(", "))]
    MissingRequiredField {
        /// Source column names that were not found.
        fields: Vec<String>,
    },
}

/// Accident table after normalization.
#[derive(Debug, Clone)]
pub struct PreparedAccidents {
    /// The normalized table, ready to persist.
    pub table: DelimitedTable,
    /// Rows whose non-blank date did not match the dataset's format.
    pub unparseable_dates: u64,
}

/// Summary of a completed preparation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareReport {
    /// Dataset that was prepared.
    pub dataset_id: String,
    /// Accident records written.
    pub records: u64,
    /// Records whose date degraded to null.
    pub unparseable_dates: u64,
    /// Boundary features written.
    pub boundary_features: u64,
    /// Prepared accident table location.
    pub accidents_path: PathBuf,
    /// Prepared boundary map location.
    pub boundaries_path: PathBuf,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Normalizes a raw accident table.
///
/// Malformed dates never fail the run: the row is kept with a blank date,
/// month and year.
///
/// # Errors
///
/// Returns [`PrepareError::MissingRequiredField`] if the date or
/// municipality code column is absent.
pub fn prepare_accidents(
    mut table: DelimitedTable,
    dataset: &DatasetDefinition,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PreparedAccidents, PrepareError> {
    let columns = &dataset.columns;

    let missing = table.missing_columns(
        AccidentField::required_for_preparation()
            .iter()
            .map(|f| columns.column(*f)),
    );
    if !missing.is_empty() {
        return Err(PrepareError::MissingRequiredField { fields: missing });
    }

    let date_idx = table
        .column_index(columns.column(AccidentField::AccidentDate))
        .unwrap_or_default();
    let code_idx = table
        .column_index(columns.column(AccidentField::MunicipalityCode))
        .unwrap_or_default();
    let month_idx = table.ensure_column(columns.column(AccidentField::Month));
    let year_idx = table.ensure_column(columns.column(AccidentField::Year));

    progress.set_total(table.len() as u64);
    progress.set_message(format!("Normalizing {}", dataset.id));

    let mut unparseable_dates = 0u64;

    for row in table.rows_mut() {
        let raw_date = &row[date_idx];
        let date = parse_accident_date(raw_date, &dataset.date_format);
        if date.is_none() && !raw_date.trim().is_empty() {
            log::debug!("Unparseable accident date '{raw_date}'");
            unparseable_dates += 1;
        }

        let (month, year) = derive_month_year(date);
        row[date_idx] = format_iso_date(date);
        row[month_idx] = month.map(|m| m.to_string()).unwrap_or_default();
        row[year_idx] = year.map(|y| y.to_string()).unwrap_or_default();
        row[code_idx] = RegionKey::normalize(&row[code_idx]).to_string();

        progress.inc(1);
    }

    if unparseable_dates > 0 {
        log::warn!(
            "{unparseable_dates} accident date(s) did not match '{}' and were left blank",
            dataset.date_format
        );
    }

    Ok(PreparedAccidents {
        table,
        unparseable_dates,
    })
}

/// Normalizes a raw boundary map's region identifiers.
#[must_use]
pub fn prepare_boundaries(
    collection: FeatureCollection,
    dataset: &DatasetDefinition,
) -> FeatureCollection {
    normalize_feature_collection(collection, &dataset.boundaries.id_property)
}

/// Runs the full preparation stage for a dataset.
///
/// Paths in the definition are resolved against `data_dir`.
///
/// # Errors
///
/// Returns [`PrepareError`] if an input is missing or unreadable, a
/// required column is absent, or an output cannot be written. No output
/// file is modified when an error is returned.
pub fn run(
    dataset: &DatasetDefinition,
    data_dir: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PrepareReport, PrepareError> {
    let start = Instant::now();
    let paths = dataset.paths.resolve(data_dir);

    log::info!(
        "[{}] Reading {} and {}",
        dataset.id,
        paths.raw_accidents.display(),
        paths.raw_boundaries.display()
    );

    let raw_table = DelimitedTable::read(
        &paths.raw_accidents,
        dataset.delimiter_byte(),
        &dataset.encoding,
    )?;
    let raw_boundaries = read_feature_collection(&paths.raw_boundaries)?;

    let prepared = prepare_accidents(raw_table, dataset, progress)?;
    let boundaries = prepare_boundaries(raw_boundaries, dataset);

    let accidents_bytes = prepared.table.to_bytes(dataset.delimiter_byte())?;
    let boundaries_text = to_geojson_string(&boundaries)?;

    write_all_or_nothing(&[
        (paths.prepared_accidents.as_path(), accidents_bytes.as_slice()),
        (paths.prepared_boundaries.as_path(), boundaries_text.as_bytes()),
    ])?;

    let report = PrepareReport {
        dataset_id: dataset.id.clone(),
        records: prepared.table.len() as u64,
        unparseable_dates: prepared.unparseable_dates,
        boundary_features: boundaries.features.len() as u64,
        accidents_path: paths.prepared_accidents,
        boundaries_path: paths.prepared_boundaries,
        duration: start.elapsed(),
    };

    progress.finish(format!(
        "[{}] prepared {} records, {} boundaries",
        report.dataset_id, report.records, report.boundary_features
    ));
    log::info!(
        "[{}] Wrote {} records ({} unparseable dates) to {} and {} boundaries to {} in {:.1}s",
        report.dataset_id,
        report.records,
        report.unparseable_dates,
        report.accidents_path.display(),
        report.boundary_features,
        report.boundaries_path.display(),
        report.duration.as_secs_f64()
    );

    Ok(report)
}

/// Writes each output to a temporary sibling, then renames them all into
/// place. Temporary files not yet renamed are removed if any write or
/// rename fails.
fn write_all_or_nothing(outputs: &[(&Path, &[u8])]) -> std::io::Result<()> {
    let staged: Vec<(PathBuf, &Path)> = outputs
        .iter()
        .map(|(path, _)| (temp_sibling(path), *path))
        .collect();

    let written = outputs.iter().zip(&staged).try_for_each(|((path, bytes), (tmp, _))| {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(tmp, bytes)
    });

    if let Err(e) = written {
        for (tmp, _) in &staged {
            std::fs::remove_file(tmp).ok();
        }
        return Err(e);
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, path) {
            for (pending, _) in &staged[i..] {
                std::fs::remove_file(pending).ok();
            }
            return Err(e);
        }
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
