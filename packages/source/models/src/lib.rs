#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset definition types.
//!
//! A dataset definition describes one accident table and its boundary
//! map: how the table is delimited, how dates are written, which source
//! column holds each [`AccidentField`], which `GeoJSON` properties hold the
//! region id and name, and where the raw and prepared files live.
//! Definitions are deserialized from TOML.

use std::path::{Path, PathBuf};

use accident_map_accident_models::AccidentField;
use serde::{Deserialize, Serialize};

/// A complete dataset definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"ms_acidentes"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Field delimiter for both the raw and prepared tables.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// `chrono` format string for the accident date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// WHATWG encoding label of the raw table (e.g. `"windows-1252"`).
    /// Prepared tables are always written as UTF-8.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Source column names for each logical field.
    pub columns: ColumnMapping,
    /// `GeoJSON` property names on the boundary map.
    #[serde(default)]
    pub boundaries: BoundaryFieldMapping,
    /// File locations, relative to the data directory.
    pub paths: DatasetPaths,
}

impl DatasetDefinition {
    /// Returns the source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the delimiter as a single byte, as the `csv` crate expects.
    ///
    /// Multi-byte characters fall back to `;`.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }
}

fn default_delimiter() -> char {
    ';'
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// Source column names for every [`AccidentField`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Accident identifier column.
    pub accident_id: String,
    /// Accident date column.
    pub accident_date: String,
    /// Municipality code column.
    pub municipality_code: String,
    /// Fatal accident count column.
    pub fatal_accident_count: String,
    /// Weather condition column.
    pub weather_condition: String,
    /// Time-of-day phase column.
    pub time_of_day_phase: String,
    /// Accident type column.
    pub accident_type: String,
    /// Day-of-week column.
    pub day_of_week: String,
    /// Derived month column written by the preparation stage.
    #[serde(default = "default_month_column")]
    pub month: String,
    /// Derived year column written by the preparation stage.
    #[serde(default = "default_year_column")]
    pub year: String,
}

impl ColumnMapping {
    /// Returns the source column name for a logical field.
    #[must_use]
    pub fn column(&self, field: AccidentField) -> &str {
        match field {
            AccidentField::AccidentId => &self.accident_id,
            AccidentField::AccidentDate => &self.accident_date,
            AccidentField::MunicipalityCode => &self.municipality_code,
            AccidentField::FatalAccidentCount => &self.fatal_accident_count,
            AccidentField::WeatherCondition => &self.weather_condition,
            AccidentField::TimeOfDayPhase => &self.time_of_day_phase,
            AccidentField::AccidentType => &self.accident_type,
            AccidentField::DayOfWeek => &self.day_of_week,
            AccidentField::Month => &self.month,
            AccidentField::Year => &self.year,
        }
    }
}

fn default_month_column() -> String {
    "month".to_string()
}

fn default_year_column() -> String {
    "year".to_string()
}

/// `GeoJSON` property names on the boundary map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryFieldMapping {
    /// Property holding the region identifier.
    pub id_property: String,
    /// Property holding the display name.
    pub name_property: String,
}

impl Default for BoundaryFieldMapping {
    fn default() -> Self {
        Self {
            id_property: "id".to_string(),
            name_property: "name".to_string(),
        }
    }
}

/// Raw and prepared file locations.
///
/// Relative paths are resolved against the data directory passed to
/// [`Self::resolve`]; absolute paths are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    /// Raw accident table.
    pub raw_accidents: PathBuf,
    /// Raw boundary map.
    pub raw_boundaries: PathBuf,
    /// Prepared accident table.
    pub prepared_accidents: PathBuf,
    /// Prepared boundary map.
    pub prepared_boundaries: PathBuf,
}

impl DatasetPaths {
    /// Returns a copy with every relative path joined onto `data_dir`.
    #[must_use]
    pub fn resolve(&self, data_dir: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                data_dir.join(p)
            }
        };

        Self {
            raw_accidents: join(&self.raw_accidents),
            raw_boundaries: join(&self.raw_boundaries),
            prepared_accidents: join(&self.prepared_accidents),
            prepared_boundaries: join(&self.prepared_boundaries),
        }
    }
}
