#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality boundary map handling.
//!
//! Reads `GeoJSON` boundary files, rewrites their region identifiers
//! through [`RegionKey`](accident_map_geography_models::RegionKey) so they
//! join cleanly against accident tables, and builds the in-memory
//! [`BoundaryMap`](boundaries::BoundaryMap) the aggregation stage joins
//! onto.

pub mod boundaries;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The boundary file does not exist.
    #[error("Boundary map not found: {}", path.display())]
    MissingInput {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
