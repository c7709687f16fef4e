#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality boundary and joined aggregate types.
//!
//! These types describe the polygon side of the accident/boundary join
//! and the rows produced when accident aggregates are attached to it.

pub mod region_key;

use serde::{Deserialize, Serialize};

pub use region_key::RegionKey;

/// A representative point for a boundary, in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

/// One municipality polygon from the boundary map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityBoundary {
    /// Normalized municipality code, unique within the map.
    pub region_id: RegionKey,
    /// Display name (e.g. "Campo Grande").
    pub name: String,
    /// Polygon or multipolygon geometry. `None` when the feature carried
    /// a null geometry; the region is still kept for joins.
    pub geometry: Option<geojson::Geometry>,
    /// Area-weighted centroid of `geometry`.
    pub centroid: Option<Centroid>,
}

/// A boundary with the number of accidents attributed to it.
///
/// Produced by left-joining accident counts onto the boundary map, so
/// every boundary appears exactly once and `accident_count` is zero when
/// no accident matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMunicipality {
    /// Municipality code.
    pub region_id: RegionKey,
    /// Display name.
    pub name: String,
    /// Boundary geometry.
    pub geometry: Option<geojson::Geometry>,
    /// Boundary centroid, for popups and markers.
    pub centroid: Option<Centroid>,
    /// Accidents in the filtered subset whose code equals `region_id`.
    pub accident_count: u64,
}

/// Count of accidents sharing one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category value, `None` for blank source cells.
    pub category: Option<String>,
    /// Number of accidents.
    pub count: u64,
}

/// Per-municipality mortality ratio row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortalityRank {
    /// Municipality code the group was formed on.
    pub municipality_code: RegionKey,
    /// Name from the boundary map, `None` when the code has no boundary.
    pub name: Option<String>,
    /// Sum of fatal accident counts in the group.
    pub fatal_accidents: u64,
    /// Number of accident records in the group.
    pub accidents: u64,
    /// `fatal_accidents / accidents`.
    pub ratio: f64,
}
