//! Boundary map loading, normalization, and persistence.
//!
//! The boundary file is a `GeoJSON` `FeatureCollection` whose features
//! carry a region identifier and a display name as properties. The
//! identifier may be a JSON string or number, or may only be present as
//! the feature-level `id`; normalization rewrites it as a string property
//! so the persisted map is type-stable.

use std::collections::BTreeMap;
use std::path::Path;

use accident_map_geography_models::{Centroid, MunicipalityBoundary, RegionKey};
use geo::Centroid as _;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::GeoError;

/// Reads a `GeoJSON` `FeatureCollection` from disk.
///
/// # Errors
///
/// Returns [`GeoError::MissingInput`] if the file does not exist, or a
/// parse error if it is not a `FeatureCollection`.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection, GeoError> {
    if !path.is_file() {
        return Err(GeoError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    log::debug!(
        "Read {} boundary features from {}",
        collection.features.len(),
        path.display()
    );

    Ok(collection)
}

/// Serializes a `FeatureCollection` to its `GeoJSON` text.
///
/// Output is deterministic for a given collection, so normalizing the
/// same input twice yields identical bytes.
///
/// # Errors
///
/// Returns [`GeoError::Json`] if serialization fails.
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String, GeoError> {
    Ok(serde_json::to_string(collection)?)
}

/// Extracts the region key for a feature.
///
/// Prefers the `id_property` property and falls back to the feature-level
/// `id` member.
#[must_use]
pub fn feature_region_key(feature: &Feature, id_property: &str) -> Option<RegionKey> {
    feature
        .property(id_property)
        .and_then(RegionKey::from_json)
        .or_else(|| match feature.id.as_ref()? {
            Id::String(s) => RegionKey::from_json(&serde_json::Value::String(s.clone())),
            Id::Number(n) => RegionKey::from_json(&serde_json::Value::Number(n.clone())),
        })
}

/// Rewrites every feature's `id_property` as a normalized string.
///
/// All other properties and geometries are left untouched. Features with
/// no usable identifier are kept as-is and logged.
#[must_use]
pub fn normalize_feature_collection(
    mut collection: FeatureCollection,
    id_property: &str,
) -> FeatureCollection {
    let mut missing = 0u64;

    for feature in &mut collection.features {
        if let Some(key) = feature_region_key(feature, id_property) {
            feature.set_property(id_property, key.as_str());
        } else {
            missing += 1;
        }
    }

    if missing > 0 {
        log::warn!("{missing} boundary feature(s) have no '{id_property}' identifier");
    }

    collection
}

/// Computes the centroid of a `GeoJSON` geometry.
#[must_use]
pub fn centroid(geometry: &geojson::Geometry) -> Option<Centroid> {
    let geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    let point = geom.centroid()?;
    Some(Centroid {
        lon: point.x(),
        lat: point.y(),
    })
}

/// In-memory boundary map keyed by [`RegionKey`].
///
/// Preserves the feature order of the source file.
#[derive(Debug, Clone, Default)]
pub struct BoundaryMap {
    boundaries: Vec<MunicipalityBoundary>,
    index: BTreeMap<RegionKey, usize>,
}

impl BoundaryMap {
    /// Builds a boundary map from a feature collection.
    ///
    /// Features without an identifier are skipped. When two features share
    /// an identifier, the first one wins.
    #[must_use]
    pub fn from_feature_collection(
        collection: &FeatureCollection,
        id_property: &str,
        name_property: &str,
    ) -> Self {
        let mut map = Self::default();

        for feature in &collection.features {
            let Some(region_id) = feature_region_key(feature, id_property) else {
                log::warn!("Skipping boundary feature without '{id_property}'");
                continue;
            };

            let name = feature
                .property(name_property)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .unwrap_or_default()
                .to_string();

            map.insert(MunicipalityBoundary {
                centroid: feature.geometry.as_ref().and_then(centroid),
                geometry: feature.geometry.clone(),
                region_id,
                name,
            });
        }

        map
    }

    /// Reads and indexes a boundary file.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the file is missing or unreadable.
    pub fn load(path: &Path, id_property: &str, name_property: &str) -> Result<Self, GeoError> {
        let collection = read_feature_collection(path)?;
        let map = Self::from_feature_collection(&collection, id_property, name_property);
        log::info!("Loaded {} municipality boundaries", map.len());
        Ok(map)
    }

    fn insert(&mut self, boundary: MunicipalityBoundary) {
        if self.index.contains_key(&boundary.region_id) {
            log::warn!(
                "Duplicate boundary id {}, keeping the first occurrence",
                boundary.region_id
            );
            return;
        }
        self.index
            .insert(boundary.region_id.clone(), self.boundaries.len());
        self.boundaries.push(boundary);
    }

    /// Looks up a boundary by region key.
    #[must_use]
    pub fn get(&self, key: &RegionKey) -> Option<&MunicipalityBoundary> {
        self.index.get(key).map(|&i| &self.boundaries[i])
    }

    /// Looks up a boundary's display name by region key.
    #[must_use]
    pub fn name_of(&self, key: &RegionKey) -> Option<&str> {
        self.get(key).map(|b| b.name.as_str())
    }

    /// Iterates boundaries in source order.
    pub fn iter(&self) -> impl Iterator<Item = &MunicipalityBoundary> {
        self.boundaries.iter()
    }

    /// Number of boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the map has no boundaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

impl FromIterator<MunicipalityBoundary> for BoundaryMap {
    fn from_iter<T: IntoIterator<Item = MunicipalityBoundary>>(iter: T) -> Self {
        let mut map = Self::default();
        for boundary in iter {
            map.insert(boundary);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "id": 5002704, "name": "Campo Grande" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "id": "5003702",
                "properties": { "name": "Dourados" },
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": { "id": "5002704.0", "name": "Duplicate" },
                "geometry": null
            }
        ]
    }"#;

    fn sample() -> FeatureCollection {
        FeatureCollection::try_from(SAMPLE.parse::<GeoJson>().unwrap()).unwrap()
    }

    #[test]
    fn builds_map_with_string_keys() {
        let map = BoundaryMap::from_feature_collection(&sample(), "id", "name");
        assert_eq!(map.len(), 2);
        assert_eq!(map.name_of(&RegionKey::from("5002704")), Some("Campo Grande"));
        assert_eq!(map.name_of(&RegionKey::from("5003702")), Some("Dourados"));
    }

    #[test]
    fn computes_polygon_centroid() {
        let map = BoundaryMap::from_feature_collection(&sample(), "id", "name");
        let centroid = map.get(&RegionKey::from("5002704")).unwrap().centroid.unwrap();
        assert!((centroid.lon - 1.0).abs() < 1e-9);
        assert!((centroid.lat - 1.0).abs() < 1e-9);
        assert!(map.get(&RegionKey::from("5003702")).unwrap().centroid.is_none());
    }

    #[test]
    fn normalization_rewrites_ids_as_strings() {
        let normalized = normalize_feature_collection(sample(), "id");
        let ids: Vec<_> = normalized
            .features
            .iter()
            .map(|f| f.property("id").cloned())
            .collect();
        assert_eq!(
            ids,
            vec![
                Some(serde_json::json!("5002704")),
                Some(serde_json::json!("5003702")),
                Some(serde_json::json!("5002704")),
            ]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_feature_collection(sample(), "id");
        let twice = normalize_feature_collection(once.clone(), "id");
        assert_eq!(
            to_geojson_string(&once).unwrap(),
            to_geojson_string(&twice).unwrap()
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_feature_collection(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, GeoError::MissingInput { .. }));
    }
}
