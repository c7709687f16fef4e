//! Writes aggregate views to disk.
//!
//! The choropleth goes out as a `GeoJSON` `FeatureCollection` with one
//! feature per municipality; everything else is written as one JSON
//! document.

use std::path::Path;

use accident_map_analytics_models::DashboardViews;
use accident_map_geography_models::AggregatedMunicipality;
use geojson::{Feature, FeatureWriter};

use crate::AnalyticsError;

/// File name of the choropleth written by [`export_all`].
pub const CHOROPLETH_FILE: &str = "choropleth.geojson";

/// File name of the views document written by [`export_all`].
pub const VIEWS_FILE: &str = "views.json";

fn choropleth_feature(municipality: &AggregatedMunicipality) -> Feature {
    let mut feature = Feature {
        bbox: None,
        geometry: municipality.geometry.clone(),
        id: None,
        properties: None,
        foreign_members: None,
    };
    feature.set_property("id", municipality.region_id.as_str());
    feature.set_property("name", municipality.name.as_str());
    feature.set_property("accident_count", municipality.accident_count);
    feature.set_property("centroid_lon", municipality.centroid.map(|c| c.lon));
    feature.set_property("centroid_lat", municipality.centroid.map(|c| c.lat));
    feature
}

/// Writes municipality counts as a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization or the file write fails.
pub fn write_choropleth(
    path: &Path,
    municipalities: &[AggregatedMunicipality],
) -> Result<(), AnalyticsError> {
    let mut buffer = Vec::new();
    {
        let mut writer = FeatureWriter::from_writer(&mut buffer);
        for municipality in municipalities {
            writer.write_feature(&choropleth_feature(municipality))?;
        }
        writer.finish()?;
    }

    write_file(path, &buffer)?;
    log::info!(
        "Wrote {} municipalities to {}",
        municipalities.len(),
        path.display()
    );
    Ok(())
}

/// Copy of `views` with municipality geometries dropped.
#[must_use]
pub fn without_geometry(views: &DashboardViews) -> DashboardViews {
    let mut views = views.clone();
    for municipality in &mut views.municipalities {
        municipality.geometry = None;
    }
    views
}

/// Writes the non-geometry views as pretty-printed JSON.
///
/// Municipality rows are included without their geometry.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization or the file write fails.
pub fn write_views_json(path: &Path, views: &DashboardViews) -> Result<(), AnalyticsError> {
    let views = without_geometry(views);
    let json = serde_json::to_vec_pretty(&views)?;
    write_file(path, &json)?;
    log::info!("Wrote views for '{}' to {}", views.filter, path.display());
    Ok(())
}

/// Writes [`CHOROPLETH_FILE`] and [`VIEWS_FILE`] into `out_dir`, creating
/// it if needed.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if either file cannot be written.
pub fn export_all(out_dir: &Path, views: &DashboardViews) -> Result<(), AnalyticsError> {
    write_choropleth(&out_dir.join(CHOROPLETH_FILE), &views.municipalities)?;
    write_views_json(&out_dir.join(VIEWS_FILE), views)
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use accident_map_analytics_models::{DashboardFilter, FilterScope};
    use accident_map_geography_models::{Centroid, RegionKey};
    use geojson::{FeatureCollection, GeoJson, Geometry, Value};

    use super::*;

    fn municipalities() -> Vec<AggregatedMunicipality> {
        vec![
            AggregatedMunicipality {
                region_id: RegionKey::from("5002704"),
                name: "Campo Grande".to_string(),
                geometry: Some(Geometry::new(Value::Point(vec![-54.6, -20.4]))),
                centroid: Some(Centroid {
                    lon: -54.6,
                    lat: -20.4,
                }),
                accident_count: 3,
            },
            AggregatedMunicipality {
                region_id: RegionKey::from("5003702"),
                name: "Dourados".to_string(),
                geometry: None,
                centroid: None,
                accident_count: 0,
            },
        ]
    }

    #[test]
    fn choropleth_has_one_feature_per_municipality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(CHOROPLETH_FILE);
        write_choropleth(&path, &municipalities()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let collection = FeatureCollection::try_from(text.parse::<GeoJson>().unwrap()).unwrap();
        assert_eq!(collection.features.len(), 2);

        let first = &collection.features[0];
        assert_eq!(first.property("id"), Some(&serde_json::json!("5002704")));
        assert_eq!(first.property("accident_count"), Some(&serde_json::json!(3)));
        assert_eq!(first.property("centroid_lon"), Some(&serde_json::json!(-54.6)));
        assert!(first.geometry.is_some());

        let second = &collection.features[1];
        assert_eq!(second.property("name"), Some(&serde_json::json!("Dourados")));
        assert_eq!(second.property("centroid_lat"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn views_json_omits_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let views = DashboardViews {
            filter: DashboardFilter::default(),
            scope: FilterScope::AllPeriods,
            total_accidents: 3,
            municipalities: municipalities(),
            monthly_accidents: Vec::new(),
            monthly_fatal_accidents: Vec::new(),
            mortality_ranking: Vec::new(),
            weather_conditions: Vec::new(),
            time_of_day: Vec::new(),
            accident_types: Vec::new(),
        };

        export_all(dir.path(), &views).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(VIEWS_FILE)).unwrap()).unwrap();
        assert_eq!(json["totalAccidents"], 3);
        assert_eq!(json["scope"], "all_periods");
        assert!(json["municipalities"][0]["geometry"].is_null());
        assert!(dir.path().join(CHOROPLETH_FILE).is_file());
    }
}
