#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation stage.
//!
//! Loads the prepared accident table and boundary map, applies a
//! [`DashboardFilter`], and reduces the filtered subset into the views a
//! dashboard renders. Every view is a pure function of
//! `(&AccidentTable, &BoundaryMap, DashboardFilter)`.

pub mod export;
pub mod table;
pub mod views;

use std::path::Path;

use accident_map_analytics_models::{AvailablePeriods, DashboardFilter, DashboardViews};
use accident_map_geography::GeoError;
use accident_map_geography::boundaries::BoundaryMap;
use accident_map_source::SourceError;
use accident_map_source_models::DatasetDefinition;
use thiserror::Error;

use crate::table::AccidentTable;

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The prepared accident table lacks columns the views depend on.
    #[error(
        "Missing required field(s) in prepared accident table: {}. Run the preparation stage first.",
        fields.join(", ")
    )]
    MissingRequiredField {
        /// Source column names that were not found.
        fields: Vec<String>,
    },

    /// Reading the prepared accident table failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Reading the prepared boundary map failed.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Writing an export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a view failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a `GeoJSON` export failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Prepared inputs for one dataset, loaded once and queried per filter.
#[derive(Debug, Clone)]
pub struct Dashboard {
    accidents: AccidentTable,
    boundaries: BoundaryMap,
}

impl Dashboard {
    /// Pairs an accident table with a boundary map.
    #[must_use]
    pub const fn new(accidents: AccidentTable, boundaries: BoundaryMap) -> Self {
        Self {
            accidents,
            boundaries,
        }
    }

    /// Loads a dataset's prepared outputs from `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if either prepared file is missing or
    /// unreadable, or if a required column is absent.
    pub fn load(dataset: &DatasetDefinition, data_dir: &Path) -> Result<Self, AnalyticsError> {
        let paths = dataset.paths.resolve(data_dir);

        let accidents = AccidentTable::read(&paths.prepared_accidents, dataset)?;
        let boundaries = BoundaryMap::load(
            &paths.prepared_boundaries,
            &dataset.boundaries.id_property,
            &dataset.boundaries.name_property,
        )?;

        log::info!(
            "[{}] Loaded {} accidents and {} boundaries",
            dataset.id,
            accidents.len(),
            boundaries.len()
        );

        Ok(Self::new(accidents, boundaries))
    }

    /// The accident table.
    #[must_use]
    pub const fn accidents(&self) -> &AccidentTable {
        &self.accidents
    }

    /// The boundary map.
    #[must_use]
    pub const fn boundaries(&self) -> &BoundaryMap {
        &self.boundaries
    }

    /// Years and months present in the unfiltered table.
    #[must_use]
    pub fn available_periods(&self) -> AvailablePeriods {
        self.accidents.available_periods()
    }

    /// Computes every view for `filter`.
    #[must_use]
    pub fn views(&self, filter: DashboardFilter) -> DashboardViews {
        views::build_views(&self.accidents, &self.boundaries, filter)
    }
}

#[cfg(test)]
mod tests {
    use accident_map_analytics_models::{FilterScope, MonthFilter, YearFilter};
    use accident_map_source::progress::null_progress;
    use accident_map_source::registry::{DEFAULT_DATASET_ID, find_dataset};

    use super::*;

    const RAW_ACCIDENTS: &str = "num_acidente;data_acidente;codigo_ibge;qtde_acid_com_obitos;cond_meteorologica;fase_dia;tp_acidente;dia_semana\n\
        1;17/05/2022;5002704;0;Céu Claro;Pleno dia;Colisão traseira;terça-feira\n\
        2;18/05/2022;5002704.0;1;Chuva;Plena noite;Capotamento;quarta-feira\n\
        3;03/01/2021;5003702;0;Céu Claro;Amanhecer;Colisão frontal;domingo\n\
        4;31/02/2021;9999999;1;;;;sábado\n";

    const RAW_BOUNDARIES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"id":5002704,"name":"Campo Grande"},"geometry":null},
        {"type":"Feature","properties":{"id":5003702,"name":"Dourados"},"geometry":null},
        {"type":"Feature","properties":{"id":5000203,"name":"Água Clara"},"geometry":null}
    ]}"#;

    fn prepared_dashboard() -> (tempfile::TempDir, Dashboard) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("raw")).unwrap();
        std::fs::write(dir.path().join("raw/DADOS_ACIDENTES.csv"), RAW_ACCIDENTS).unwrap();
        std::fs::write(dir.path().join("raw/geojs-50-mun.json"), RAW_BOUNDARIES).unwrap();

        let dataset = find_dataset(DEFAULT_DATASET_ID).unwrap();
        accident_map_prepare::run(&dataset, dir.path(), &null_progress()).unwrap();
        let dashboard = Dashboard::load(&dataset, dir.path()).unwrap();
        (dir, dashboard)
    }

    #[test]
    fn prepared_outputs_feed_every_view() {
        let (_dir, dashboard) = prepared_dashboard();
        let views = dashboard.views(DashboardFilter::default());

        assert_eq!(views.scope, FilterScope::AllPeriods);
        assert_eq!(views.total_accidents, 4);

        let counts: Vec<(&str, u64)> = views
            .municipalities
            .iter()
            .map(|m| (m.region_id.as_str(), m.accident_count))
            .collect();
        assert_eq!(counts, [("5002704", 2), ("5003702", 1), ("5000203", 0)]);

        assert_eq!(
            views.monthly_accidents.iter().map(|m| m.count).sum::<u64>(),
            views.total_accidents
        );
        assert_eq!(views.monthly_accidents.last().unwrap().month, None);

        let top = &views.mortality_ranking[0];
        assert_eq!(top.municipality_code.as_str(), "9999999");
        assert_eq!(top.name, None);
    }

    #[test]
    fn available_periods_ignore_unparseable_dates() {
        let (_dir, dashboard) = prepared_dashboard();
        let periods = dashboard.available_periods();
        assert_eq!(periods.years, [2021, 2022]);
        assert_eq!(periods.months, [1, 5]);
    }

    #[test]
    fn year_and_month_filters_intersect() {
        let (_dir, dashboard) = prepared_dashboard();

        let year =
            dashboard.views(DashboardFilter::new(YearFilter::Year(2022), MonthFilter::All));
        assert_eq!(year.total_accidents, 2);

        let month =
            dashboard.views(DashboardFilter::new(YearFilter::All, MonthFilter::Month(1)));
        assert_eq!(month.total_accidents, 1);

        let none = dashboard.views(DashboardFilter::new(
            YearFilter::Year(2022),
            MonthFilter::Month(1),
        ));
        assert_eq!(none.total_accidents, 0);
        assert!(none.municipalities.iter().all(|m| m.accident_count == 0));
        assert!(none.mortality_ranking.is_empty());
    }

    #[test]
    fn unprepared_table_reports_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = find_dataset(DEFAULT_DATASET_ID).unwrap();
        let paths = dataset.paths.resolve(dir.path());
        std::fs::create_dir_all(paths.prepared_accidents.parent().unwrap()).unwrap();
        std::fs::write(&paths.prepared_accidents, RAW_ACCIDENTS).unwrap();
        std::fs::write(&paths.prepared_boundaries, RAW_BOUNDARIES).unwrap();

        let err = Dashboard::load(&dataset, dir.path()).unwrap_err();
        let AnalyticsError::MissingRequiredField { fields } = &err else {
            panic!("expected MissingRequiredField, got {err:?}");
        };
        assert_eq!(fields, &["mes_acidente", "ano_acidente"]);
    }
}
