//! Typed accident table loaded from the prepared file.

use std::collections::BTreeSet;
use std::path::Path;

use accident_map_accident_models::{AccidentField, AccidentRecord};
use accident_map_analytics_models::{AvailablePeriods, DashboardFilter};
use accident_map_geography_models::RegionKey;
use accident_map_source::parsing::{non_blank, parse_accident_date, parse_count, parse_period};
use accident_map_source::table::DelimitedTable;
use accident_map_source_models::{ColumnMapping, DatasetDefinition};

use crate::AnalyticsError;

/// Date format the preparation stage writes.
const PREPARED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Prepared tables are always UTF-8, whatever the raw encoding was.
const PREPARED_ENCODING: &str = "utf-8";

/// Accident records in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccidentTable {
    records: Vec<AccidentRecord>,
}

impl AccidentTable {
    /// Reads a prepared accident table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Source`] if the file is missing or cannot
    /// be parsed, and [`AnalyticsError::MissingRequiredField`] if it lacks
    /// any mapped column.
    pub fn read(path: &Path, dataset: &DatasetDefinition) -> Result<Self, AnalyticsError> {
        let table = DelimitedTable::read(path, dataset.delimiter_byte(), PREPARED_ENCODING)?;
        Self::from_table(&table, &dataset.columns)
    }

    /// Converts a delimited table into typed records.
    ///
    /// Every column in [`AccidentField::required_for_aggregation`] must be
    /// present; all missing ones are reported together. Blank or
    /// unparseable fatal counts are treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::MissingRequiredField`] naming every
    /// absent column.
    pub fn from_table(
        table: &DelimitedTable,
        columns: &ColumnMapping,
    ) -> Result<Self, AnalyticsError> {
        let required = AccidentField::required_for_aggregation();
        let missing = table.missing_columns(required.iter().map(|f| columns.column(*f)));
        if !missing.is_empty() {
            return Err(AnalyticsError::MissingRequiredField { fields: missing });
        }

        let index = |field: AccidentField| table.column_index(columns.column(field));
        let date_idx = index(AccidentField::AccidentDate);
        let id_idx = index(AccidentField::AccidentId).unwrap_or_default();
        let code_idx = index(AccidentField::MunicipalityCode).unwrap_or_default();
        let fatal_idx = index(AccidentField::FatalAccidentCount).unwrap_or_default();
        let weather_idx = index(AccidentField::WeatherCondition).unwrap_or_default();
        let phase_idx = index(AccidentField::TimeOfDayPhase).unwrap_or_default();
        let type_idx = index(AccidentField::AccidentType).unwrap_or_default();
        let weekday_idx = index(AccidentField::DayOfWeek).unwrap_or_default();
        let month_idx = index(AccidentField::Month).unwrap_or_default();
        let year_idx = index(AccidentField::Year).unwrap_or_default();

        let mut bad_counts = 0u64;

        let records = table
            .rows()
            .iter()
            .map(|row| {
                let fatal = &row[fatal_idx];
                let fatal_accident_count = parse_count(fatal).unwrap_or_else(|| {
                    if !fatal.trim().is_empty() {
                        log::debug!("Unparseable fatal accident count '{fatal}'");
                        bad_counts += 1;
                    }
                    0
                });

                AccidentRecord {
                    accident_id: row[id_idx].trim().to_string(),
                    accident_date: date_idx
                        .and_then(|i| parse_accident_date(&row[i], PREPARED_DATE_FORMAT)),
                    month: parse_period(&row[month_idx]),
                    year: parse_period(&row[year_idx]),
                    municipality_code: RegionKey::normalize(&row[code_idx]),
                    fatal_accident_count,
                    weather_condition: non_blank(&row[weather_idx]),
                    time_of_day_phase: non_blank(&row[phase_idx]),
                    accident_type: non_blank(&row[type_idx]),
                    day_of_week: non_blank(&row[weekday_idx]),
                }
            })
            .collect();

        if bad_counts > 0 {
            log::warn!(
                "{bad_counts} fatal accident count(s) could not be parsed and were counted as 0"
            );
        }

        Ok(Self { records })
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose year and month pass `filter`.
    pub fn filtered(&self, filter: DashboardFilter) -> impl Iterator<Item = &AccidentRecord> {
        self.records
            .iter()
            .filter(move |r| filter.matches(r.year, r.month))
    }

    /// Distinct non-null years and months, ascending.
    #[must_use]
    pub fn available_periods(&self) -> AvailablePeriods {
        let years: BTreeSet<i32> = self.records.iter().filter_map(|r| r.year).collect();
        let months: BTreeSet<u32> = self.records.iter().filter_map(|r| r.month).collect();
        AvailablePeriods {
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
        }
    }
}

impl FromIterator<AccidentRecord> for AccidentTable {
    fn from_iter<T: IntoIterator<Item = AccidentRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
