#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Traffic accident record types and the logical field taxonomy.
//!
//! Every dataset definition maps its own column headers onto the
//! [`AccidentField`] variants defined here, so the preparation and
//! aggregation stages never refer to source-specific column names.

use accident_map_geography_models::RegionKey;
use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Month display names, indexed by `month - 1`.
///
/// The source dataset is Brazilian, so names follow its language.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Returns the display name for a 1-based month number.
#[must_use]
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

/// Logical columns of the accident table.
///
/// The first eight variants are read from the raw file; [`Self::Month`]
/// and [`Self::Year`] are appended by the preparation stage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccidentField {
    /// Unique accident identifier
    AccidentId,
    /// Accident date as written by the source (day/month/year)
    AccidentDate,
    /// Municipality (IBGE) code
    MunicipalityCode,
    /// Number of fatal accidents attributed to the record
    FatalAccidentCount,
    /// Weather condition at the time of the accident
    WeatherCondition,
    /// Phase of the day (dawn, day, dusk, night)
    TimeOfDayPhase,
    /// Accident type (collision, rollover, ...)
    AccidentType,
    /// Day of the week
    DayOfWeek,
    /// Month derived from the accident date
    Month,
    /// Year derived from the accident date
    Year,
}

impl AccidentField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AccidentId,
            Self::AccidentDate,
            Self::MunicipalityCode,
            Self::FatalAccidentCount,
            Self::WeatherCondition,
            Self::TimeOfDayPhase,
            Self::AccidentType,
            Self::DayOfWeek,
            Self::Month,
            Self::Year,
        ]
    }

    /// Whether the column is produced by the preparation stage rather
    /// than read from the raw file.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Month | Self::Year)
    }

    /// Columns the preparation stage cannot run without.
    #[must_use]
    pub const fn required_for_preparation() -> &'static [Self] {
        &[Self::AccidentDate, Self::MunicipalityCode]
    }

    /// Columns that must exist on the prepared table before the
    /// aggregation stage filters or groups anything.
    #[must_use]
    pub const fn required_for_aggregation() -> &'static [Self] {
        &[
            Self::Month,
            Self::Year,
            Self::DayOfWeek,
            Self::AccidentId,
            Self::MunicipalityCode,
            Self::FatalAccidentCount,
            Self::WeatherCondition,
            Self::TimeOfDayPhase,
            Self::AccidentType,
        ]
    }
}

/// One traffic accident, typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Identifier as written by the source.
    pub accident_id: String,
    /// Parsed accident date, `None` when the source value was malformed.
    pub accident_date: Option<NaiveDate>,
    /// Month (1-12) derived from `accident_date`.
    pub month: Option<u32>,
    /// Year derived from `accident_date`.
    pub year: Option<i32>,
    /// Normalized municipality code.
    pub municipality_code: RegionKey,
    /// Fatal accidents attributed to this record.
    pub fatal_accident_count: u64,
    /// Weather condition, `None` when blank.
    pub weather_condition: Option<String>,
    /// Phase of the day, `None` when blank.
    pub time_of_day_phase: Option<String>,
    /// Accident type, `None` when blank.
    pub accident_type: Option<String>,
    /// Day of the week, `None` when blank.
    pub day_of_week: Option<String>,
}

/// Splits an optional date into its `(month, year)` pair.
///
/// Both halves are `None` when the date is `None`.
#[must_use]
pub fn derive_month_year(date: Option<NaiveDate>) -> (Option<u32>, Option<i32>) {
    date.map_or((None, None), |d| (Some(d.month()), Some(d.year())))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn month_names_cover_calendar() {
        assert_eq!(month_name(1), Some("Janeiro"));
        assert_eq!(month_name(5), Some("Maio"));
        assert_eq!(month_name(12), Some("Dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn derives_month_and_year() {
        let date = NaiveDate::from_ymd_opt(2022, 5, 17);
        assert_eq!(derive_month_year(date), (Some(5), Some(2022)));
        assert_eq!(derive_month_year(None), (None, None));
    }

    #[test]
    fn field_names_are_snake_case() {
        assert_eq!(AccidentField::FatalAccidentCount.as_ref(), "fatal_accident_count");
        assert_eq!(
            AccidentField::from_str("time_of_day_phase").unwrap(),
            AccidentField::TimeOfDayPhase
        );
    }

    #[test]
    fn derived_fields_are_required_for_aggregation() {
        for field in AccidentField::all().iter().filter(|f| f.is_derived()) {
            assert!(
                AccidentField::required_for_aggregation().contains(field),
                "{field} is derived but not required for aggregation"
            );
        }
        for field in AccidentField::required_for_preparation() {
            assert!(!field.is_derived(), "{field} cannot be derived and raw");
        }
    }
}
