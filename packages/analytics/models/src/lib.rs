#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard filter and aggregate view types.
//!
//! A [`DashboardFilter`] selects a year and a month, either of which may
//! be "all". The aggregation stage applies it to the accident table and
//! returns a [`DashboardViews`] carrying the filter back, so presentation
//! code can label charts without recomputing anything.

use std::fmt;
use std::str::FromStr;

use accident_map_accident_models::month_name;
use accident_map_geography_models::{AggregatedMunicipality, CategoryCount, MortalityRank};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Word accepted in place of a year or month to mean "every value".
pub const ALL_SENTINEL: &str = "all";

/// Error returned when a filter value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterParseError {
    /// The year was neither the sentinel nor an integer.
    #[error("invalid year '{0}': expected '{ALL_SENTINEL}' or a number")]
    Year(String),
    /// The month was neither the sentinel nor an integer in 1-12.
    #[error("invalid month '{0}': expected '{ALL_SENTINEL}' or 1-12")]
    Month(String),
}

/// Year selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "Option<i32>")]
pub enum YearFilter {
    /// Every year, including records whose year is unknown.
    #[default]
    All,
    /// Exactly this year.
    Year(i32),
}

impl YearFilter {
    /// Whether a record with the given year passes the filter.
    #[must_use]
    pub fn matches(self, year: Option<i32>) -> bool {
        match self {
            Self::All => true,
            Self::Year(wanted) => year == Some(wanted),
        }
    }
}

impl From<Option<i32>> for YearFilter {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::All, Self::Year)
    }
}

impl From<YearFilter> for Option<i32> {
    fn from(value: YearFilter) -> Self {
        match value {
            YearFilter::All => None,
            YearFilter::Year(y) => Some(y),
        }
    }
}

impl FromStr for YearFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Ok(Self::All);
        }
        s.parse()
            .map(Self::Year)
            .map_err(|_| FilterParseError::Year(s.to_string()))
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SENTINEL),
            Self::Year(y) => write!(f, "{y}"),
        }
    }
}

/// Month selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum MonthFilter {
    /// Every month, including records whose month is unknown.
    #[default]
    All,
    /// Exactly this month (1-12).
    Month(u32),
}

impl MonthFilter {
    /// Whether a record with the given month passes the filter.
    #[must_use]
    pub fn matches(self, month: Option<u32>) -> bool {
        match self {
            Self::All => true,
            Self::Month(wanted) => month == Some(wanted),
        }
    }
}

impl From<Option<u32>> for MonthFilter {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::All, Self::Month)
    }
}

impl From<MonthFilter> for Option<u32> {
    fn from(value: MonthFilter) -> Self {
        match value {
            MonthFilter::All => None,
            MonthFilter::Month(m) => Some(m),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Ok(Self::All);
        }
        match s.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => Ok(Self::Month(m)),
            _ => Err(FilterParseError::Month(s.to_string())),
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SENTINEL),
            Self::Month(m) => write!(f, "{m}"),
        }
    }
}

/// Which of the four filter combinations is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterScope {
    /// All years and all months.
    AllPeriods,
    /// One year, all months.
    YearOnly,
    /// One month across all years.
    MonthOnly,
    /// One month of one year.
    YearAndMonth,
}

/// A year/month selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    /// Year selection.
    pub year: YearFilter,
    /// Month selection.
    pub month: MonthFilter,
}

impl DashboardFilter {
    /// Creates a filter from its two halves.
    #[must_use]
    pub const fn new(year: YearFilter, month: MonthFilter) -> Self {
        Self { year, month }
    }

    /// Whether a record with the given period passes both halves.
    #[must_use]
    pub fn matches(self, year: Option<i32>, month: Option<u32>) -> bool {
        self.year.matches(year) && self.month.matches(month)
    }

    /// Which filter combination this is.
    #[must_use]
    pub const fn scope(self) -> FilterScope {
        match (self.year, self.month) {
            (YearFilter::All, MonthFilter::All) => FilterScope::AllPeriods,
            (YearFilter::Year(_), MonthFilter::All) => FilterScope::YearOnly,
            (YearFilter::All, MonthFilter::Month(_)) => FilterScope::MonthOnly,
            (YearFilter::Year(_), MonthFilter::Month(_)) => FilterScope::YearAndMonth,
        }
    }

    /// Short period label for chart titles, in the dataset's language.
    #[must_use]
    pub fn label(self) -> String {
        let month = |m: u32| month_name(m).map_or_else(|| m.to_string(), str::to_string);
        match (self.year, self.month) {
            (YearFilter::All, MonthFilter::All) => "todos os anos".to_string(),
            (YearFilter::Year(y), MonthFilter::All) => y.to_string(),
            (YearFilter::All, MonthFilter::Month(m)) => format!("{} (todos os anos)", month(m)),
            (YearFilter::Year(y), MonthFilter::Month(m)) => format!("{} de {y}", month(m)),
        }
    }
}

impl fmt::Display for DashboardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Accident count (or fatal-accident sum) for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    /// Month number, `None` for records with an unknown date.
    pub month: Option<u32>,
    /// Display name of `month`.
    pub month_name: Option<String>,
    /// Number of accidents, or the sum of fatal accidents.
    pub count: u64,
}

/// Distinct years and months present in the accident table, ascending.
///
/// Used to build selection controls; unknown periods are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePeriods {
    /// Years with at least one accident.
    pub years: Vec<i32>,
    /// Months with at least one accident.
    pub months: Vec<u32>,
}

/// The individual aggregate views.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViewKind {
    /// Accidents per municipality, joined onto boundaries.
    Municipalities,
    /// Accidents per month.
    MonthlyAccidents,
    /// Fatal accidents per month.
    MonthlyFatalAccidents,
    /// Municipalities with the highest mortality ratio.
    MortalityRanking,
    /// Accidents per weather condition.
    WeatherConditions,
    /// Accidents per phase of the day.
    TimeOfDay,
    /// Accidents per accident type.
    AccidentTypes,
}

impl ViewKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Municipalities,
            Self::MonthlyAccidents,
            Self::MonthlyFatalAccidents,
            Self::MortalityRanking,
            Self::WeatherConditions,
            Self::TimeOfDay,
            Self::AccidentTypes,
        ]
    }

    /// Heading used when printing the view.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Municipalities => "Quantidade de Acidentes por Cidade",
            Self::MonthlyAccidents => "Quantidade de Acidentes por Mês",
            Self::MonthlyFatalAccidents => "Quantidade de Acidentes com Óbitos por Mês",
            Self::MortalityRanking => "Cidades com Maiores Índices de Mortalidade",
            Self::WeatherConditions => "Quantidade de Acidentes por Condições Meteorológicas",
            Self::TimeOfDay => "Quantidade de Acidentes por Fase do Dia",
            Self::AccidentTypes => "Quantidade de Acidentes por Tipo",
        }
    }
}

/// Every aggregate view for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardViews {
    /// Filter the views were computed with.
    pub filter: DashboardFilter,
    /// Combination of `filter` halves that was active.
    pub scope: FilterScope,
    /// Records in the filtered subset.
    pub total_accidents: u64,
    /// Accidents per municipality, one row per boundary.
    pub municipalities: Vec<AggregatedMunicipality>,
    /// Accidents per month.
    pub monthly_accidents: Vec<MonthCount>,
    /// Fatal accidents per month.
    pub monthly_fatal_accidents: Vec<MonthCount>,
    /// Top municipalities by mortality ratio.
    pub mortality_ranking: Vec<MortalityRank>,
    /// Accidents per weather condition.
    pub weather_conditions: Vec<CategoryCount>,
    /// Accidents per phase of the day.
    pub time_of_day: Vec<CategoryCount>,
    /// Accidents per accident type.
    pub accident_types: Vec<CategoryCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_values() {
        assert_eq!("all".parse::<YearFilter>().unwrap(), YearFilter::All);
        assert_eq!("ALL".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!("2022".parse::<YearFilter>().unwrap(), YearFilter::Year(2022));
        assert_eq!(" 5 ".parse::<MonthFilter>().unwrap(), MonthFilter::Month(5));
        assert!("13".parse::<MonthFilter>().is_err());
        assert!("0".parse::<MonthFilter>().is_err());
        assert!("twenty".parse::<YearFilter>().is_err());
    }

    #[test]
    fn all_matches_unknown_periods() {
        assert!(YearFilter::All.matches(None));
        assert!(MonthFilter::All.matches(None));
        assert!(!YearFilter::Year(2022).matches(None));
        assert!(!MonthFilter::Month(5).matches(None));
    }

    #[test]
    fn filter_requires_both_halves() {
        let filter = DashboardFilter::new(YearFilter::Year(2022), MonthFilter::Month(5));
        assert!(filter.matches(Some(2022), Some(5)));
        assert!(!filter.matches(Some(2022), Some(6)));
        assert!(!filter.matches(Some(2021), Some(5)));
    }

    #[test]
    fn scope_covers_all_combinations() {
        let cases = [
            (YearFilter::All, MonthFilter::All, FilterScope::AllPeriods),
            (YearFilter::Year(2022), MonthFilter::All, FilterScope::YearOnly),
            (YearFilter::All, MonthFilter::Month(5), FilterScope::MonthOnly),
            (YearFilter::Year(2022), MonthFilter::Month(5), FilterScope::YearAndMonth),
        ];
        for (year, month, expected) in cases {
            assert_eq!(DashboardFilter::new(year, month).scope(), expected);
        }
    }

    #[test]
    fn labels_follow_scope() {
        assert_eq!(DashboardFilter::default().label(), "todos os anos");
        assert_eq!(
            DashboardFilter::new(YearFilter::Year(2022), MonthFilter::All).label(),
            "2022"
        );
        assert_eq!(
            DashboardFilter::new(YearFilter::All, MonthFilter::Month(5)).label(),
            "Maio (todos os anos)"
        );
        assert_eq!(
            DashboardFilter::new(YearFilter::Year(2022), MonthFilter::Month(5)).label(),
            "Maio de 2022"
        );
    }

    #[test]
    fn filter_serializes_all_as_null() {
        let filter = DashboardFilter::new(YearFilter::Year(2022), MonthFilter::All);
        let json = serde_json::to_value(filter).unwrap();
        assert_eq!(json, serde_json::json!({ "year": 2022, "month": null }));
        let back: DashboardFilter = serde_json::from_value(json).unwrap();
        assert_eq!(back, filter);
    }

    #[test]
    fn view_kinds_parse_from_snake_case() {
        for kind in ViewKind::all() {
            assert_eq!(kind.as_ref().parse::<ViewKind>().unwrap(), *kind);
        }
    }
}
