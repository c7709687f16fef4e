//! Aggregate views over a filtered accident subset.
//!
//! Each view takes any iterator of records, so the same reduction serves
//! every filter combination.

use std::collections::{BTreeMap, HashMap};

use accident_map_accident_models::{AccidentRecord, month_name};
use accident_map_analytics_models::{DashboardFilter, DashboardViews, MonthCount};
use accident_map_geography::boundaries::BoundaryMap;
use accident_map_geography_models::{
    AggregatedMunicipality, CategoryCount, MortalityRank, RegionKey,
};

use crate::table::AccidentTable;

/// Number of municipalities kept in the mortality ranking.
pub const MORTALITY_RANKING_LIMIT: usize = 10;

/// Accident counts left-joined onto the boundary map.
///
/// Returns one row per boundary, in boundary order, with a zero count when
/// no accident matched. Accident codes with no boundary are dropped.
pub fn municipality_counts<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
    boundaries: &BoundaryMap,
) -> Vec<AggregatedMunicipality> {
    let mut counts: HashMap<&RegionKey, u64> = HashMap::new();
    for record in records {
        *counts.entry(&record.municipality_code).or_default() += 1;
    }

    let unmatched = counts
        .keys()
        .filter(|code| boundaries.get(code).is_none())
        .count();
    if unmatched > 0 {
        log::debug!("{unmatched} municipality code(s) have no matching boundary");
    }

    boundaries
        .iter()
        .map(|b| AggregatedMunicipality {
            region_id: b.region_id.clone(),
            name: b.name.clone(),
            geometry: b.geometry.clone(),
            centroid: b.centroid,
            accident_count: counts.get(&b.region_id).copied().unwrap_or_default(),
        })
        .collect()
}

/// Reduces records per month with `value`, ascending, unknown month last.
fn per_month<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
    value: impl Fn(&AccidentRecord) -> u64,
) -> Vec<MonthCount> {
    let mut by_month: BTreeMap<Option<u32>, u64> = BTreeMap::new();
    for record in records {
        *by_month.entry(record.month).or_default() += value(record);
    }

    let mut rows: Vec<MonthCount> = by_month
        .into_iter()
        .map(|(month, count)| MonthCount {
            month,
            month_name: month.and_then(month_name).map(str::to_string),
            count,
        })
        .collect();
    rows.sort_by_key(|row| (row.month.is_none(), row.month));
    rows
}

/// Number of accidents per month.
pub fn monthly_accident_counts<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
) -> Vec<MonthCount> {
    per_month(records, |_| 1)
}

/// Sum of fatal accident counts per month.
pub fn monthly_fatal_accidents<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
) -> Vec<MonthCount> {
    per_month(records, |r| r.fatal_accident_count)
}

/// Municipalities with the highest ratio of fatal accidents to accidents.
///
/// Sorted by ratio descending with ties broken by code ascending, and cut
/// to [`MORTALITY_RANKING_LIMIT`] rows. Codes absent from the boundary map
/// are kept with no name.
pub fn mortality_ranking<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
    boundaries: &BoundaryMap,
) -> Vec<MortalityRank> {
    let mut groups: BTreeMap<&RegionKey, (u64, u64)> = BTreeMap::new();
    for record in records {
        let (fatal, accidents) = groups.entry(&record.municipality_code).or_default();
        *fatal += record.fatal_accident_count;
        *accidents += 1;
    }

    let mut ranking: Vec<MortalityRank> = groups
        .into_iter()
        .map(|(code, (fatal_accidents, accidents))| {
            #[allow(clippy::cast_precision_loss)]
            let ratio = fatal_accidents as f64 / accidents as f64;
            MortalityRank {
                municipality_code: code.clone(),
                name: boundaries.name_of(code).map(str::to_string),
                fatal_accidents,
                accidents,
                ratio,
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.ratio
            .total_cmp(&a.ratio)
            .then_with(|| a.municipality_code.cmp(&b.municipality_code))
    });
    ranking.truncate(MORTALITY_RANKING_LIMIT);
    ranking
}

/// Counts accidents per distinct value of a categorical column.
///
/// Blank values form their own `None` category. Ordered by count
/// descending, then category ascending.
pub fn category_counts<'a>(
    records: impl IntoIterator<Item = &'a AccidentRecord>,
    category: impl Fn(&'a AccidentRecord) -> Option<&'a str>,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<Option<&str>, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(category(record)).or_default() += 1;
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.map(str::to_string),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's ascending category order within ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Computes every view over the records that pass `filter`.
#[must_use]
pub fn build_views(
    table: &AccidentTable,
    boundaries: &BoundaryMap,
    filter: DashboardFilter,
) -> DashboardViews {
    let subset: Vec<&AccidentRecord> = table.filtered(filter).collect();

    log::debug!(
        "Filter '{filter}' ({}) selected {} of {} accidents",
        filter.scope(),
        subset.len(),
        table.len()
    );

    DashboardViews {
        filter,
        scope: filter.scope(),
        total_accidents: subset.len() as u64,
        municipalities: municipality_counts(subset.iter().copied(), boundaries),
        monthly_accidents: monthly_accident_counts(subset.iter().copied()),
        monthly_fatal_accidents: monthly_fatal_accidents(subset.iter().copied()),
        mortality_ranking: mortality_ranking(subset.iter().copied(), boundaries),
        weather_conditions: category_counts(subset.iter().copied(), |r| {
            r.weather_condition.as_deref()
        }),
        time_of_day: category_counts(subset.iter().copied(), |r| r.time_of_day_phase.as_deref()),
        accident_types: category_counts(subset.iter().copied(), |r| r.accident_type.as_deref()),
    }
}
