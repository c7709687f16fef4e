//! Plain-text rendering of aggregate views.

use std::fmt::Write as _;

use accident_map_accident_models::month_name;
use accident_map_analytics_models::{AvailablePeriods, DashboardViews, MonthCount, ViewKind};
use accident_map_geography_models::CategoryCount;

/// Label printed for a null category or month.
const UNKNOWN: &str = "(sem informação)";

pub fn format_periods(periods: &AvailablePeriods) -> String {
    let years: Vec<String> = periods.years.iter().map(ToString::to_string).collect();
    let months: Vec<String> = periods
        .months
        .iter()
        .map(|&m| month_name(m).map_or_else(|| m.to_string(), |name| format!("{m} ({name})")))
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "Anos:  {}", years.join(", "));
    let _ = writeln!(out, "Meses: {}", months.join(", "));
    out
}

fn write_heading(out: &mut String, kind: ViewKind, period: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {} ({period}) ==", kind.heading());
}

fn write_months(out: &mut String, rows: &[MonthCount]) {
    for row in rows {
        let label = row.month_name.as_deref().unwrap_or(UNKNOWN);
        let _ = writeln!(out, "  {label:<20} {:>8}", row.count);
    }
}

fn write_categories(out: &mut String, rows: &[CategoryCount]) {
    for row in rows {
        let label = row.category.as_deref().unwrap_or(UNKNOWN);
        let _ = writeln!(out, "  {label:<40} {:>8}", row.count);
    }
}

/// Renders every view as aligned text tables.
///
/// Municipalities are listed by accident count, highest first.
pub fn format_views(views: &DashboardViews) -> String {
    let period = views.filter.label();
    let mut out = String::new();

    let _ = writeln!(out, "Período: {period} [{}]", views.scope);
    let _ = writeln!(out, "Total de acidentes: {}", views.total_accidents);

    for kind in ViewKind::all() {
        write_heading(&mut out, *kind, &period);
        match kind {
            ViewKind::Municipalities => {
                let mut rows: Vec<_> = views.municipalities.iter().collect();
                rows.sort_by(|a, b| {
                    b.accident_count
                        .cmp(&a.accident_count)
                        .then_with(|| a.name.cmp(&b.name))
                });
                for row in rows {
                    let _ = writeln!(
                        out,
                        "  {:<32} {:>9} {:>8}",
                        row.name, row.region_id, row.accident_count
                    );
                }
            }
            ViewKind::MonthlyAccidents => write_months(&mut out, &views.monthly_accidents),
            ViewKind::MonthlyFatalAccidents => {
                write_months(&mut out, &views.monthly_fatal_accidents);
            }
            ViewKind::MortalityRanking => {
                for (rank, row) in views.mortality_ranking.iter().enumerate() {
                    let name = row.name.as_deref().unwrap_or(row.municipality_code.as_str());
                    let _ = writeln!(
                        out,
                        "  {:>2}. {name:<32} {:>6.3} ({}/{})",
                        rank + 1,
                        row.ratio,
                        row.fatal_accidents,
                        row.accidents
                    );
                }
            }
            ViewKind::WeatherConditions => write_categories(&mut out, &views.weather_conditions),
            ViewKind::TimeOfDay => write_categories(&mut out, &views.time_of_day),
            ViewKind::AccidentTypes => write_categories(&mut out, &views.accident_types),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use accident_map_analytics_models::{DashboardFilter, FilterScope, MonthFilter, YearFilter};
    use accident_map_geography_models::{AggregatedMunicipality, MortalityRank, RegionKey};

    use super::*;

    #[test]
    fn periods_list_years_and_named_months() {
        let text = format_periods(&AvailablePeriods {
            years: vec![2021, 2022],
            months: vec![1, 5],
        });
        assert!(text.contains("2021, 2022"));
        assert!(text.contains("1 (Janeiro), 5 (Maio)"));
    }

    #[test]
    fn views_render_every_heading() {
        let views = DashboardViews {
            filter: DashboardFilter::new(YearFilter::Year(2022), MonthFilter::Month(5)),
            scope: FilterScope::YearAndMonth,
            total_accidents: 2,
            municipalities: vec![AggregatedMunicipality {
                region_id: RegionKey::from("5002704"),
                name: "Campo Grande".to_string(),
                geometry: None,
                centroid: None,
                accident_count: 2,
            }],
            monthly_accidents: vec![MonthCount {
                month: Some(5),
                month_name: Some("Maio".to_string()),
                count: 2,
            }],
            monthly_fatal_accidents: vec![MonthCount {
                month: None,
                month_name: None,
                count: 0,
            }],
            mortality_ranking: vec![MortalityRank {
                municipality_code: RegionKey::from("9999999"),
                name: None,
                fatal_accidents: 1,
                accidents: 2,
                ratio: 0.5,
            }],
            weather_conditions: vec![CategoryCount {
                category: None,
                count: 2,
            }],
            time_of_day: Vec::new(),
            accident_types: Vec::new(),
        };

        let text = format_views(&views);
        for kind in ViewKind::all() {
            assert!(text.contains(kind.heading()), "missing {kind}");
        }
        assert!(text.contains("Período: Maio de 2022 [year_and_month]"));
        assert!(text.contains("Campo Grande"));
        assert!(text.contains("9999999"));
        assert!(text.contains("0.500 (1/2)"));
        assert!(text.contains(UNKNOWN));
    }
}
