#![allow(clippy::module_name_repetitions)]

//! Menu-driven front end.
//!
//! Lets users prepare a dataset and browse its views without memorizing
//! flags. The year and month menus are built from the periods actually
//! present in the prepared table.

use std::path::PathBuf;

use accident_map_accident_models::month_name;
use accident_map_analytics::Dashboard;
use accident_map_analytics_models::{
    AvailablePeriods, DashboardFilter, MonthFilter, YearFilter,
};
use accident_map_cli_utils::MultiProgress;
use dialoguer::{Input, Select};

use crate::{DatasetArgs, commands};

/// Top-level actions available in the interactive menu.
enum Action {
    Prepare,
    ShowViews,
    Export,
    ListDatasets,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Prepare,
        Self::ShowViews,
        Self::Export,
        Self::ListDatasets,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Prepare => "Prepare raw data",
            Self::ShowViews => "Show views",
            Self::Export => "Export choropleth and views",
            Self::ListDatasets => "List datasets",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub fn run(multi: &MultiProgress, args: &DatasetArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("Accident Map Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::ListDatasets => commands::list_datasets(),
        Action::Prepare => {
            let dataset = args.resolve()?;
            commands::prepare(multi, &dataset, &args.data_dir)?;
        }
        Action::ShowViews => {
            let dataset = args.resolve()?;
            let dashboard = Dashboard::load(&dataset, &args.data_dir)?;
            let filter = select_filter(&dashboard.available_periods())?;
            commands::print_views(&dashboard, filter, false)?;
        }
        Action::Export => {
            let dataset = args.resolve()?;
            let dashboard = Dashboard::load(&dataset, &args.data_dir)?;
            let filter = select_filter(&dashboard.available_periods())?;
            let out: String = Input::new()
                .with_prompt("Output directory")
                .default("export".to_string())
                .interact_text()?;
            commands::export_dashboard(&dashboard, filter, &PathBuf::from(out))?;
        }
    }

    Ok(())
}

/// Menu entries for a period selection: "all" first, then each value.
fn period_items<T: Copy>(values: &[T], label: impl Fn(T) -> String) -> Vec<String> {
    std::iter::once("Todos".to_string())
        .chain(values.iter().map(|&v| label(v)))
        .collect()
}

/// Prompts for a year and a month from the available periods.
///
/// # Errors
///
/// Returns an error if a prompt fails.
fn select_filter(periods: &AvailablePeriods) -> Result<DashboardFilter, dialoguer::Error> {
    let year_items = period_items(&periods.years, |y| y.to_string());
    let year_idx = Select::new()
        .with_prompt("Ano")
        .items(&year_items)
        .default(0)
        .interact()?;

    let month_items = period_items(&periods.months, |m| {
        month_name(m).map_or_else(|| m.to_string(), str::to_string)
    });
    let month_idx = Select::new()
        .with_prompt("Mês")
        .items(&month_items)
        .default(0)
        .interact()?;

    Ok(filter_from_selection(periods, year_idx, month_idx))
}

/// Maps menu indices (0 = all) back onto a filter.
fn filter_from_selection(
    periods: &AvailablePeriods,
    year_idx: usize,
    month_idx: usize,
) -> DashboardFilter {
    let year = year_idx
        .checked_sub(1)
        .and_then(|i| periods.years.get(i))
        .map_or(YearFilter::All, |&y| YearFilter::Year(y));
    let month = month_idx
        .checked_sub(1)
        .and_then(|i| periods.months.get(i))
        .map_or(MonthFilter::All, |&m| MonthFilter::Month(m));
    DashboardFilter::new(year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods() -> AvailablePeriods {
        AvailablePeriods {
            years: vec![2021, 2022],
            months: vec![3, 5],
        }
    }

    #[test]
    fn menu_starts_with_all() {
        let items = period_items(&[3u32, 5], |m| month_name(m).unwrap_or_default().to_string());
        assert_eq!(items, ["Todos", "Março", "Maio"]);
    }

    #[test]
    fn selection_maps_back_to_filter() {
        assert_eq!(filter_from_selection(&periods(), 0, 0), DashboardFilter::default());
        assert_eq!(
            filter_from_selection(&periods(), 2, 1),
            DashboardFilter::new(YearFilter::Year(2022), MonthFilter::Month(3))
        );
        assert_eq!(
            filter_from_selection(&periods(), 0, 2),
            DashboardFilter::new(YearFilter::All, MonthFilter::Month(5))
        );
    }
}
