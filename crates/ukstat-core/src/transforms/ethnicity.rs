//! Ethnic-group category splitting and aggregation.
//!
//! Census ethnic-group labels carry a broad group and a detailed group
//! separated by a colon (`"White: British"`). The raw table also carries
//! a `"Ethnic group"` header row that is a label artefact, not data.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::{DataFrame, IntoColumn, IntoLazy, NamedFrom, Series, SortMultipleOptions, col, lit};

use ukstat_model::{OutputMode, columns};

use crate::data_utils::{column_numeric_values, column_string_values};

/// Raw category label that is a header artefact rather than a group.
const SENTINEL: &str = "Ethnic group";

/// Split ethnic-group observations into broad and detailed groups.
///
/// Non-summarised output keeps one row per (area, broad, detailed),
/// sorted by area name then detailed group. With `summarise`, rows are
/// regrouped by detailed group alone, values summed across broad groups,
/// and each area's output is sorted largest group first — the value
/// ordering is what makes the result scannable, so it is part of the
/// contract.
pub fn ethnic_groups(df: &DataFrame, mode: OutputMode, summarise: bool) -> Result<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col(columns::MEASURE).eq(lit(mode.measure_label())))
        .filter(col(columns::CATEGORY).neq(lit(SENTINEL)))
        .collect()?;

    let area_codes = column_string_values(&filtered, columns::AREA_CODE)?;
    let area_names = column_string_values(&filtered, columns::AREA_NAME)?;
    let categories = column_string_values(&filtered, columns::CATEGORY)?;
    let values = column_numeric_values(&filtered, columns::VALUE)?;

    if summarise {
        // Sum across broad groups per (area, detailed group).
        let mut sums: BTreeMap<(String, String, String), f64> = BTreeMap::new();
        for row in 0..filtered.height() {
            let (_, detailed) = split_label(&categories[row]);
            let key = (
                area_codes[row].clone(),
                area_names[row].clone(),
                detailed.to_string(),
            );
            if let Some(value) = values[row] {
                *sums.entry(key).or_insert(0.0) += value;
            } else {
                sums.entry(key).or_insert(0.0);
            }
        }

        let mut codes = Vec::with_capacity(sums.len());
        let mut names = Vec::with_capacity(sums.len());
        let mut groups = Vec::with_capacity(sums.len());
        let mut totals = Vec::with_capacity(sums.len());
        for ((code, name, detailed), total) in sums {
            codes.push(code);
            names.push(name);
            groups.push(detailed);
            totals.push(total);
        }

        let out = DataFrame::new(vec![
            Series::new(columns::AREA_CODE.into(), codes).into_column(),
            Series::new(columns::AREA_NAME.into(), names).into_column(),
            Series::new("detailed_group".into(), groups).into_column(),
            Series::new(columns::VALUE.into(), totals).into_column(),
        ])?;
        let sorted = out.sort(
            [columns::AREA_NAME, columns::VALUE],
            SortMultipleOptions::default().with_order_descending_multi([false, true]),
        )?;
        return Ok(sorted);
    }

    let mut broads = Vec::with_capacity(filtered.height());
    let mut details = Vec::with_capacity(filtered.height());
    for category in &categories {
        let (broad, detailed) = split_label(category);
        broads.push(broad.to_string());
        details.push(detailed.to_string());
    }

    let out = DataFrame::new(vec![
        Series::new(columns::AREA_CODE.into(), area_codes).into_column(),
        Series::new(columns::AREA_NAME.into(), area_names).into_column(),
        Series::new("broad_group".into(), broads).into_column(),
        Series::new("detailed_group".into(), details).into_column(),
        Series::new(columns::VALUE.into(), values).into_column(),
    ])?;
    let sorted = out.sort(
        [columns::AREA_NAME, "detailed_group"],
        SortMultipleOptions::default(),
    )?;
    Ok(sorted)
}

/// Split `"Broad: Detailed"` into its parts. Labels without a separator
/// stand for both.
fn split_label(label: &str) -> (&str, &str) {
    match label.split_once(':') {
        Some((broad, detailed)) => (broad.trim(), detailed.trim()),
        None => (label.trim(), label.trim()),
    }
}
