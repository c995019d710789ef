//! Country-of-birth bucketing.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::{DataFrame, IntoColumn, IntoLazy, NamedFrom, Series, col, lit};
use tracing::warn;

use ukstat_model::{OutputMode, columns};
use ukstat_standards::{CobBucket, CobBucketTable};

use crate::data_utils::{column_numeric_values, column_string_values};

/// Sum fine-grained country-of-birth categories into the five buckets
/// defined by `table` (uk, ireland, other_eu, rest_europe, rest_world).
///
/// Categories not listed in the table are omitted from every bucket and
/// logged at warn level. That is deliberate fail-open behaviour: a new
/// upstream category never breaks the call, but it contributes nothing
/// until the bucket table is updated — keep the table current.
pub fn birth_country_buckets(
    df: &DataFrame,
    mode: OutputMode,
    table: &CobBucketTable,
) -> Result<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col(columns::MEASURE).eq(lit(mode.measure_label())))
        .collect()?;

    let area_codes = column_string_values(&filtered, columns::AREA_CODE)?;
    let area_names = column_string_values(&filtered, columns::AREA_NAME)?;
    let categories = column_string_values(&filtered, columns::CATEGORY)?;
    let values = column_numeric_values(&filtered, columns::VALUE)?;

    // Per-area bucket sums in first-seen area order.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut sums: Vec<[f64; 5]> = Vec::new();
    let mut unlisted: BTreeSet<String> = BTreeSet::new();

    for row in 0..filtered.height() {
        let Some(bucket) = table.bucket_for(&categories[row]) else {
            unlisted.insert(categories[row].clone());
            continue;
        };
        let key = (area_codes[row].clone(), area_names[row].clone());
        let idx = match order.iter().position(|k| *k == key) {
            Some(idx) => idx,
            None => {
                order.push(key);
                sums.push([0.0; 5]);
                sums.len() - 1
            }
        };
        let slot = CobBucket::ALL
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(0);
        sums[idx][slot] += values[row].unwrap_or(0.0);
    }

    for category in &unlisted {
        warn!(
            category,
            version = %table.version,
            "country-of-birth category not in bucket table; omitted from all buckets"
        );
    }

    let mut out_columns = vec![
        Series::new(
            columns::AREA_CODE.into(),
            order.iter().map(|(code, _)| code.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            columns::AREA_NAME.into(),
            order.iter().map(|(_, name)| name.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    for (slot, bucket) in CobBucket::ALL.iter().enumerate() {
        out_columns.push(
            Series::new(
                bucket.column_name().into(),
                sums.iter().map(|row| row[slot]).collect::<Vec<_>>(),
            )
            .into_column(),
        );
    }

    Ok(DataFrame::new(out_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(rows: &[(&str, f64)]) -> DataFrame {
        DataFrame::new(vec![
            Series::new(
                columns::AREA_CODE.into(),
                rows.iter().map(|_| "E07000178").collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::AREA_NAME.into(),
                rows.iter().map(|_| "Oxford").collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::CATEGORY.into(),
                rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::MEASURE.into(),
                rows.iter().map(|_| "Value").collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::VALUE.into(),
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            )
            .into_column(),
        ])
        .unwrap()
    }

    fn cell(df: &DataFrame, name: &str) -> f64 {
        df.column(name).unwrap().f64().unwrap().get(0).unwrap()
    }

    #[test]
    fn buckets_sum_fine_grained_categories() {
        let table = CobBucketTable::builtin_2011();
        let df = frame(&[
            ("Europe: United Kingdom: England", 900.0),
            ("Europe: United Kingdom: Scotland", 50.0),
            ("Europe: Ireland", 20.0),
            ("Europe: Other Europe: Rest of Europe", 10.0),
            ("Africa", 15.0),
            ("Middle East and Asia", 25.0),
        ]);
        let out = birth_country_buckets(&df, OutputMode::Count, &table).unwrap();

        assert_eq!(out.height(), 1);
        assert_eq!(cell(&out, "uk"), 950.0);
        assert_eq!(cell(&out, "ireland"), 20.0);
        assert_eq!(cell(&out, "other_eu"), 0.0);
        assert_eq!(cell(&out, "rest_europe"), 10.0);
        assert_eq!(cell(&out, "rest_world"), 40.0);
    }

    #[test]
    fn bucket_sums_match_reported_total() {
        let table = CobBucketTable::builtin_2011();
        let df = frame(&[
            // "All usual residents" is the upstream total; it is not in
            // the bucket table so it must not inflate any bucket.
            ("All usual residents", 1000.0),
            ("Europe: United Kingdom: England", 940.0),
            ("Europe: Ireland", 30.0),
            ("Africa", 30.0),
        ]);
        let out = birth_country_buckets(&df, OutputMode::Count, &table).unwrap();

        let total: f64 = CobBucket::ALL
            .iter()
            .map(|b| cell(&out, b.column_name()))
            .sum();
        assert_eq!(total, 1000.0);
    }

    #[test]
    fn unlisted_category_fails_open() {
        let table = CobBucketTable::new(
            "test",
            vec![("Listed".to_string(), CobBucket::Uk)],
        );
        let df = frame(&[("Listed", 5.0), ("Never seen before", 7.0)]);
        let out = birth_country_buckets(&df, OutputMode::Count, &table).unwrap();
        assert_eq!(cell(&out, "uk"), 5.0);
        assert_eq!(cell(&out, "rest_world"), 0.0);
    }
}
