//! The filter → pivot → rename reshaping pipeline.
//!
//! Raw API responses are long format: one row per (area, category,
//! measure). Reshaping filters to the requested measure, optionally
//! drops rural/urban sub-splits, then pivots category labels out into
//! columns so each area becomes a single row.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::{Column, DataFrame, IdxCa, IdxSize, IntoColumn, IntoLazy, NamedFrom, Series, col, lit};

use ukstat_model::{OutputMode, StatError, columns};

use crate::data_utils::{column_numeric_values, column_string_values, snake_case_unique};

/// Reshape a long-format observation frame into one tidy row per area.
///
/// `region_filter` is used on England & Wales census tables to keep only
/// the total row of the rural/urban split (typically `"Total"`); the
/// qualifier column is dropped afterwards. Asking for a region filter on
/// a frame without the qualifier column is an error, since silently
/// skipping it would return the sub-splits as if they were totals. An
/// input that filters down to nothing yields an empty frame, not an
/// error.
pub fn reshape(
    df: &DataFrame,
    mode: OutputMode,
    region_filter: Option<&str>,
) -> Result<DataFrame> {
    let mut frame = df
        .clone()
        .lazy()
        .filter(col(columns::MEASURE).eq(lit(mode.measure_label())))
        .collect()?;

    if let Some(qualifier) = region_filter {
        if frame.column(columns::RURAL_URBAN).is_err() {
            return Err(StatError::MissingColumns {
                columns: vec![columns::RURAL_URBAN.to_string()],
            }
            .into());
        }
        frame = frame
            .lazy()
            .filter(col(columns::RURAL_URBAN).eq(lit(qualifier.to_string())))
            .collect()?;
        frame = frame.drop(columns::RURAL_URBAN)?;
    }

    pivot_categories(&frame)
}

/// Pivot the category column out into one column per distinct label.
///
/// Every column other than category/measure/value is treated as part of
/// the row identity (area_code, area_name, and date when present).
/// Categories absent for a given area come through as nulls, never
/// zeros. Output rows keep the first-seen order of the input; output
/// category columns keep first-seen label order, snake-cased and
/// deduplicated against the identity names.
pub fn pivot_categories(df: &DataFrame) -> Result<DataFrame> {
    let identity: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .filter(|n| n != columns::CATEGORY && n != columns::MEASURE && n != columns::VALUE)
        .collect();

    if df.height() == 0 {
        return Ok(df.select(identity.iter().map(String::as_str))?);
    }

    let labels = column_string_values(df, columns::CATEGORY)?;
    let values = column_numeric_values(df, columns::VALUE)?;
    let mut key_columns: Vec<Vec<String>> = Vec::with_capacity(identity.len());
    for name in &identity {
        key_columns.push(column_string_values(df, name)?);
    }

    // Group rows by identity key and slot values per category label,
    // both in first-seen order.
    let mut group_rows: Vec<usize> = Vec::new();
    let mut group_index: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    let mut label_order: Vec<String> = Vec::new();
    let mut label_index: BTreeMap<String, usize> = BTreeMap::new();
    let mut cells: Vec<Vec<Option<f64>>> = Vec::new();

    for row in 0..df.height() {
        let key: Vec<String> = key_columns.iter().map(|c| c[row].clone()).collect();
        let group = *group_index.entry(key).or_insert_with(|| {
            group_rows.push(row);
            for column in &mut cells {
                column.push(None);
            }
            group_rows.len() - 1
        });

        let label = &labels[row];
        let slot = match label_index.get(label) {
            Some(idx) => *idx,
            None => {
                label_index.insert(label.clone(), label_order.len());
                label_order.push(label.clone());
                cells.push(vec![None; group_rows.len()]);
                cells.len() - 1
            }
        };
        cells[slot][group] = values[row];
    }

    // Identity columns are rebuilt by taking the first row of each
    // group, which preserves their original dtypes.
    let take = IdxCa::from_vec(
        "idx".into(),
        group_rows.iter().map(|r| *r as IdxSize).collect(),
    );
    let mut out_columns: Vec<Column> =
        Vec::with_capacity(identity.len() + label_order.len());
    for name in &identity {
        let series = df.column(name)?.as_materialized_series().take(&take)?;
        out_columns.push(series.into_column());
    }

    let names = snake_case_unique(&label_order, &identity);
    for (slot, name) in names.iter().enumerate() {
        out_columns.push(Series::new(name.as_str().into(), cells[slot].clone()).into_column());
    }

    Ok(DataFrame::new(out_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_frame(rows: &[(&str, &str, &str, &str, f64)]) -> DataFrame {
        DataFrame::new(vec![
            Series::new(
                columns::AREA_CODE.into(),
                rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::AREA_NAME.into(),
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::CATEGORY.into(),
                rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::MEASURE.into(),
                rows.iter().map(|r| r.3).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                columns::VALUE.into(),
                rows.iter().map(|r| r.4).collect::<Vec<_>>(),
            )
            .into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn pivots_one_row_per_area() {
        let df = long_frame(&[
            ("E07000178", "Oxford", "Owned", "Value", 100.0),
            ("E07000178", "Oxford", "Social rented", "Value", 40.0),
            ("E07000179", "Cherwell", "Owned", "Value", 80.0),
        ]);
        let tidy = reshape(&df, OutputMode::Count, None).unwrap();

        assert_eq!(tidy.height(), 2);
        let owned = tidy.column("owned").unwrap().f64().unwrap();
        assert_eq!(owned.get(0), Some(100.0));
        assert_eq!(owned.get(1), Some(80.0));

        // Cherwell has no social-rented row: null, not zero.
        let social = tidy.column("social_rented").unwrap().f64().unwrap();
        assert_eq!(social.get(0), Some(40.0));
        assert_eq!(social.get(1), None);
    }

    #[test]
    fn drops_rows_with_other_measures() {
        let df = long_frame(&[
            ("E07000178", "Oxford", "Owned", "Value", 100.0),
            ("E07000178", "Oxford", "Owned", "Percent", 62.5),
        ]);
        let counts = reshape(&df, OutputMode::Count, None).unwrap();
        assert_eq!(counts.height(), 1);
        assert_eq!(
            counts.column("owned").unwrap().f64().unwrap().get(0),
            Some(100.0)
        );

        let percents = reshape(&df, OutputMode::Percent, None).unwrap();
        assert_eq!(
            percents.column("owned").unwrap().f64().unwrap().get(0),
            Some(62.5)
        );
    }

    #[test]
    fn region_filter_keeps_total_and_drops_qualifier() {
        let mut df = long_frame(&[
            ("E07000178", "Oxford", "Owned", "Value", 100.0),
            ("E07000178", "Oxford", "Owned", "Value", 60.0),
        ]);
        df.with_column(Series::new(
            columns::RURAL_URBAN.into(),
            vec!["Total", "Urban"],
        ))
        .unwrap();

        let tidy = reshape(&df, OutputMode::Count, Some("Total")).unwrap();
        assert_eq!(tidy.height(), 1);
        assert!(tidy.column(columns::RURAL_URBAN).is_err());
        assert_eq!(
            tidy.column("owned").unwrap().f64().unwrap().get(0),
            Some(100.0)
        );
    }

    #[test]
    fn region_filter_without_qualifier_column_is_an_error() {
        let df = long_frame(&[("E07000178", "Oxford", "Owned", "Value", 100.0)]);
        let err = reshape(&df, OutputMode::Count, Some("Total")).unwrap_err();
        match err.downcast_ref::<StatError>() {
            Some(StatError::MissingColumns { columns: missing }) => {
                assert_eq!(missing, &[columns::RURAL_URBAN.to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_after_filter_is_empty_frame_not_error() {
        let df = long_frame(&[("E07000178", "Oxford", "Owned", "Value", 100.0)]);
        let tidy = reshape(&df, OutputMode::Percent, None).unwrap();
        assert_eq!(tidy.height(), 0);
    }

    #[test]
    fn single_category_pivot_is_a_rename() {
        let df = long_frame(&[
            ("E07000178", "Oxford", "All Ages", "Value", 150000.0),
            ("E07000179", "Cherwell", "All Ages", "Value", 148000.0),
        ]);
        let tidy = reshape(&df, OutputMode::Count, None).unwrap();
        assert_eq!(tidy.height(), 2);
        assert_eq!(tidy.width(), 3);
        assert_eq!(
            tidy.get_column_names()
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>(),
            vec![columns::AREA_CODE, columns::AREA_NAME, "all_ages"]
        );
    }

    #[test]
    fn category_colliding_with_identity_is_suffixed() {
        let df = long_frame(&[("E07000178", "Oxford", "Area name", "Value", 1.0)]);
        let tidy = reshape(&df, OutputMode::Count, None).unwrap();
        assert!(tidy.column("area_name_2").is_ok());
    }
}
