//! Geography lookup assembly.
//!
//! The boundary service exposes parent-child geography lookups per
//! endpoint: a region-based one covering England and a nation-based one
//! covering the whole UK. Assembling them takes England at region level
//! and everything else at nation level, with no overlap.

use anyhow::Result;
use polars::prelude::{DataFrame, IntoLazy, col, lit};

use ukstat_model::{StatError, columns};

/// Unified lookup schema, in positional order.
const UNIFIED: [&str; 4] = [
    columns::AREA_CODE,
    columns::AREA_NAME,
    columns::PARENT_CODE,
    columns::PARENT_NAME,
];

/// Combine a region-based and a nation-based geography lookup into one
/// table under the unified schema.
///
/// Inputs carry endpoint-specific column names; only their positions
/// matter: area code, area name, parent code, parent name. Nation rows
/// whose parent is England are dropped — the region table already covers
/// England at finer grain.
pub fn assemble(region_table: &DataFrame, nation_table: &DataFrame) -> Result<DataFrame> {
    let regions = unify_schema(region_table, "region")?;
    let nations = unify_schema(nation_table, "nation")?;

    let rest_of_uk = nations
        .lazy()
        .filter(col(columns::PARENT_NAME).neq(lit("England")))
        .collect()?;

    let mut out = regions;
    out.vstack_mut(&rest_of_uk)?;
    Ok(out)
}

/// Rename the first four positional columns to the unified schema.
fn unify_schema(df: &DataFrame, table: &str) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    if names.len() < UNIFIED.len() {
        return Err(StatError::SchemaMismatch {
            table: table.to_string(),
            expected: UNIFIED.len(),
            found: names.len(),
        }
        .into());
    }

    let mut out = df.select(names.iter().take(UNIFIED.len()).map(String::as_str))?;
    for (position, unified) in UNIFIED.iter().enumerate() {
        if names[position] != *unified {
            out.rename(&names[position], (*unified).into())?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn table(names: [&str; 4], rows: &[[&str; 4]]) -> DataFrame {
        DataFrame::new(
            (0..4)
                .map(|i| {
                    Series::new(
                        names[i].into(),
                        rows.iter().map(|r| r[i]).collect::<Vec<_>>(),
                    )
                    .into_column()
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn england_nation_rows_are_dropped() {
        let regions = table(
            ["WD21CD", "WD21NM", "RGN21CD", "RGN21NM"],
            &[["E05000123", "Holborn", "E12000007", "London"]],
        );
        let nations = table(
            ["WD21CD", "WD21NM", "CTRY21CD", "CTRY21NM"],
            &[
                ["E05000124", "Somewhere", "E92000001", "England"],
                ["S13002605", "Tiree", "S92000003", "Scotland"],
            ],
        );

        let out = assemble(&regions, &nations).unwrap();
        assert_eq!(out.height(), 2);
        let parents = out.column(columns::PARENT_NAME).unwrap().str().unwrap();
        assert_eq!(parents.get(0), Some("London"));
        assert_eq!(parents.get(1), Some("Scotland"));
    }

    #[test]
    fn unified_schema_column_names() {
        let regions = table(
            ["a", "b", "c", "d"],
            &[["E05000123", "Holborn", "E12000007", "London"]],
        );
        let nations = table(
            ["w", "x", "y", "z"],
            &[["S13002605", "Tiree", "S92000003", "Scotland"]],
        );
        let out = assemble(&regions, &nations).unwrap();
        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>(),
            UNIFIED.to_vec()
        );
    }

    #[test]
    fn narrow_input_is_schema_mismatch() {
        let narrow = DataFrame::new(vec![
            Series::new("a".into(), vec!["x"]).into_column(),
            Series::new("b".into(), vec!["y"]).into_column(),
        ])
        .unwrap();
        let nations = table(
            ["w", "x", "y", "z"],
            &[["S13002605", "Tiree", "S92000003", "Scotland"]],
        );
        let err = assemble(&narrow, &nations).unwrap_err();
        let stat = err.downcast_ref::<StatError>().unwrap();
        assert!(matches!(stat, StatError::SchemaMismatch { .. }));
    }

    #[test]
    fn extra_columns_beyond_four_are_ignored() {
        let mut regions = table(
            ["a", "b", "c", "d"],
            &[["E05000123", "Holborn", "E12000007", "London"]],
        );
        regions
            .with_column(Series::new("shape_area".into(), vec![1.5f64]))
            .unwrap();
        let nations = table(
            ["w", "x", "y", "z"],
            &[["S13002605", "Tiree", "S92000003", "Scotland"]],
        );
        let out = assemble(&regions, &nations).unwrap();
        assert_eq!(out.width(), 4);
    }
}
