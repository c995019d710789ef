//! Age-band aggregation and age-range summation.

use anyhow::Result;
use polars::prelude::{DataFrame, Expr, IntoLazy, col, lit};

use ukstat_model::columns;

use crate::data_utils::select_expected;

/// Raw Nomis single-year-of-age codes are the age plus this offset.
const AGE_CODE_OFFSET: i64 = 101;
/// Age code for "90 and above", the oldest single-year bucket published.
const AGE_CODE_90_PLUS: i64 = 191;

/// Ten-year output bands and the snake-cased 5-year columns they sum.
/// The final band folds 80-84 and 85+ together.
const TEN_YEAR_BANDS: [(&str, [&str; 2]); 9] = [
    ("age_0_9", ["aged_0_4", "aged_5_9"]),
    ("age_10_19", ["aged_10_14", "aged_15_19"]),
    ("age_20_29", ["aged_20_24", "aged_25_29"]),
    ("age_30_39", ["aged_30_34", "aged_35_39"]),
    ("age_40_49", ["aged_40_44", "aged_45_49"]),
    ("age_50_59", ["aged_50_54", "aged_55_59"]),
    ("age_60_69", ["aged_60_64", "aged_65_69"]),
    ("age_70_79", ["aged_70_74", "aged_75_79"]),
    ("age_80_plus", ["aged_80_84", "aged_85"]),
];

/// Aggregate pivoted 5-year age bands into 10-year bands.
///
/// Expects reshape output for a population-by-age table: identity
/// columns plus `all_ages` and the eighteen 5-year band columns. The
/// nine output bands sum to `pop_total` (renamed from `all_ages`).
pub fn ten_year_bands(df: &DataFrame) -> Result<DataFrame> {
    let has_date = df.column(columns::DATE).is_ok();
    let mut expected: Vec<&str> = vec![columns::AREA_CODE, columns::AREA_NAME];
    if has_date {
        expected.push(columns::DATE);
    }
    expected.push("all_ages");
    for (_, pair) in &TEN_YEAR_BANDS {
        expected.extend(pair);
    }
    let frame = select_expected(df, &expected)?;

    let sums: Vec<Expr> = TEN_YEAR_BANDS
        .iter()
        .map(|(band, pair)| {
            (col(pair[0]).fill_null(lit(0.0)) + col(pair[1]).fill_null(lit(0.0))).alias(*band)
        })
        .collect();

    let mut out = frame.lazy().with_columns(sums).collect()?;
    out.rename("all_ages", "pop_total".into())?;

    let mut keep: Vec<&str> = vec![columns::AREA_CODE, columns::AREA_NAME];
    if has_date {
        keep.push(columns::DATE);
    }
    keep.push("pop_total");
    keep.extend(TEN_YEAR_BANDS.iter().map(|(band, _)| *band));
    Ok(out.select(keep)?)
}

/// Sum single-year-of-age observations over a bound-inclusive range.
///
/// Input is the long frame for a single-year-of-age dataset: one row per
/// (area, [date], age_code). Aggregate rows (anything outside the raw
/// single-year code range) are excluded before summing. The sentinel
/// age 90 stands for "90 and above", so an `upper` of 90 or more
/// includes everyone at least `lower` years old.
pub fn sum_age_range(df: &DataFrame, lower: u32, upper: u32) -> Result<DataFrame> {
    let has_date = df.column(columns::DATE).is_ok();
    let mut expected: Vec<&str> = vec![columns::AREA_CODE, columns::AREA_NAME];
    if has_date {
        expected.push(columns::DATE);
    }
    expected.extend([columns::AGE_CODE, columns::VALUE]);
    let frame = select_expected(df, &expected)?;

    let mut keys = vec![col(columns::AREA_CODE), col(columns::AREA_NAME)];
    if has_date {
        keys.push(col(columns::DATE));
    }

    let out = frame
        .lazy()
        .filter(
            col(columns::AGE_CODE)
                .gt_eq(lit(AGE_CODE_OFFSET))
                .and(col(columns::AGE_CODE).lt_eq(lit(AGE_CODE_90_PLUS))),
        )
        .with_column((col(columns::AGE_CODE) - lit(AGE_CODE_OFFSET)).alias("age"))
        .filter(
            col("age")
                .gt_eq(lit(i64::from(lower)))
                .and(col("age").lt_eq(lit(i64::from(upper)))),
        )
        .group_by_stable(keys)
        .agg([col(columns::VALUE).sum().alias("population")])
        .collect()?;

    Ok(out)
}
