//! Tenure regrouping for the housing-tenure census table.
//!
//! Works on reshape output, so the raw column names here are the
//! snake-cased 2011 category labels. Shared ownership and rent-free
//! households are folded into a single `other` column; the remaining
//! categories get canonical names. Totals are conserved:
//! `owned_total + social_rent_total + private_rent_total + other`
//! equals `total_households`.

use anyhow::Result;
use polars::prelude::{DataFrame, IntoLazy, col, lit};

use ukstat_model::columns;

use crate::data_utils::select_expected;

/// Raw columns folded into the derived `other` column.
const OTHER_COMPONENTS: [&str; 2] = [
    "shared_ownership_part_owned_and_part_rented",
    "living_rent_free",
];

/// Raw-to-canonical renames applied after derivation.
const RENAMES: [(&str, &str); 10] = [
    ("all_households", "total_households"),
    ("owned", "owned_total"),
    ("owned_owned_outright", "owned_outright"),
    ("owned_owned_with_a_mortgage_or_loan", "owned_mortgage"),
    ("social_rented", "social_rent_total"),
    (
        "social_rented_rented_from_council_local_authority",
        "social_rent_council",
    ),
    ("social_rented_other", "social_rent_ha"),
    ("private_rented", "private_rent_total"),
    (
        "private_rented_private_landlord_or_letting_agency",
        "private_rent_landlord",
    ),
    ("private_rented_other", "private_rent_other"),
];

/// Regroup raw tenure columns into the canonical schema.
///
/// Raw columns are dropped once their derived counterparts exist; any
/// expected raw column missing from the input fails with
/// `MissingColumns`.
pub fn regroup_tenure(df: &DataFrame) -> Result<DataFrame> {
    let mut expected: Vec<&str> = vec![columns::AREA_CODE, columns::AREA_NAME];
    expected.extend(RENAMES.iter().map(|(raw, _)| *raw));
    expected.extend(OTHER_COMPONENTS);
    let mut frame = select_expected(df, &expected)?;

    frame = frame
        .lazy()
        .with_column(
            (col(OTHER_COMPONENTS[0]).fill_null(lit(0.0))
                + col(OTHER_COMPONENTS[1]).fill_null(lit(0.0)))
            .alias("other"),
        )
        .collect()?;

    for (raw, canonical) in RENAMES {
        frame.rename(raw, canonical.into())?;
    }

    let mut keep: Vec<&str> = vec![columns::AREA_CODE, columns::AREA_NAME];
    keep.extend(RENAMES.iter().map(|(_, canonical)| *canonical));
    keep.push("other");
    Ok(frame.select(keep)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};
    use ukstat_model::StatError;

    fn wide_frame() -> DataFrame {
        let columns_spec: [(&str, f64); 12] = [
            ("all_households", 100.0),
            ("owned", 60.0),
            ("owned_owned_outright", 35.0),
            ("owned_owned_with_a_mortgage_or_loan", 25.0),
            ("shared_ownership_part_owned_and_part_rented", 3.0),
            ("social_rented", 20.0),
            ("social_rented_rented_from_council_local_authority", 12.0),
            ("social_rented_other", 8.0),
            ("private_rented", 15.0),
            ("private_rented_private_landlord_or_letting_agency", 13.0),
            ("private_rented_other", 2.0),
            ("living_rent_free", 2.0),
        ];
        let mut cols = vec![
            Series::new(columns::AREA_CODE.into(), vec!["E07000178"]).into_column(),
            Series::new(columns::AREA_NAME.into(), vec!["Oxford"]).into_column(),
        ];
        for (name, value) in columns_spec {
            cols.push(Series::new(name.into(), vec![value]).into_column());
        }
        DataFrame::new(cols).unwrap()
    }

    fn cell(df: &DataFrame, name: &str) -> f64 {
        df.column(name).unwrap().f64().unwrap().get(0).unwrap()
    }

    #[test]
    fn derives_other_and_renames() {
        let out = regroup_tenure(&wide_frame()).unwrap();

        assert_eq!(cell(&out, "other"), 5.0); // shared ownership + rent free
        assert_eq!(cell(&out, "owned_total"), 60.0);
        assert_eq!(cell(&out, "owned_outright"), 35.0);
        assert_eq!(cell(&out, "owned_mortgage"), 25.0);
        assert_eq!(cell(&out, "social_rent_total"), 20.0);
        assert_eq!(cell(&out, "social_rent_council"), 12.0);
        assert_eq!(cell(&out, "social_rent_ha"), 8.0);
        assert_eq!(cell(&out, "private_rent_total"), 15.0);

        // Raw columns are gone.
        assert!(out.column("all_households").is_err());
        assert!(out.column("living_rent_free").is_err());
    }

    #[test]
    fn regrouping_conserves_totals() {
        let out = regroup_tenure(&wide_frame()).unwrap();
        let regrouped = cell(&out, "owned_total")
            + cell(&out, "social_rent_total")
            + cell(&out, "private_rent_total")
            + cell(&out, "other");
        assert_eq!(regrouped, cell(&out, "total_households"));
    }

    #[test]
    fn missing_raw_column_is_flagged() {
        let df = wide_frame().drop("social_rented").unwrap();
        let err = regroup_tenure(&df).unwrap_err();
        let stat = err.downcast_ref::<StatError>().unwrap();
        assert!(matches!(stat, StatError::MissingColumns { .. }));
    }
}
