//! Command implementations.

use anyhow::{Context, Result, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use polars::prelude::DataFrame;
use tracing::info;

use ukstat_client::{NomisClient, OpenGeoClient};
use ukstat_core::data_utils::cell_string;
use ukstat_core::pipeline::{
    LookupEndpoint, census_table, population, population_age_range, unified_lookup,
};
use ukstat_core::{classify, resolve};
use ukstat_model::{AreaCode, OutputMode, Sex};
use ukstat_standards::GeographyKey;

use crate::cli::{CensusArgs, ClassifyArgs, LookupArgs, PopulationArgs, ResolveArgs};

/// 2021 ward to region lookup (England only).
const DEFAULT_REGION_URL: &str = "https://services1.arcgis.com/ESMARspQHYMw9BZ9/arcgis/rest/services/WD21_RGN21_EN_LU/FeatureServer/0";
/// 2021 ward to country lookup (whole UK).
const DEFAULT_NATION_URL: &str = "https://services1.arcgis.com/ESMARspQHYMw9BZ9/arcgis/rest/services/WD21_CTRY21_UK_LU/FeatureServer/0";

const REGION_FIELDS: [&str; 4] = ["WD21CD", "WD21NM", "RGN21CD", "RGN21NM"];
const NATION_FIELDS: [&str; 4] = ["WD21CD", "WD21NM", "CTRY21CD", "CTRY21NM"];

pub fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let key = GeographyKey::builtin();
    let codes = parse_codes(&args.codes)?;
    let classification = classify(key, &codes)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Code",
        "Type",
        "Granularity",
        "Population series",
        "Census family",
    ]);
    apply_table_style(&mut table);
    for (code, entry) in classification.iter() {
        table.add_row(vec![
            code.as_str().to_string(),
            entry.type_name.clone(),
            entry.granularity.as_str().to_string(),
            format!("{:?}", entry.population_source()),
            format!("{:?}", entry.census_family()),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let client = NomisClient::new()?;
    let table_ref = resolve(&client, &args.title)?;
    println!("{} -> {}", args.title, table_ref.resolved_id);
    Ok(())
}

pub fn run_population(args: &PopulationArgs) -> Result<()> {
    let key = GeographyKey::builtin();
    let codes = parse_codes(&args.codes)?;
    let sex: Sex = args.sex.parse()?;
    let mode: OutputMode = args.mode.parse()?;
    let client = NomisClient::new()?;

    let frame = match &args.ages {
        Some(range) => {
            let (lower, upper) = parse_age_range(range)?;
            population_age_range(&client, key, &codes, args.year, lower, upper, sex)?
        }
        None => population(&client, key, &codes, args.year, sex, mode)?,
    };
    print_frame(&frame);
    Ok(())
}

pub fn run_census(args: &CensusArgs) -> Result<()> {
    let key = GeographyKey::builtin();
    let codes = parse_codes(&args.codes)?;
    let mode: OutputMode = args.mode.parse()?;
    let client = NomisClient::new()?;

    let frame = census_table(&client, &client, key, &args.title, &codes, mode)?;
    info!(rows = frame.height(), "census table fetched");
    print_frame(&frame);
    Ok(())
}

pub fn run_lookup(args: &LookupArgs) -> Result<()> {
    let client = OpenGeoClient::new()?;
    let region = LookupEndpoint {
        url: args.region_url.as_deref().unwrap_or(DEFAULT_REGION_URL),
        where_clause: "1=1",
        fields: &REGION_FIELDS,
    };
    let nation = LookupEndpoint {
        url: args.nation_url.as_deref().unwrap_or(DEFAULT_NATION_URL),
        where_clause: "1=1",
        fields: &NATION_FIELDS,
    };
    let frame = unified_lookup(&client, &region, &nation)?;
    print_frame(&frame);
    Ok(())
}

/// Parse area codes, rejecting anything that is not the standard
/// nine-character shape before any remote call is made.
fn parse_codes(raw: &[String]) -> Result<Vec<AreaCode>> {
    let codes: Vec<AreaCode> = raw.iter().map(|c| AreaCode::new(c.trim())).collect();
    let malformed: Vec<String> = codes
        .iter()
        .filter(|code| !code.is_well_formed())
        .map(ToString::to_string)
        .collect();
    if !malformed.is_empty() {
        bail!("malformed area code(s): {}", malformed.join(", "));
    }
    Ok(codes)
}

/// Parse an inclusive "LOWER-UPPER" age range; a bare number means a
/// single year of age.
fn parse_age_range(raw: &str) -> Result<(u32, u32)> {
    let parsed = match raw.split_once('-') {
        Some((lower, upper)) => {
            let lower = lower.trim().parse().context("invalid lower age bound")?;
            let upper = upper.trim().parse().context("invalid upper age bound")?;
            (lower, upper)
        }
        None => {
            let age = raw.trim().parse().context("invalid age")?;
            (age, age)
        }
    };
    if parsed.0 > parsed.1 {
        bail!("invalid age range '{raw}': lower bound exceeds upper bound");
    }
    Ok(parsed)
}

/// Render any frame as a table, one column per frame column.
fn print_frame(frame: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..frame.height() {
        table.add_row(
            frame
                .get_columns()
                .iter()
                .map(|column| cell_string(column, row))
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_range_parses_pair_and_single() {
        assert_eq!(parse_age_range("0-17").unwrap(), (0, 17));
        assert_eq!(parse_age_range("65").unwrap(), (65, 65));
    }

    #[test]
    fn age_range_rejects_inverted_bounds() {
        assert!(parse_age_range("17-0").is_err());
        assert!(parse_age_range("abc").is_err());
    }

    #[test]
    fn codes_are_trimmed_and_shape_checked() {
        let codes = parse_codes(&[" E07000178 ".to_string()]).unwrap();
        assert_eq!(codes[0].as_str(), "E07000178");

        // Every malformed code is named, not just the first.
        let err = parse_codes(&[
            "E07".to_string(),
            "E07000178".to_string(),
            "E07X00178".to_string(),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed area code(s): E07, E07X00178"
        );
    }
}
