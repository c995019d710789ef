//! Batch retrieval operations over the collaborator ports.
//!
//! Each requested area is one independent fetch, executed sequentially;
//! result order follows input order. Failures carry the code or title
//! that caused them so one bad entry in a batch is diagnosable.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use polars::prelude::{DataFrame, DataType, PlSmallStr, Series};
use tracing::info;

use ukstat_model::{
    AreaCode, CensusFamily, CensusTableRef, OutputMode, PopulationSource, Sex, columns,
};
use ukstat_standards::GeographyKey;

use crate::classify::classify;
use crate::lookup::assemble;
use crate::ports::{FeatureService, ObservationSource, TableCatalog};
use crate::reshape::reshape;
use crate::resolver::resolve;
use crate::transforms::sum_age_range;

/// Small-area population estimates (England & Wales, 2011 onwards).
pub const DATASET_SMALL_AREA: &str = "NM_2010_1";
/// Local-authority population estimates (UK-wide, 1991 onwards).
pub const DATASET_LOCAL_AUTHORITY: &str = "NM_31_1";

/// First year of the local-authority population series.
const LOCAL_AUTHORITY_FROM: i32 = 1991;
/// First year of the small-area population series.
const SMALL_AREA_FROM: i32 = 2011;

const POPULATION_COLUMNS: [&str; 6] = [
    columns::AREA_CODE,
    columns::AREA_NAME,
    columns::DATE,
    columns::CATEGORY,
    columns::MEASURE,
    columns::VALUE,
];

const AGE_COLUMNS: [&str; 5] = [
    columns::AREA_CODE,
    columns::AREA_NAME,
    columns::DATE,
    columns::AGE_CODE,
    columns::VALUE,
];

const CENSUS_COLUMNS_EW: [&str; 6] = [
    columns::AREA_CODE,
    columns::AREA_NAME,
    columns::CATEGORY,
    columns::MEASURE,
    columns::VALUE,
    columns::RURAL_URBAN,
];

const CENSUS_COLUMNS_UK: [&str; 5] = [
    columns::AREA_CODE,
    columns::AREA_NAME,
    columns::CATEGORY,
    columns::MEASURE,
    columns::VALUE,
];

/// Fetch mid-year population for a batch of areas.
///
/// Each area is routed to the population series that covers it; the
/// tidy results are stacked in input order. The `all_ages` column comes
/// back as `population`.
pub fn population(
    source: &dyn ObservationSource,
    key: &GeographyKey,
    codes: &[AreaCode],
    year: i32,
    sex: Sex,
    mode: OutputMode,
) -> Result<DataFrame> {
    let classification = classify(key, codes)?;
    if year < LOCAL_AUTHORITY_FROM {
        bail!("population estimates begin in {LOCAL_AUTHORITY_FROM}; got {year}");
    }
    if year < SMALL_AREA_FROM && !classification.small_area().is_empty() {
        bail!(
            "small-area population estimates begin in {SMALL_AREA_FROM}; \
             {} requested code(s) are below local-authority level",
            classification.small_area().len()
        );
    }

    let mut filters = BTreeMap::new();
    filters.insert("date".to_string(), year.to_string());
    filters.insert("gender".to_string(), sex.nomis_gender().to_string());

    let mut acc: Option<DataFrame> = None;
    for code in codes {
        let dataset = match classification.source_for(code) {
            Some(PopulationSource::SmallAreaBased) => DATASET_SMALL_AREA,
            _ => DATASET_LOCAL_AUTHORITY,
        };
        let raw = source
            .fetch_data(dataset, std::slice::from_ref(code), &filters, &POPULATION_COLUMNS)
            .with_context(|| format!("fetching population for {code}"))?;
        let mut tidy = reshape(&raw, mode, None)?;
        if tidy.column("all_ages").is_ok() {
            tidy.rename("all_ages", "population".into())?;
        }
        acc = append(acc, tidy).with_context(|| format!("appending rows for {code}"))?;
    }

    info!(areas = codes.len(), year, %sex, "fetched population batch");
    Ok(acc.unwrap_or_default())
}

/// Sum single-year-of-age population over `[lower, upper]` per area.
///
/// Only the local-authority series publishes single years of age, so
/// every requested code must be local-authority level or larger. An
/// upper bound of 90 or more includes the open-ended "90 and above"
/// bucket.
pub fn population_age_range(
    source: &dyn ObservationSource,
    key: &GeographyKey,
    codes: &[AreaCode],
    year: i32,
    lower: u32,
    upper: u32,
    sex: Sex,
) -> Result<DataFrame> {
    if lower > upper {
        bail!("invalid age range: {lower} > {upper}");
    }
    let classification = classify(key, codes)?;
    if !classification.small_area().is_empty() {
        bail!(
            "single-year-of-age estimates are only published for local \
             authorities and larger geographies"
        );
    }

    let mut filters = BTreeMap::new();
    filters.insert("date".to_string(), year.to_string());
    filters.insert("gender".to_string(), sex.nomis_gender().to_string());

    let mut acc: Option<DataFrame> = None;
    for code in codes {
        let raw = source
            .fetch_data(
                DATASET_LOCAL_AUTHORITY,
                std::slice::from_ref(code),
                &filters,
                &AGE_COLUMNS,
            )
            .with_context(|| format!("fetching ages for {code}"))?;
        let summed = sum_age_range(&raw, lower, upper)
            .with_context(|| format!("summing ages for {code}"))?;
        acc = append(acc, summed)?;
    }

    Ok(acc.unwrap_or_default())
}

/// Fetch a census table for a batch of areas and reshape it tidy.
///
/// The table title is resolved per census family: England & Wales codes
/// use the title as given (with the rural/urban split filtered to its
/// total rows); codes elsewhere in the UK use the UK-wide variant of the
/// same table.
pub fn census_table(
    catalog: &dyn TableCatalog,
    source: &dyn ObservationSource,
    key: &GeographyKey,
    title: &str,
    codes: &[AreaCode],
    mode: OutputMode,
) -> Result<DataFrame> {
    let classification = classify(key, codes)?;
    let filters = BTreeMap::new();
    let mut ew_ref: Option<CensusTableRef> = None;
    let mut uk_ref: Option<CensusTableRef> = None;

    let mut acc: Option<DataFrame> = None;
    for code in codes {
        let family = classification
            .census_family_for(code)
            .with_context(|| format!("code {code} missing from classification"))?;

        let (table_ref, fetch_columns, region_filter): (&CensusTableRef, &[&str], Option<&str>) =
            match family {
                CensusFamily::EnglandWales => {
                    let resolved = match &mut ew_ref {
                        Some(existing) => existing,
                        slot => slot.insert(
                            resolve(catalog, title)
                                .with_context(|| format!("resolving '{title}'"))?,
                        ),
                    };
                    (resolved, &CENSUS_COLUMNS_EW, Some("Total"))
                }
                CensusFamily::UkWide => {
                    let uk_title = uk_variant(title);
                    let resolved = match &mut uk_ref {
                        Some(existing) => existing,
                        slot => slot.insert(
                            resolve(catalog, &uk_title)
                                .with_context(|| format!("resolving '{uk_title}'"))?,
                        ),
                    };
                    (resolved, &CENSUS_COLUMNS_UK, None)
                }
            };

        let raw = source
            .fetch_data(
                &table_ref.resolved_id,
                std::slice::from_ref(code),
                &filters,
                fetch_columns,
            )
            .with_context(|| format!("fetching {title} for {code}"))?;
        let tidy = reshape(&raw, mode, region_filter)?;
        acc = append(acc, tidy).with_context(|| format!("appending rows for {code}"))?;
    }

    info!(areas = codes.len(), title, "fetched census table batch");
    Ok(acc.unwrap_or_default())
}

/// A feature-service query for one side of the unified lookup.
#[derive(Debug, Clone)]
pub struct LookupEndpoint<'a> {
    pub url: &'a str,
    pub where_clause: &'a str,
    pub fields: &'a [&'a str],
}

/// Fetch the region-based and nation-based geography lookups and
/// assemble them into the unified table.
pub fn unified_lookup(
    service: &dyn FeatureService,
    region: &LookupEndpoint<'_>,
    nation: &LookupEndpoint<'_>,
) -> Result<DataFrame> {
    let region_table = service
        .fetch_feature_table(region.url, region.where_clause, region.fields)
        .context("fetching region-based lookup")?;
    let nation_table = service
        .fetch_feature_table(nation.url, nation.where_clause, nation.fields)
        .context("fetching nation-based lookup")?;
    assemble(&region_table, &nation_table)
}

/// The UK-wide variant of an England & Wales table title.
fn uk_variant(title: &str) -> String {
    match title.strip_suffix("EW") {
        Some(base) => format!("{base}UK"),
        None => title.to_string(),
    }
}

/// Stack `next` under `acc`, taking the union of their columns.
///
/// Frames for different census families can pivot out different category
/// labels; columns absent on one side are padded with nulls, matching
/// the pivot's null-for-absent-category semantics. Accumulated column
/// order is kept, with new columns appended as they first appear.
fn append(acc: Option<DataFrame>, next: DataFrame) -> Result<Option<DataFrame>> {
    let Some(mut out) = acc else {
        return Ok(Some(next));
    };
    let mut next = next;

    for column in out.get_columns() {
        if next.column(column.name()).is_err() {
            next.with_column(Series::full_null(
                column.name().clone(),
                next.height(),
                column.dtype(),
            ))?;
        }
    }
    let incoming: Vec<(PlSmallStr, DataType)> = next
        .get_columns()
        .iter()
        .map(|c| (c.name().clone(), c.dtype().clone()))
        .collect();
    for (name, dtype) in &incoming {
        if out.column(name).is_err() {
            out.with_column(Series::full_null(name.clone(), out.height(), dtype))?;
        }
    }

    let order: Vec<PlSmallStr> = out
        .get_column_names()
        .iter()
        .map(|n| (*n).clone())
        .collect();
    let aligned = next.select(order)?;
    out.vstack_mut(&aligned)?;
    Ok(Some(out))
}
