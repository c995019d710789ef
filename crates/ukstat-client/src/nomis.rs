//! Client for the Nomis statistics API.
//!
//! Nomis exposes a dataset catalog as SDMX JSON and observation data as
//! CSV. Responses come back with upstream column names
//! (`GEOGRAPHY_CODE`, `OBS_VALUE`, ...); this client translates between
//! those and the canonical column names the rest of the workspace uses.

use std::collections::BTreeMap;
use std::time::Duration;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Deserialize;
use tracing::debug;

use ukstat_core::ports::{ObservationSource, TableCatalog};
use ukstat_model::{AreaCode, CatalogEntry, StatError, columns};

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://www.nomisweb.co.uk";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Canonical column name to Nomis `select` field.
const SELECT_MAP: [(&str, &str); 8] = [
    (columns::AREA_CODE, "GEOGRAPHY_CODE"),
    (columns::AREA_NAME, "GEOGRAPHY_NAME"),
    (columns::DATE, "DATE_NAME"),
    (columns::CATEGORY, "CELL_NAME"),
    (columns::MEASURE, "MEASURES_NAME"),
    (columns::VALUE, "OBS_VALUE"),
    (columns::RURAL_URBAN, "RURAL_URBAN_NAME"),
    (columns::AGE_CODE, "C_AGE"),
];

pub struct NomisClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl NomisClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("ukstat/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    fn get_text(&self, url: &str) -> Result<String, ClientError> {
        debug!(url, "nomis request");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| ClientError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().map_err(|source| ClientError::Http {
            url: url.to_string(),
            source,
        })
    }
}

// ── Catalog search ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SdmxResponse {
    structure: SdmxStructure,
}

#[derive(Deserialize)]
struct SdmxStructure {
    #[serde(default)]
    keyfamilies: Option<KeyFamilies>,
}

#[derive(Deserialize)]
struct KeyFamilies {
    #[serde(default)]
    keyfamily: Vec<KeyFamily>,
}

#[derive(Deserialize)]
struct KeyFamily {
    id: String,
    name: SdmxName,
}

#[derive(Deserialize)]
struct SdmxName {
    value: String,
}

fn parse_catalog(body: &str, url: &str) -> Result<Vec<CatalogEntry>, ClientError> {
    let parsed: SdmxResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
    let families = parsed
        .structure
        .keyfamilies
        .map(|k| k.keyfamily)
        .unwrap_or_default();
    Ok(families
        .into_iter()
        .map(|family| CatalogEntry {
            id: family.id,
            name: family.name.value,
        })
        .collect())
}

impl TableCatalog for NomisClient {
    fn search_tables(&self, query_prefix: &str) -> ukstat_model::Result<Vec<CatalogEntry>> {
        let url = format!(
            "{}/api/v01/dataset/def.sdmx.json?search={query_prefix}",
            self.base_url
        );
        let body = self.get_text(&url)?;
        Ok(parse_catalog(&body, &url)?)
    }
}

// ── Observation data ────────────────────────────────────────────────

fn upstream_field(canonical: &str) -> Option<&'static str> {
    SELECT_MAP
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, field)| *field)
}

fn data_url(
    base_url: &str,
    dataset_id: &str,
    geography_codes: &[AreaCode],
    filters: &BTreeMap<String, String>,
    selected: &[&str],
) -> String {
    let geography = geography_codes
        .iter()
        .map(AreaCode::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let mut url = format!(
        "{base_url}/api/v01/dataset/{dataset_id}.data.csv?geography={geography}&select={}",
        selected.join(",")
    );
    for (name, value) in filters {
        url.push('&');
        url.push_str(name);
        url.push('=');
        url.push_str(value);
    }
    url
}

/// Parse a Nomis CSV body into a frame with canonical column names.
///
/// `OBS_VALUE` becomes a float column (empty cells are null, as Nomis
/// leaves suppressed cells blank) and `C_AGE` an integer column; the
/// rest stay strings.
fn csv_to_frame(
    body: &str,
    url: &str,
    requested: &[&str],
) -> Result<DataFrame, ClientError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ClientError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })?
        .clone();

    let mut indices = Vec::with_capacity(requested.len());
    for canonical in requested {
        let Some(field) = upstream_field(canonical) else {
            return Err(ClientError::Decode {
                url: url.to_string(),
                detail: format!("no upstream field for column '{canonical}'"),
            });
        };
        let Some(index) = headers.iter().position(|h| h == field) else {
            return Err(ClientError::Decode {
                url: url.to_string(),
                detail: format!("response is missing column {field}"),
            });
        };
        indices.push(index);
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); requested.len()];
    for record in reader.records() {
        let record = record.map_err(|e| ClientError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        for (slot, index) in indices.iter().enumerate() {
            cells[slot].push(record.get(*index).unwrap_or_default().to_string());
        }
    }

    let mut out = Vec::with_capacity(requested.len());
    for (canonical, values) in requested.iter().zip(cells) {
        out.push(typed_column(canonical, values));
    }
    DataFrame::new(out).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

fn typed_column(canonical: &str, values: Vec<String>) -> Column {
    match canonical {
        columns::VALUE => {
            let parsed: Vec<Option<f64>> =
                values.iter().map(|v| v.trim().parse().ok()).collect();
            Series::new(canonical.into(), parsed).into_column()
        }
        columns::AGE_CODE => {
            let parsed: Vec<Option<i64>> =
                values.iter().map(|v| v.trim().parse().ok()).collect();
            Series::new(canonical.into(), parsed).into_column()
        }
        _ => Series::new(canonical.into(), values).into_column(),
    }
}

impl ObservationSource for NomisClient {
    fn fetch_data(
        &self,
        dataset_id: &str,
        geography_codes: &[AreaCode],
        filters: &BTreeMap<String, String>,
        fetch_columns: &[&str],
    ) -> ukstat_model::Result<DataFrame> {
        let mut selected = Vec::with_capacity(fetch_columns.len());
        for canonical in fetch_columns {
            match upstream_field(canonical) {
                Some(field) => selected.push(field),
                None => {
                    return Err(StatError::MissingColumns {
                        columns: vec![(*canonical).to_string()],
                    });
                }
            }
        }

        let url = data_url(&self.base_url, dataset_id, geography_codes, filters, &selected);
        let body = self.get_text(&url)?;
        Ok(csv_to_frame(&body, &url, fetch_columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parse_reads_keyfamilies() {
        let body = r#"{
            "structure": {
                "keyfamilies": {
                    "keyfamily": [
                        {"id": "NM_608_1", "name": {"value": "KS201EW - Ethnic group"}},
                        {"id": "NM_616_1", "name": {"value": "KS201UK - Ethnic group"}}
                    ]
                }
            }
        }"#;
        let entries = parse_catalog(body, "test").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "NM_608_1");
        assert_eq!(entries[1].name, "KS201UK - Ethnic group");
    }

    #[test]
    fn catalog_parse_handles_no_matches() {
        let body = r#"{"structure": {}}"#;
        let entries = parse_catalog(body, "test").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn data_url_includes_codes_select_and_filters() {
        let geography = vec![AreaCode::from("E07000178"), AreaCode::from("S12000033")];
        let mut filters = BTreeMap::new();
        filters.insert("date".to_string(), "2020".to_string());
        filters.insert("gender".to_string(), "0".to_string());

        let url = data_url(
            DEFAULT_BASE_URL,
            "NM_31_1",
            &geography,
            &filters,
            &["GEOGRAPHY_CODE", "OBS_VALUE"],
        );
        assert_eq!(
            url,
            "https://www.nomisweb.co.uk/api/v01/dataset/NM_31_1.data.csv\
             ?geography=E07000178,S12000033&select=GEOGRAPHY_CODE,OBS_VALUE\
             &date=2020&gender=0"
        );
    }

    #[test]
    fn csv_parse_maps_upstream_names_and_types() {
        let body = "GEOGRAPHY_CODE,GEOGRAPHY_NAME,CELL_NAME,MEASURES_NAME,OBS_VALUE\n\
                    E07000178,Oxford,All Ages,Value,152450\n\
                    E07000178,Oxford,All Ages,Percent,\n";
        let requested = [
            columns::AREA_CODE,
            columns::AREA_NAME,
            columns::CATEGORY,
            columns::MEASURE,
            columns::VALUE,
        ];
        let df = csv_to_frame(body, "test", &requested).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column(columns::AREA_CODE).unwrap().str().unwrap().get(0),
            Some("E07000178")
        );
        let values = df.column(columns::VALUE).unwrap().f64().unwrap();
        assert_eq!(values.get(0), Some(152450.0));
        // Suppressed cells come back blank and stay null.
        assert_eq!(values.get(1), None);
    }

    #[test]
    fn csv_parse_flags_missing_upstream_column() {
        let body = "GEOGRAPHY_CODE,OBS_VALUE\nE07000178,1\n";
        let err = csv_to_frame(body, "test", &[columns::AREA_NAME]).unwrap_err();
        assert!(err.to_string().contains("GEOGRAPHY_NAME"));
    }
}
