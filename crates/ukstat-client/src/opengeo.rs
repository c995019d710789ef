//! Client for the Open Geography Portal feature services.
//!
//! Boundary lookups live behind ArcGIS `FeatureServer` layers: a query
//! returns a JSON document with one attribute map per feature. Only the
//! attributes are fetched; geometry is never requested.

use std::time::Duration;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use serde::Deserialize;
use tracing::debug;

use ukstat_core::ports::FeatureService;
use ukstat_model::StatError;

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenGeoClient {
    http: reqwest::blocking::Client,
}

impl OpenGeoClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("ukstat/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http })
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct Feature {
    attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct ServiceError {
    message: String,
}

fn query_url(endpoint_url: &str, where_clause: &str, fields: &[&str]) -> String {
    format!(
        "{}/query?where={}&outFields={}&returnGeometry=false&f=json",
        endpoint_url.trim_end_matches('/'),
        where_clause,
        fields.join(",")
    )
}

fn attribute_string(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Build a string frame from the response, one column per requested
/// field in request order.
fn features_to_frame(
    body: &str,
    url: &str,
    fields: &[&str],
) -> Result<DataFrame, ClientError> {
    let parsed: QueryResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
    if let Some(error) = parsed.error {
        return Err(ClientError::Decode {
            url: url.to_string(),
            detail: error.message,
        });
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(parsed.features.len()); fields.len()];
    for feature in &parsed.features {
        for (slot, field) in fields.iter().enumerate() {
            cells[slot].push(attribute_string(feature.attributes.get(*field)));
        }
    }

    let out = fields
        .iter()
        .zip(cells)
        .map(|(field, values)| Series::new((*field).into(), values).into_column())
        .collect();
    DataFrame::new(out).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

impl FeatureService for OpenGeoClient {
    fn fetch_feature_table(
        &self,
        endpoint_url: &str,
        where_clause: &str,
        fields: &[&str],
    ) -> ukstat_model::Result<DataFrame> {
        let url = query_url(endpoint_url, where_clause, fields);
        debug!(url, "feature service request");
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| ClientError::Http {
                url: url.clone(),
                source,
            })
            .map_err(StatError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status }.into());
        }
        let body = response
            .text()
            .map_err(|source| ClientError::Http {
                url: url.clone(),
                source,
            })
            .map_err(StatError::from)?;
        Ok(features_to_frame(&body, &url, fields)?)
    }
}
