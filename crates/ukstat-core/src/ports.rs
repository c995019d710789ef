//! Collaborator interfaces consumed by the core.
//!
//! The transport layer (HTTP, JSON decoding, upstream quirks) lives
//! behind these traits; `ukstat-client` provides the real
//! implementations and tests substitute in-memory ones. Implementations
//! surface failures as [`StatError::UpstreamUnavailable`] or
//! [`StatError::UpstreamRejected`]; the core propagates those unchanged.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use ukstat_model::{AreaCode, CatalogEntry, Result};

/// Searches the upstream dataset catalog.
pub trait TableCatalog {
    /// Wildcard-prefix search; results come back in upstream order.
    fn search_tables(&self, query_prefix: &str) -> Result<Vec<CatalogEntry>>;
}

/// Fetches long-format observations from a dataset.
///
/// Returned frames carry the canonical column names of
/// [`ukstat_model::columns`]; one row per (area, category, measure).
pub trait ObservationSource {
    fn fetch_data(
        &self,
        dataset_id: &str,
        geography_codes: &[AreaCode],
        filters: &BTreeMap<String, String>,
        columns: &[&str],
    ) -> Result<DataFrame>;
}

/// Fetches a geography feature table from the boundary-lookup service.
pub trait FeatureService {
    fn fetch_feature_table(
        &self,
        endpoint_url: &str,
        where_clause: &str,
        fields: &[&str],
    ) -> Result<DataFrame>;
}
