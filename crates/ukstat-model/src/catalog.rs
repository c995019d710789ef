//! Census table catalog references.

use serde::{Deserialize, Serialize};

/// One entry returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Upstream dataset identifier (e.g. `"NM_608_1"`).
    pub id: String,
    /// Full dataset name as listed in the catalog.
    pub name: String,
}

/// A resolved census table: the human-readable ONS title plus the
/// upstream dataset identifier it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusTableRef {
    /// ONS table title, e.g. `"KS201EW"`.
    pub title: String,
    /// Upstream dataset identifier obtained from the catalog search.
    pub resolved_id: String,
}

impl CensusTableRef {
    pub fn new(title: impl Into<String>, resolved_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            resolved_id: resolved_id.into(),
        }
    }
}
