//! Loaders for the user-supplied reference lookups: the
//! constituency-to-region key and the local-authority merge history.
//!
//! Both are plain CSVs maintained outside the crate; loading validates
//! headers up front so a stale or reordered file fails loudly instead of
//! producing silently wrong joins.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StandardsError;

/// One row of the constituency-to-region key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituencyRegion {
    pub constituency_code: String,
    pub constituency_name: String,
    pub region_code: String,
    pub region_name: String,
}

/// Westminster constituencies do not nest inside regions in any dataset
/// the upstream APIs expose; this best-fit key supplies the mapping.
#[derive(Debug, Clone, Default)]
pub struct ConstituencyRegionKey {
    rows: Vec<ConstituencyRegion>,
}

impl ConstituencyRegionKey {
    pub fn from_csv_path(path: &Path) -> Result<Self, StandardsError> {
        let mut reader = open_checked(
            path,
            &[
                "constituency_code",
                "constituency_name",
                "region_code",
                "region_name",
            ],
        )?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: ConstituencyRegion = record.map_err(|e| StandardsError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            rows.push(row);
        }
        rows.sort_by(|a, b| a.constituency_code.cmp(&b.constituency_code));
        Ok(Self { rows })
    }

    pub fn region_for(&self, constituency_code: &str) -> Option<&ConstituencyRegion> {
        self.rows
            .iter()
            .find(|r| r.constituency_code == constituency_code)
    }

    pub fn rows(&self) -> &[ConstituencyRegion] {
        &self.rows
    }
}

/// One local-authority merge: a former district absorbed into a
/// successor authority in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub former_code: String,
    pub former_name: String,
    pub successor_code: String,
    pub successor_name: String,
    pub year: i32,
}

/// History of local-authority reorganisations.
///
/// Classification never rewrites codes through this table; it is exposed
/// so callers querying years after a merge can substitute the successor
/// code themselves.
#[derive(Debug, Clone, Default)]
pub struct MergeHistory {
    records: Vec<MergeRecord>,
}

impl MergeHistory {
    pub fn from_csv_path(path: &Path) -> Result<Self, StandardsError> {
        let mut reader = open_checked(
            path,
            &[
                "former_code",
                "former_name",
                "successor_code",
                "successor_name",
                "year",
            ],
        )?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            let row: MergeRecord = record.map_err(|e| StandardsError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            records.push(row);
        }
        records.sort_by(|a, b| a.former_code.cmp(&b.former_code));
        Ok(Self { records })
    }

    /// The successor authority for `code` if it was merged away in or
    /// before `year`. Codes still current for `year` return `None`.
    pub fn successor_for(&self, code: &str, year: i32) -> Option<&MergeRecord> {
        self.records
            .iter()
            .find(|r| r.former_code == code && r.year <= year)
    }

    pub fn records(&self) -> &[MergeRecord] {
        &self.records
    }
}

fn open_checked(
    path: &Path,
    required: &[&str],
) -> Result<csv::Reader<std::fs::File>, StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| StandardsError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let headers = reader
        .headers()
        .map_err(|e| StandardsError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(reader)
}
