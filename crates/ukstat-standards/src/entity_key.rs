//! The ONS entity-type key: entity prefix to geography type.
//!
//! The key ships embedded in the crate and is parsed once per process;
//! it changes only when ONS registers a new entity type.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use ukstat_model::{AreaCode, EntityTypeEntry};

use crate::error::StandardsError;

const ENTITY_TYPES_CSV: &str = include_str!("../data/entity_types.csv");

static BUILTIN: OnceLock<GeographyKey> = OnceLock::new();

/// Read-only lookup from three-character entity prefix to type entry.
#[derive(Debug, Clone)]
pub struct GeographyKey {
    entries: BTreeMap<String, EntityTypeEntry>,
}

impl GeographyKey {
    /// The embedded key, parsed on first use.
    pub fn builtin() -> &'static GeographyKey {
        BUILTIN.get_or_init(|| {
            parse_entity_types(ENTITY_TYPES_CSV.as_bytes(), Path::new("entity_types.csv"))
                .expect("embedded entity-type key parses")
        })
    }

    /// Load a key from an external CSV with the same schema as the
    /// embedded one (`prefix,type_name,granularity,coverage`).
    pub fn from_csv_path(path: &Path) -> Result<Self, StandardsError> {
        let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
        parse_entity_types(&bytes, path)
    }

    /// Look up the entity type for a prefix.
    pub fn get(&self, prefix: &str) -> Option<&EntityTypeEntry> {
        self.entries.get(prefix)
    }

    /// Look up the entity type for an area code's prefix.
    pub fn entry_for(&self, code: &AreaCode) -> Option<&EntityTypeEntry> {
        self.entries.get(code.prefix())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityTypeEntry> {
        self.entries.values()
    }
}

fn parse_entity_types(bytes: &[u8], path: &Path) -> Result<GeographyKey, StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| StandardsError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();

    for required in ["prefix", "type_name", "granularity", "coverage"] {
        if !headers.iter().any(|h| h == required) {
            return Err(StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }

    let mut entries = BTreeMap::new();
    for row in reader.records() {
        let row = row.map_err(|e| StandardsError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let get = |name: &str| -> String {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| row.get(i))
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        let prefix = get("prefix");
        if prefix.len() != 3 {
            return Err(StandardsError::InvalidValue {
                path: path.to_path_buf(),
                message: format!("entity prefix '{prefix}' must be 3 characters"),
            });
        }

        let granularity =
            get("granularity")
                .parse()
                .map_err(|message| StandardsError::InvalidValue {
                    path: path.to_path_buf(),
                    message,
                })?;
        let coverage = get("coverage")
            .parse()
            .map_err(|message| StandardsError::InvalidValue {
                path: path.to_path_buf(),
                message,
            })?;

        entries.insert(
            prefix.clone(),
            EntityTypeEntry {
                prefix,
                type_name: get("type_name"),
                granularity,
                coverage,
            },
        );
    }

    Ok(GeographyKey { entries })
}
