//! Census table title resolution.

use anyhow::Result;
use tracing::debug;
use ukstat_model::{CensusTableRef, StatError};

use crate::ports::TableCatalog;

/// Resolve a human-readable census table title (e.g. `"KS201EW"`) to the
/// upstream dataset identifier via a wildcard-prefix catalog search.
///
/// When the search matches more than one catalog entry, the first result
/// in upstream search order wins. A title prefix shared by several
/// tables differing only by suffix can therefore resolve to the wrong
/// one; this mirrors the upstream behaviour and is a known limitation,
/// not something this function second-guesses.
pub fn resolve(catalog: &dyn TableCatalog, title: &str) -> Result<CensusTableRef> {
    let query = format!("{}*", title.trim());
    let matches = catalog.search_tables(&query)?;

    let Some(first) = matches.first() else {
        return Err(StatError::TableNotFound {
            title: title.to_string(),
        }
        .into());
    };

    if matches.len() > 1 {
        debug!(
            title,
            matches = matches.len(),
            chosen = %first.id,
            "title matched multiple catalog entries; taking the first"
        );
    }

    Ok(CensusTableRef::new(title, first.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ukstat_model::CatalogEntry;

    struct FixedCatalog(Vec<CatalogEntry>);

    impl TableCatalog for FixedCatalog {
        fn search_tables(&self, _query_prefix: &str) -> ukstat_model::Result<Vec<CatalogEntry>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn first_match_wins() {
        let catalog = FixedCatalog(vec![
            CatalogEntry {
                id: "NM_608_1".to_string(),
                name: "KS201EW - Ethnic group".to_string(),
            },
            CatalogEntry {
                id: "NM_609_1".to_string(),
                name: "KS201EWls - Ethnic group (lsoa)".to_string(),
            },
        ]);
        let resolved = resolve(&catalog, "KS201EW").unwrap();
        assert_eq!(resolved.resolved_id, "NM_608_1");
        assert_eq!(resolved.title, "KS201EW");
    }

    #[test]
    fn empty_search_is_table_not_found() {
        let catalog = FixedCatalog(vec![]);
        let err = resolve(&catalog, "KS999EW").unwrap_err();
        let stat = err.downcast_ref::<StatError>().unwrap();
        assert!(matches!(stat, StatError::TableNotFound { .. }));
    }
}
