//! Geography-code classification.
//!
//! Classification is what spares callers from knowing which upstream
//! series covers which geography: the small-area population estimates
//! only exist for England & Wales from 2011, while local authorities and
//! larger geographies are covered UK-wide back to 1991, and nothing in a
//! bare code advertises which side it falls on.

use std::collections::BTreeMap;

use tracing::debug;
use ukstat_model::{AreaCode, CensusFamily, EntityTypeEntry, PopulationSource, Result, StatError};
use ukstat_standards::GeographyKey;

/// The outcome of classifying a batch of area codes.
///
/// Input order is preserved; either partition may be empty.
#[derive(Debug, Clone)]
pub struct Classification {
    entries: Vec<(AreaCode, EntityTypeEntry)>,
}

impl Classification {
    /// Codes covered by the small-area population estimates.
    pub fn small_area(&self) -> Vec<&AreaCode> {
        self.by_source(PopulationSource::SmallAreaBased)
    }

    /// Codes covered by the local-authority population estimates.
    pub fn local_authority(&self) -> Vec<&AreaCode> {
        self.by_source(PopulationSource::LocalAuthorityBased)
    }

    fn by_source(&self, source: PopulationSource) -> Vec<&AreaCode> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.population_source() == source)
            .map(|(code, _)| code)
            .collect()
    }

    /// Mapping from each input code to its population source.
    pub fn sources(&self) -> BTreeMap<AreaCode, PopulationSource> {
        self.entries
            .iter()
            .map(|(code, entry)| (code.clone(), entry.population_source()))
            .collect()
    }

    pub fn source_for(&self, code: &AreaCode) -> Option<PopulationSource> {
        self.entry_for(code).map(EntityTypeEntry::population_source)
    }

    pub fn census_family_for(&self, code: &AreaCode) -> Option<CensusFamily> {
        self.entry_for(code).map(EntityTypeEntry::census_family)
    }

    pub fn entry_for(&self, code: &AreaCode) -> Option<&EntityTypeEntry> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, entry)| entry)
    }

    /// All classified codes in input order.
    pub fn codes(&self) -> impl Iterator<Item = &AreaCode> {
        self.entries.iter().map(|(code, _)| code)
    }

    /// Code and entity-type pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = &(AreaCode, EntityTypeEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classify a batch of area codes against the entity-type key.
///
/// Fails with [`StatError::UnknownAreaCode`] listing *every* code whose
/// prefix is absent from the key, so one bad code in a batch is reported
/// alongside any others instead of aborting at the first.
pub fn classify(key: &GeographyKey, codes: &[AreaCode]) -> Result<Classification> {
    let mut entries = Vec::with_capacity(codes.len());
    let mut unknown = Vec::new();

    for code in codes {
        match key.entry_for(code) {
            Some(entry) => entries.push((code.clone(), entry.clone())),
            None => unknown.push(code.to_string()),
        }
    }

    if !unknown.is_empty() {
        return Err(StatError::UnknownAreaCode { codes: unknown });
    }

    let classification = Classification { entries };
    debug!(
        total = classification.len(),
        small_area = classification.small_area().len(),
        local_authority = classification.local_authority().len(),
        "classified area codes"
    );
    Ok(classification)
}
