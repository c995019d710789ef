//! Country-of-birth bucket table.
//!
//! The census country-of-birth table publishes fine-grained categories
//! whose labels drift between releases. The bucketing transform takes
//! this table as an explicit, versioned value so that a new ONS category
//! is a data update here rather than a code change. Categories absent
//! from the table are omitted from every bucket (fail open) and flagged
//! at warn level by the transform.

use serde::{Deserialize, Serialize};

/// The five output buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CobBucket {
    Uk,
    Ireland,
    OtherEu,
    RestEurope,
    RestWorld,
}

impl CobBucket {
    /// Output column name for this bucket.
    pub fn column_name(&self) -> &'static str {
        match self {
            CobBucket::Uk => "uk",
            CobBucket::Ireland => "ireland",
            CobBucket::OtherEu => "other_eu",
            CobBucket::RestEurope => "rest_europe",
            CobBucket::RestWorld => "rest_world",
        }
    }

    pub const ALL: [CobBucket; 5] = [
        CobBucket::Uk,
        CobBucket::Ireland,
        CobBucket::OtherEu,
        CobBucket::RestEurope,
        CobBucket::RestWorld,
    ];
}

/// Versioned mapping from raw category label to bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CobBucketTable {
    /// Table version, named after the census release it matches.
    pub version: String,
    entries: Vec<(String, CobBucket)>,
}

impl CobBucketTable {
    pub fn new(version: impl Into<String>, entries: Vec<(String, CobBucket)>) -> Self {
        Self {
            version: version.into(),
            entries,
        }
    }

    /// The bucket table matching the 2011 Census KS204EW category labels.
    pub fn builtin_2011() -> Self {
        let entries = [
            ("Europe: United Kingdom: England", CobBucket::Uk),
            ("Europe: United Kingdom: Northern Ireland", CobBucket::Uk),
            ("Europe: United Kingdom: Scotland", CobBucket::Uk),
            ("Europe: United Kingdom: Wales", CobBucket::Uk),
            (
                "Europe: United Kingdom not otherwise specified",
                CobBucket::Uk,
            ),
            ("Europe: Channel Islands and Isle of Man", CobBucket::Uk),
            ("Europe: Ireland", CobBucket::Ireland),
            (
                "Europe: Other Europe: EU countries: Member countries in March 2001",
                CobBucket::OtherEu,
            ),
            (
                "Europe: Other Europe: EU countries: Accession countries April 2001 to March 2011",
                CobBucket::OtherEu,
            ),
            ("Europe: Other Europe: Rest of Europe", CobBucket::RestEurope),
            ("Africa", CobBucket::RestWorld),
            ("Middle East and Asia", CobBucket::RestWorld),
            ("The Americas and the Caribbean", CobBucket::RestWorld),
            ("Antarctica and Oceania", CobBucket::RestWorld),
            ("Other", CobBucket::RestWorld),
        ];
        Self::new(
            "2011-ks204ew",
            entries
                .into_iter()
                .map(|(label, bucket)| (label.to_string(), bucket))
                .collect(),
        )
    }

    /// The bucket for a raw category label, if listed.
    pub fn bucket_for(&self, category: &str) -> Option<CobBucket> {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, bucket)| *bucket)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
