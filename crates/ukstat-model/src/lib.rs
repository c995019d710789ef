pub mod catalog;
pub mod codes;
pub mod columns;
pub mod enums;
pub mod error;

pub use catalog::{CatalogEntry, CensusTableRef};
pub use codes::{
    AreaCode, CensusFamily, Coverage, EntityTypeEntry, Granularity, PopulationSource,
};
pub use enums::{OutputMode, Sex};
pub use error::{Result, StatError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_entry_routes_by_granularity() {
        let ward = EntityTypeEntry {
            prefix: "E05".to_string(),
            type_name: "Electoral ward".to_string(),
            granularity: Granularity::Ward,
            coverage: Coverage::England,
        };
        assert_eq!(ward.population_source(), PopulationSource::SmallAreaBased);
        assert_eq!(ward.census_family(), CensusFamily::EnglandWales);

        let council = EntityTypeEntry {
            prefix: "S12".to_string(),
            type_name: "Council area".to_string(),
            granularity: Granularity::LocalAuthority,
            coverage: Coverage::Scotland,
        };
        assert_eq!(
            council.population_source(),
            PopulationSource::LocalAuthorityBased
        );
        assert_eq!(council.census_family(), CensusFamily::UkWide);
    }

    #[test]
    fn errors_serialize_context() {
        let err = StatError::UnknownAreaCode {
            codes: vec!["X99000001".to_string(), "Q00000000".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("X99000001"));
        assert!(msg.contains("Q00000000"));
    }
}
