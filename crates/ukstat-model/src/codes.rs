//! ONS geographic area codes and the entity-type key entries that
//! classify them.
//!
//! Every statistical geography in the UK carries a nine-character code
//! whose first three characters (the *entity prefix*) identify the
//! geography type: `E12` is an English region, `W06` a Welsh principal
//! area, `S92` the nation of Scotland, and so on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A nine-character ONS area code (e.g. `"E07000178"`).
///
/// Construction does not validate the prefix against the entity-type key;
/// classification does, so that unknown codes are reported together rather
/// than one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaCode(String);

impl AreaCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The three-character entity prefix, or the whole code if shorter.
    pub fn prefix(&self) -> &str {
        self.0.get(..3).unwrap_or(&self.0)
    }

    /// True if the code has the standard nine-character shape.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 9 && self.0.chars().skip(1).all(|c| c.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AreaCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Geography granularity, ordered smallest to largest.
///
/// The ordering is what routes population requests: anything strictly
/// smaller than a local authority is only covered by the small-area
/// population estimates (England & Wales, 2011 onwards); local authorities
/// and larger geographies are covered by the UK-wide series back to 1991.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Granularity {
    /// Census Output Area, the smallest published unit.
    OutputArea,
    /// Lower layer Super Output Area.
    Lsoa,
    /// Middle layer Super Output Area.
    Msoa,
    /// Electoral ward or division.
    Ward,
    /// Civil parish or community.
    Parish,
    /// Built Up Area / Built Up Area Sub-division.
    BuiltUpArea,
    /// Local authority district, unitary authority, borough.
    LocalAuthority,
    /// County or combined authority.
    County,
    /// Westminster parliamentary constituency.
    Constituency,
    /// Region (former GOR); England only.
    Region,
    /// Constituent nation (England, Wales, Scotland, Northern Ireland).
    Nation,
    /// United Kingdom / England & Wales aggregates.
    Country,
}

impl Granularity {
    /// True for geographies strictly smaller than a local authority.
    pub fn is_small_area(&self) -> bool {
        *self < Granularity::LocalAuthority
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::OutputArea => "output_area",
            Granularity::Lsoa => "lsoa",
            Granularity::Msoa => "msoa",
            Granularity::Ward => "ward",
            Granularity::Parish => "parish",
            Granularity::BuiltUpArea => "built_up_area",
            Granularity::LocalAuthority => "local_authority",
            Granularity::County => "county",
            Granularity::Constituency => "constituency",
            Granularity::Region => "region",
            Granularity::Nation => "nation",
            Granularity::Country => "country",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "output_area" => Ok(Granularity::OutputArea),
            "lsoa" => Ok(Granularity::Lsoa),
            "msoa" => Ok(Granularity::Msoa),
            "ward" => Ok(Granularity::Ward),
            "parish" => Ok(Granularity::Parish),
            "built_up_area" => Ok(Granularity::BuiltUpArea),
            "local_authority" => Ok(Granularity::LocalAuthority),
            "county" => Ok(Granularity::County),
            "constituency" => Ok(Granularity::Constituency),
            "region" => Ok(Granularity::Region),
            "nation" => Ok(Granularity::Nation),
            "country" => Ok(Granularity::Country),
            _ => Err(format!("Unknown granularity: {s}")),
        }
    }
}

/// Territorial coverage of a geography type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
    England,
    Wales,
    Scotland,
    NorthernIreland,
    EnglandWales,
    GreatBritain,
    UnitedKingdom,
}

impl Coverage {
    /// Which census table family covers this geography.
    ///
    /// The Key Statistics tables (`KS...EW`) cover England & Wales only;
    /// Scotland and Northern Ireland publish their own equivalents, so
    /// anything reaching beyond England and Wales uses the UK-wide family.
    pub fn census_family(&self) -> CensusFamily {
        match self {
            Coverage::England | Coverage::Wales | Coverage::EnglandWales => {
                CensusFamily::EnglandWales
            }
            Coverage::Scotland
            | Coverage::NorthernIreland
            | Coverage::GreatBritain
            | Coverage::UnitedKingdom => CensusFamily::UkWide,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Coverage::England => "England",
            Coverage::Wales => "Wales",
            Coverage::Scotland => "Scotland",
            Coverage::NorthernIreland => "Northern Ireland",
            Coverage::EnglandWales => "England and Wales",
            Coverage::GreatBritain => "Great Britain",
            Coverage::UnitedKingdom => "United Kingdom",
        }
    }
}

impl std::str::FromStr for Coverage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "england" => Ok(Coverage::England),
            "wales" => Ok(Coverage::Wales),
            "scotland" => Ok(Coverage::Scotland),
            "northern ireland" => Ok(Coverage::NorthernIreland),
            "england and wales" => Ok(Coverage::EnglandWales),
            "great britain" => Ok(Coverage::GreatBritain),
            "united kingdom" => Ok(Coverage::UnitedKingdom),
            _ => Err(format!("Unknown coverage: {s}")),
        }
    }
}

/// Census table family, selected per area by [`Coverage::census_family`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CensusFamily {
    /// England & Wales Key Statistics tables (suffix `EW`).
    EnglandWales,
    /// UK-wide harmonised tables.
    UkWide,
}

/// Which upstream population series covers an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationSource {
    /// Small-area population estimates: England & Wales only, 2011 onwards.
    SmallAreaBased,
    /// Local-authority population estimates: UK-wide, 1991 onwards.
    LocalAuthorityBased,
}

/// One row of the static entity-type key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeEntry {
    /// Three-character entity prefix (e.g. `"E12"`).
    pub prefix: String,
    /// Human-readable geography type name.
    pub type_name: String,
    pub granularity: Granularity,
    pub coverage: Coverage,
}

impl EntityTypeEntry {
    /// The population series that covers this geography type.
    pub fn population_source(&self) -> PopulationSource {
        if self.granularity.is_small_area() {
            PopulationSource::SmallAreaBased
        } else {
            PopulationSource::LocalAuthorityBased
        }
    }

    /// The census table family that covers this geography type.
    pub fn census_family(&self) -> CensusFamily {
        self.coverage.census_family()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_first_three_characters() {
        assert_eq!(AreaCode::new("E07000178").prefix(), "E07");
        assert_eq!(AreaCode::new("W1").prefix(), "W1");
    }

    #[test]
    fn well_formed_requires_nine_characters() {
        assert!(AreaCode::new("E07000178").is_well_formed());
        assert!(!AreaCode::new("E07").is_well_formed());
        assert!(!AreaCode::new("E07X00178").is_well_formed());
    }

    #[test]
    fn granularity_ordering_routes_population_source() {
        assert!(Granularity::OutputArea.is_small_area());
        assert!(Granularity::Ward.is_small_area());
        assert!(Granularity::BuiltUpArea.is_small_area());
        assert!(!Granularity::LocalAuthority.is_small_area());
        assert!(!Granularity::Nation.is_small_area());
    }

    #[test]
    fn census_family_follows_coverage() {
        assert_eq!(Coverage::Wales.census_family(), CensusFamily::EnglandWales);
        assert_eq!(Coverage::Scotland.census_family(), CensusFamily::UkWide);
        assert_eq!(Coverage::UnitedKingdom.census_family(), CensusFamily::UkWide);
    }
}
