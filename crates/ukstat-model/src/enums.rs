//! Closed enumerations for request parameters.
//!
//! The upstream APIs take these as bare strings (`"n"`/`"p"`,
//! `"m"`/`"f"`/`"t"`); parsing rejects anything else up front instead of
//! letting an unrecognized value fall through to the remote call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatError;

/// Which measure survives filtering before the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputMode {
    /// Absolute counts (upstream measure label `Value`).
    Count,
    /// Percentages (upstream measure label `Percent`).
    Percent,
}

impl OutputMode {
    /// The measure label as it appears in raw observations.
    pub fn measure_label(&self) -> &'static str {
        match self {
            OutputMode::Count => "Value",
            OutputMode::Percent => "Percent",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Count => f.write_str("count"),
            OutputMode::Percent => f.write_str("percent"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n" | "count" => Ok(OutputMode::Count),
            "p" | "percent" => Ok(OutputMode::Percent),
            _ => Err(StatError::InvalidOutputMode(s.to_string())),
        }
    }
}

/// Sex dimension for population requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Total,
}

impl Sex {
    /// The Nomis `gender` dimension value.
    pub fn nomis_gender(&self) -> &'static str {
        match self {
            Sex::Total => "0",
            Sex::Male => "1",
            Sex::Female => "2",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Total => "total",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            "t" | "total" => Ok(Sex::Total),
            _ => Err(StatError::InvalidSex(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_parses_short_and_long_forms() {
        assert_eq!("n".parse::<OutputMode>().unwrap(), OutputMode::Count);
        assert_eq!("P".parse::<OutputMode>().unwrap(), OutputMode::Percent);
        assert_eq!("count".parse::<OutputMode>().unwrap(), OutputMode::Count);
    }

    #[test]
    fn output_mode_rejects_unknown_values() {
        let err = "x".parse::<OutputMode>().unwrap_err();
        assert!(matches!(err, StatError::InvalidOutputMode(_)));
    }

    #[test]
    fn sex_parses_and_rejects() {
        assert_eq!("m".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("T".parse::<Sex>().unwrap(), Sex::Total);
        assert!(matches!(
            "b".parse::<Sex>().unwrap_err(),
            StatError::InvalidSex(_)
        ));
    }

    #[test]
    fn measure_labels_match_upstream() {
        assert_eq!(OutputMode::Count.measure_label(), "Value");
        assert_eq!(OutputMode::Percent.measure_label(), "Percent");
    }
}
