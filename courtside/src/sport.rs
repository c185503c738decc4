//! Sports supported by fields and tournaments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A sport played on a field or in a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Volleyball,
    Basketball,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Football, Sport::Volleyball, Sport::Basketball];

    /// Database and wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Volleyball => "volleyball",
            Sport::Basketball => "basketball",
        }
    }

    /// League points awarded to the winner of a match
    pub fn win_points(self) -> u32 {
        match self {
            Sport::Football => 3,
            Sport::Volleyball | Sport::Basketball => 2,
        }
    }

    /// League points awarded to each side of a drawn match
    pub fn draw_points(self) -> u32 {
        match self {
            Sport::Football => 1,
            Sport::Volleyball | Sport::Basketball => 0,
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted string names no known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Sport {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "football" => Ok(Sport::Football),
            "volleyball" => Ok(Sport::Volleyball),
            "basketball" => Ok(Sport::Basketball),
            other => Err(UnknownVariant {
                kind: "sport",
                value: other.to_string(),
            }),
        }
    }
}
