//! Consistency policy applied to every newly built connection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which members reads may be served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadPreference {
    /// Only the primary
    #[default]
    Primary,

    /// The primary, falling back to a secondary when it is unavailable
    PrimaryPreferred,

    /// Only secondaries
    Secondary,

    /// A secondary, falling back to the primary
    SecondaryPreferred,

    /// Lowest latency member regardless of role
    Nearest,
}

impl ReadPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPreference::Primary => "primary",
            ReadPreference::PrimaryPreferred => "primary_preferred",
            ReadPreference::Secondary => "secondary",
            ReadPreference::SecondaryPreferred => "secondary_preferred",
            ReadPreference::Nearest => "nearest",
        }
    }
}

impl fmt::Display for ReadPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "primary" => Ok(ReadPreference::Primary),
            "primary_preferred" => Ok(ReadPreference::PrimaryPreferred),
            "secondary" => Ok(ReadPreference::Secondary),
            "secondary_preferred" => Ok(ReadPreference::SecondaryPreferred),
            "nearest" => Ok(ReadPreference::Nearest),
            other => Err(format!("unknown read preference '{}'", other)),
        }
    }
}

/// Acknowledgement level requested for writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteConcern {
    /// Fire and forget
    Unacknowledged,

    /// Acknowledged by the primary
    #[default]
    Acknowledged,

    /// Acknowledged after the primary's journal commit
    Journaled,

    /// Acknowledged by a majority of members
    Majority,
}

impl WriteConcern {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteConcern::Unacknowledged => "unacknowledged",
            WriteConcern::Acknowledged => "acknowledged",
            WriteConcern::Journaled => "journaled",
            WriteConcern::Majority => "majority",
        }
    }
}

impl fmt::Display for WriteConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteConcern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unacknowledged" => Ok(WriteConcern::Unacknowledged),
            "acknowledged" | "normal" => Ok(WriteConcern::Acknowledged),
            "journaled" => Ok(WriteConcern::Journaled),
            "majority" => Ok(WriteConcern::Majority),
            other => Err(format!("unknown write concern '{}'", other)),
        }
    }
}

/// Read preference and write concern handed to the connection factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionPolicy {
    #[serde(default)]
    pub read_preference: ReadPreference,

    #[serde(default)]
    pub write_concern: WriteConcern,
}

impl ConnectionPolicy {
    pub fn new(read_preference: ReadPreference, write_concern: WriteConcern) -> Self {
        Self {
            read_preference,
            write_concern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ConnectionPolicy::default();
        assert_eq!(policy.read_preference, ReadPreference::Primary);
        assert_eq!(policy.write_concern, WriteConcern::Acknowledged);
    }

    #[test]
    fn test_read_preference_parsing() {
        assert_eq!("primary".parse::<ReadPreference>().unwrap(), ReadPreference::Primary);
        assert_eq!(
            "secondary-preferred".parse::<ReadPreference>().unwrap(),
            ReadPreference::SecondaryPreferred
        );
        assert_eq!("NEAREST".parse::<ReadPreference>().unwrap(), ReadPreference::Nearest);
        assert!("fastest".parse::<ReadPreference>().is_err());
    }

    #[test]
    fn test_write_concern_parsing() {
        assert_eq!("normal".parse::<WriteConcern>().unwrap(), WriteConcern::Acknowledged);
        assert_eq!("majority".parse::<WriteConcern>().unwrap(), WriteConcern::Majority);
        assert!("twice".parse::<WriteConcern>().is_err());
    }

    #[test]
    fn test_display_matches_serde_names() {
        for pref in [
            ReadPreference::Primary,
            ReadPreference::PrimaryPreferred,
            ReadPreference::Secondary,
            ReadPreference::SecondaryPreferred,
            ReadPreference::Nearest,
        ] {
            let json = serde_json::to_string(&pref).unwrap();
            assert_eq!(json, format!("\"{}\"", pref));
            assert_eq!(pref.to_string().parse::<ReadPreference>().unwrap(), pref);
        }
    }
}
