//! SNMP protocol versions.

use std::str::FromStr;

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Version {
    /// SNMPv1 (RFC 1157)
    V1,
    /// SNMPv2c (RFC 1901)
    #[default]
    V2c,
    /// SNMPv3 (RFC 3411-3418)
    V3,
}

impl Version {
    /// The msgVersion field value.
    pub const fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
            Version::V3 => 3,
        }
    }

    /// Map a msgVersion field value.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            3 => Some(Version::V3),
            _ => None,
        }
    }

    /// True for the community-based versions.
    pub const fn is_community(self) -> bool {
        matches!(self, Version::V1 | Version::V2c)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "SNMPv1"),
            Version::V2c => write!(f, "SNMPv2c"),
            Version::V3 => write!(f, "SNMPv3"),
        }
    }
}

/// Unrecognized version text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SNMP version {0:?} (expected 1, 2c or 3)")]
pub struct ParseVersionError(String);

impl FromStr for Version {
    type Err = ParseVersionError;

    /// Accepts `1`, `2`, `2c`, `3`, optionally prefixed with `v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.strip_prefix('v').unwrap_or(&lower) {
            "1" => Ok(Version::V1),
            "2" | "2c" => Ok(Version::V2c),
            "3" => Ok(Version::V3),
            _ => Err(ParseVersionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        for v in [Version::V1, Version::V2c, Version::V3] {
            assert_eq!(Version::from_i32(v.as_i32()), Some(v));
        }
        assert_eq!(Version::from_i32(2), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2c".parse::<Version>().unwrap(), Version::V2c);
        assert_eq!("v1".parse::<Version>().unwrap(), Version::V1);
        assert_eq!("2".parse::<Version>().unwrap(), Version::V2c);
        assert_eq!("V3".parse::<Version>().unwrap(), Version::V3);
        assert!("4".parse::<Version>().is_err());
    }
}
