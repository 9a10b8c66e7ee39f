//! REPORT reasons (RFC 3414 usmStats, RFC 3412 snmpUnknownSecurityModels).

use crate::oid;
use crate::oid::Oid;

/// Why a REPORT PDU was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportReason {
    UnsupportedSecLevels,
    NotInTimeWindows,
    UnknownUserNames,
    UnknownEngineIds,
    WrongDigests,
    DecryptionErrors,
    UnknownSecurityModels,
}

impl ReportReason {
    pub const ALL: [ReportReason; 7] = [
        Self::UnsupportedSecLevels,
        Self::NotInTimeWindows,
        Self::UnknownUserNames,
        Self::UnknownEngineIds,
        Self::WrongDigests,
        Self::DecryptionErrors,
        Self::UnknownSecurityModels,
    ];

    /// Counter instance OID carried in the report varbind.
    pub fn oid(self) -> Oid {
        match self {
            Self::UnsupportedSecLevels => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 1, 0),
            Self::NotInTimeWindows => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 2, 0),
            Self::UnknownUserNames => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 3, 0),
            Self::UnknownEngineIds => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 4, 0),
            Self::WrongDigests => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 5, 0),
            Self::DecryptionErrors => oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 6, 0),
            Self::UnknownSecurityModels => oid!(1, 3, 6, 1, 6, 3, 11, 2, 1, 1, 0),
        }
    }

    /// Classify a report varbind OID. The instance suffix is optional.
    pub fn from_oid(oid: &Oid) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| {
            let full = reason.oid();
            oid == &full || (full.starts_with(oid) && oid.len() + 1 == full.len())
        })
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ReportReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::UnsupportedSecLevels => "usmStatsUnsupportedSecLevels",
            Self::NotInTimeWindows => "usmStatsNotInTimeWindows",
            Self::UnknownUserNames => "usmStatsUnknownUserNames",
            Self::UnknownEngineIds => "usmStatsUnknownEngineIDs",
            Self::WrongDigests => "usmStatsWrongDigests",
            Self::DecryptionErrors => "usmStatsDecryptionErrors",
            Self::UnknownSecurityModels => "snmpUnknownSecurityModels",
        })
    }
}
