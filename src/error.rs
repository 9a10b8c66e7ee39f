//! Error types.
//!
//! One [`Error`] enum covers the whole engine. Codec, crypto and OID failures
//! carry a small `Copy` kind enum so the common cases allocate nothing.

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;
use crate::pdu::PduType;
use crate::version::Version;

pub type Result<T> = std::result::Result<T, Error>;

/// Why USM authentication failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthErrorKind {
    #[error("no authentication key for this user")]
    NoAuthKey,
    #[error("message digest does not match")]
    HmacMismatch,
    #[error("authentication parameters are {actual} bytes, expected {expected}")]
    WrongMacLength { expected: usize, actual: usize },
    #[error("authentication parameters not found in message")]
    AuthParamsNotFound,
}

/// Why encryption or decryption failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CryptoErrorKind {
    #[error("no privacy key for this user")]
    NoPrivKey,
    #[error("key too short for cipher")]
    InvalidKeyLength,
    #[error("cipher rejected the data")]
    CipherError,
    #[error("privacy parameters are {actual} bytes, expected {expected}")]
    InvalidPrivParamsLength { expected: usize, actual: usize },
    #[error("ciphertext of {length} bytes is not a multiple of the {block_size}-byte block")]
    InvalidCiphertextLength { length: usize, block_size: usize },
}

/// What was wrong with a BER encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    #[error("tag 0x{actual:02X} where 0x{expected:02X} was expected")]
    UnexpectedTag { expected: u8, actual: u8 },
    #[error("data ends early")]
    TruncatedData,
    #[error("indefinite lengths are not accepted")]
    IndefiniteLength,
    #[error("integer does not fit 32 bits")]
    IntegerOverflow,
    #[error("integer with no content octets")]
    ZeroLengthInteger,
    #[error("malformed OID sub-identifier")]
    InvalidOidEncoding,
    #[error("unknown message version {0}")]
    UnknownVersion(i32),
    #[error("unknown PDU tag 0x{0:02X}")]
    UnknownPduType(u8),
    #[error("constructed OCTET STRING")]
    ConstructedOctetString,
    #[error("msgFlags ask for privacy without authentication")]
    InvalidMsgFlags,
    #[error("msgMaxSize {value} is below {minimum}")]
    MsgMaxSizeTooSmall { value: i32, minimum: i32 },
    #[error("msgID {value} out of range")]
    InvalidMsgId { value: i32 },
    #[error("msgFlags is {length} bytes, expected 1")]
    InvalidMsgFlagsLength { length: usize },
    #[error("NULL with content")]
    InvalidNull,
    #[error("IpAddress of {length} bytes")]
    InvalidIpAddressLength { length: usize },
    #[error("length field of {octets} octets")]
    LengthTooLong { octets: usize },
    #[error("length {length} over the {max} limit")]
    LengthExceedsMax { length: usize, max: usize },
    #[error("64-bit integer of {length} bytes")]
    Integer64TooLong { length: usize },
    #[error("value runs past the enclosing data")]
    TlvOverflow,
    #[error("{needed} bytes needed, {available} left")]
    InsufficientData { needed: usize, available: usize },
    #[error("nesting deeper than {depth}")]
    NestingTooDeep { depth: usize },
    #[error("{remaining} bytes after the message")]
    TrailingData { remaining: usize },
}

/// Why a message could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeErrorKind {
    #[error("SNMPv1 has no GETBULK")]
    GetBulkInV1,
    #[error("privacy needs an authentication protocol")]
    PrivWithoutAuth,
}

/// What was wrong with an OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OidErrorKind {
    #[error("no arcs")]
    Empty,
    #[error("arc is not a 32-bit number")]
    InvalidArc,
    #[error("first arc {0} is not 0, 1 or 2")]
    InvalidFirstArc(u32),
    #[error("second arc {second} too large under {first}")]
    InvalidSecondArc { first: u32, second: u32 },
    #[error("{count} arcs, at most {max} allowed")]
    TooManyArcs { count: usize, max: usize },
}

/// Names of error-status codes 0 through 18 (RFC 3416).
const STATUS_NAMES: [&str; 19] = [
    "noError",
    "tooBig",
    "noSuchName",
    "badValue",
    "readOnly",
    "genErr",
    "noAccess",
    "wrongType",
    "wrongLength",
    "wrongEncoding",
    "wrongValue",
    "noCreation",
    "inconsistentValue",
    "resourceUnavailable",
    "commitFailed",
    "undoFailed",
    "authorizationError",
    "notWritable",
    "inconsistentName",
];

/// The error-status field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    Unknown(i32),
}

impl ErrorStatus {
    const KNOWN: [ErrorStatus; 19] = [
        Self::NoError,
        Self::TooBig,
        Self::NoSuchName,
        Self::BadValue,
        Self::ReadOnly,
        Self::GenErr,
        Self::NoAccess,
        Self::WrongType,
        Self::WrongLength,
        Self::WrongEncoding,
        Self::WrongValue,
        Self::NoCreation,
        Self::InconsistentValue,
        Self::ResourceUnavailable,
        Self::CommitFailed,
        Self::UndoFailed,
        Self::AuthorizationError,
        Self::NotWritable,
        Self::InconsistentName,
    ];

    pub fn from_i32(value: i32) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::KNOWN.get(i).copied())
            .unwrap_or(Self::Unknown(value))
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Unknown(code) => *code,
            known => Self::KNOWN
                .iter()
                .position(|s| s == known)
                .map_or(-1, |i| i as i32),
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown({code})"),
            known => f.write_str(
                STATUS_NAMES
                    .get(known.as_i32() as usize)
                    .copied()
                    .unwrap_or("unknown"),
            ),
        }
    }
}

fn peer(target: &Option<SocketAddr>, word: &str) -> String {
    target.map(|t| format!(" {word} {t}")).unwrap_or_default()
}

/// Every failure the engine reports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Socket or file I/O failed.
    #[error("I/O error{}: {source}", peer(target, "with"))]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// No matching datagram arrived before the receive deadline.
    #[error("no answer{} within {elapsed:?} (request-id {request_id})", peer(target, "from"))]
    Timeout {
        target: Option<SocketAddr>,
        elapsed: Duration,
        request_id: i32,
    },

    /// The agent answered with a non-zero error-status.
    #[error("agent error{}: {status} at index {index}", peer(target, "from"))]
    Snmp {
        target: Option<SocketAddr>,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        /// The text that failed to parse, when there was one.
        input: Option<Box<str>>,
    },

    #[error("malformed BER at offset {offset}: {kind}")]
    Decode { offset: usize, kind: DecodeErrorKind },

    #[error("cannot encode: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Request-id (or v3 msgID) is not the one last sent.
    #[error("request-id {actual} does not match {expected}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    #[error("{actual} message where {expected} was expected")]
    VersionMismatch { expected: Version, actual: Version },

    #[error("{actual} PDU where {expected} was expected")]
    UnexpectedPduType { expected: PduType, actual: PduType },

    /// A trap receive got something that is neither a trap nor an inform.
    #[error("{actual} is not a notification")]
    NotNotification { actual: PduType },

    #[error("varbind list is empty")]
    EmptyVarBindList,

    /// Varbind added after a send without an intervening clear.
    #[error("varbind list was already sent; clear it first")]
    VarBindsLocked,

    /// The peer answered with a REPORT (SNMPv3).
    ///
    /// Engine state is already updated from the report; the caller decides
    /// whether to send again.
    #[error("REPORT{}: {oid}", peer(target, "from"))]
    ReportReceived { target: Option<SocketAddr>, oid: Oid },

    /// Authoritative engine ID is not the configured one (SNMPv3).
    #[error("unknown engine ID{}", peer(target, "from"))]
    UnknownEngineId { target: Option<SocketAddr> },

    /// The user store has no such user (SNMPv3).
    #[error("unknown user {name:?}{}", peer(target, "from"))]
    UnknownUser {
        target: Option<SocketAddr>,
        name: Box<str>,
    },

    #[error("security model {model} is not USM")]
    UnsupportedSecurityModel {
        target: Option<SocketAddr>,
        model: i32,
    },

    /// Security level below what the user requires, or above what its
    /// credentials can provide (SNMPv3).
    #[error("unsupported security level{}", peer(target, "from"))]
    UnsupportedSecLevel { target: Option<SocketAddr> },

    #[error("context name mismatch{}", peer(target, "from"))]
    ContextNameMismatch { target: Option<SocketAddr> },

    #[error("authentication failed{}: {kind}", peer(target, "from"))]
    AuthenticationFailed {
        target: Option<SocketAddr>,
        kind: AuthErrorKind,
    },

    #[error("decryption failed{}: {kind}", peer(target, "from"))]
    DecryptionFailed {
        target: Option<SocketAddr>,
        kind: CryptoErrorKind,
    },

    #[error("encryption failed: {kind}")]
    EncryptionFailed {
        target: Option<SocketAddr>,
        kind: CryptoErrorKind,
    },

    #[error("user {name:?} already exists")]
    UserExists { name: Box<str> },

    #[error("no user {name:?}")]
    UserNotFound { name: Box<str> },

    #[error("invalid {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: Box<str>,
    },

    /// A walk got an OID that does not sort after the previous one.
    #[error("agent returned {current} after {previous}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    #[cfg(feature = "serde")]
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// I/O error with no peer attached.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            target: None,
            source,
        }
    }

    pub fn auth(target: Option<SocketAddr>, kind: AuthErrorKind) -> Self {
        Self::AuthenticationFailed { target, kind }
    }

    pub fn decrypt(target: Option<SocketAddr>, kind: CryptoErrorKind) -> Self {
        Self::DecryptionFailed { target, kind }
    }

    pub fn encrypt(target: Option<SocketAddr>, kind: CryptoErrorKind) -> Self {
        Self::EncryptionFailed { target, kind }
    }

    /// OID error for a value that did not come from text.
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// OID error naming the text that failed to parse.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    pub fn config(field: &'static str, reason: impl Into<Box<str>>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// True for the malformed-length family: oversized length fields,
    /// INTEGER contents wider than 32 bits, and reads past the buffer end.
    pub fn is_malformed_length(&self) -> bool {
        matches!(
            self,
            Self::Decode {
                kind: DecodeErrorKind::LengthTooLong { .. }
                    | DecodeErrorKind::LengthExceedsMax { .. }
                    | DecodeErrorKind::IntegerOverflow
                    | DecodeErrorKind::TruncatedData
                    | DecodeErrorKind::InsufficientData { .. }
                    | DecodeErrorKind::TlvOverflow,
                ..
            }
        )
    }

    /// True if a transport receive ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Peer the failure concerns, when known.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. }
            | Self::Timeout { target, .. }
            | Self::Snmp { target, .. }
            | Self::ReportReceived { target, .. }
            | Self::UnknownEngineId { target }
            | Self::UnknownUser { target, .. }
            | Self::UnsupportedSecurityModel { target, .. }
            | Self::UnsupportedSecLevel { target }
            | Self::ContextNameMismatch { target }
            | Self::AuthenticationFailed { target, .. }
            | Self::DecryptionFailed { target, .. }
            | Self::EncryptionFailed { target, .. } => *target,
            _ => None,
        }
    }
}
