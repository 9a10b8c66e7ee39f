//! SNMPv3 User-based Security Model (RFC 3414).
//!
//! - [`usm`]: security parameters carried in every v3 message
//! - [`auth`]: password-to-key, localization and HMAC digests
//! - [`privacy`]: DES-CBC and AES-128-CFB scoped PDU encryption
//! - [`report`]: REPORT reason OIDs
//!
//! Protocols are stored in the user table as small numeric codes; 0 always
//! means "none".

pub mod auth;
pub mod privacy;
pub mod report;
pub mod usm;

pub use auth::LocalizedKey;
pub use privacy::PrivKey;
pub use report::ReportReason;
pub use usm::UsmSecurityParams;

/// Unrecognized protocol name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseProtocolError {
    #[error("unknown authentication protocol {0:?} (MD5, SHA, SHA-224, SHA-256, SHA-384 or SHA-512)")]
    Auth(String),
    #[error("unknown privacy protocol {0:?} (DES or AES)")]
    Priv(String),
}

/// HMAC authentication protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuthProtocol {
    /// HMAC-MD5-96
    Md5,
    /// HMAC-SHA-96
    Sha1,
    /// HMAC-SHA-224 (RFC 7860)
    Sha224,
    /// HMAC-SHA-256 (RFC 7860)
    Sha256,
    /// HMAC-SHA-384 (RFC 7860)
    Sha384,
    /// HMAC-SHA-512 (RFC 7860)
    Sha512,
}

impl AuthProtocol {
    /// Table order is code order, starting at 1.
    const ALL: [AuthProtocol; 6] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Digest size, which is also the localized key size.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Truncated MAC carried in msgAuthenticationParameters.
    pub fn mac_len(self) -> usize {
        match self {
            Self::Md5 | Self::Sha1 => 12,
            Self::Sha224 => 16,
            Self::Sha256 => 24,
            Self::Sha384 => 32,
            Self::Sha512 => 48,
        }
    }

    /// User table code.
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|p| *p == self)
            .map_or(0, |i| i as u8 + 1)
    }

    /// Inverse of [`code`](Self::code). `Some(None)` for 0, `None` if unknown.
    pub fn from_code(code: u8) -> Option<Option<Self>> {
        match code {
            0 => Some(None),
            n => Self::ALL.get(usize::from(n) - 1).copied().map(Some),
        }
    }
}

impl std::fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        })
    }
}

impl std::str::FromStr for AuthProtocol {
    type Err = ParseProtocolError;

    /// Case-insensitive; the dash in `SHA-256` and friends is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_uppercase().replace('-', "");
        match name.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA" | "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(ParseProtocolError::Auth(s.to_string())),
        }
    }
}

/// Scoped PDU encryption protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrivProtocol {
    /// DES-CBC
    Des,
    /// AES-128-CFB (RFC 3826)
    Aes128,
}

impl PrivProtocol {
    /// Localized key bytes consumed: DES takes 8 key bytes and an 8 byte
    /// pre-IV, AES-128 takes 16 key bytes.
    pub fn key_len(self) -> usize {
        16
    }

    /// User table code: 1 = DES, 2 = AES.
    pub fn code(self) -> u8 {
        match self {
            Self::Des => 1,
            Self::Aes128 => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Option<Self>> {
        match code {
            0 => Some(None),
            1 => Some(Some(Self::Des)),
            2 => Some(Some(Self::Aes128)),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Des => "DES",
            Self::Aes128 => "AES",
        })
    }
}

impl std::str::FromStr for PrivProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "DES" => Ok(Self::Des),
            "AES" | "AES128" => Ok(Self::Aes128),
            _ => Err(ParseProtocolError::Priv(s.to_string())),
        }
    }
}
