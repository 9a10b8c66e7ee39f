//! SNMPv3 message envelope (RFC 3412).
//!
//! ```text
//! SEQUENCE {
//!     msgVersion            INTEGER (3)
//!     msgGlobalData         SEQUENCE { msgID, msgMaxSize, msgFlags, msgSecurityModel }
//!     msgSecurityParameters OCTET STRING (BER-encoded USM parameters)
//!     msgData               ScopedPdu | OCTET STRING (encrypted)
//! }
//! ```

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;

/// Security model number of USM.
pub const USM_SECURITY_MODEL: i32 = 3;

/// Largest message we advertise: the UDP payload limit.
pub const DEFAULT_MSG_MAX_SIZE: i32 = 65507;

const MSG_MAX_SIZE_MINIMUM: i32 = 484;

const FLAG_AUTH: u8 = 0x01;
const FLAG_PRIV: u8 = 0x02;
const FLAG_REPORTABLE: u8 = 0x04;

/// Authentication and privacy combination of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SecurityLevel {
    #[default]
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl SecurityLevel {
    /// Level from the low two flag bits. Privacy without authentication is invalid.
    pub fn from_flags(flags: u8) -> Option<Self> {
        match (flags & FLAG_AUTH != 0, flags & FLAG_PRIV != 0) {
            (false, false) => Some(Self::NoAuthNoPriv),
            (true, false) => Some(Self::AuthNoPriv),
            (true, true) => Some(Self::AuthPriv),
            (false, true) => None,
        }
    }

    pub fn to_flags(self) -> u8 {
        match self {
            Self::NoAuthNoPriv => 0,
            Self::AuthNoPriv => FLAG_AUTH,
            Self::AuthPriv => FLAG_AUTH | FLAG_PRIV,
        }
    }

    pub fn requires_auth(self) -> bool {
        self != Self::NoAuthNoPriv
    }

    pub fn requires_priv(self) -> bool {
        self == Self::AuthPriv
    }
}

/// The one-byte `msgFlags` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsgFlags {
    pub security_level: SecurityLevel,
    pub reportable: bool,
}

impl MsgFlags {
    pub fn new(security_level: SecurityLevel, reportable: bool) -> Self {
        Self {
            security_level,
            reportable,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(Self {
            security_level: SecurityLevel::from_flags(byte)?,
            reportable: byte & FLAG_REPORTABLE != 0,
        })
    }

    pub fn to_byte(self) -> u8 {
        let mut flags = self.security_level.to_flags();
        if self.reportable {
            flags |= FLAG_REPORTABLE;
        }
        flags
    }
}

/// Header data (`msgGlobalData`).
///
/// The security model is kept raw so a receiver can report an unknown
/// model instead of failing the decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgGlobalData {
    pub msg_id: i32,
    pub msg_max_size: i32,
    pub msg_flags: MsgFlags,
    pub msg_security_model: i32,
}

impl MsgGlobalData {
    /// Header for a USM message with the default maximum size.
    pub fn new(msg_id: i32, msg_flags: MsgFlags) -> Self {
        Self {
            msg_id,
            msg_max_size: DEFAULT_MSG_MAX_SIZE,
            msg_flags,
            msg_security_model: USM_SECURITY_MODEL,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_integer(self.msg_security_model);
            buf.push_octet_string(&[self.msg_flags.to_byte()]);
            buf.push_integer(self.msg_max_size);
            buf.push_integer(self.msg_id);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let msg_id = seq.read_integer()?;
        if msg_id < 0 {
            return Err(Error::decode(at, DecodeErrorKind::InvalidMsgId { value: msg_id }));
        }

        let at = seq.offset();
        let msg_max_size = seq.read_integer()?;
        if msg_max_size < MSG_MAX_SIZE_MINIMUM {
            return Err(Error::decode(
                at,
                DecodeErrorKind::MsgMaxSizeTooSmall {
                    value: msg_max_size,
                    minimum: MSG_MAX_SIZE_MINIMUM,
                },
            ));
        }

        let at = seq.offset();
        let flags = seq.read_octet_string()?;
        if flags.len() != 1 {
            return Err(Error::decode(
                at,
                DecodeErrorKind::InvalidMsgFlagsLength { length: flags.len() },
            ));
        }
        let msg_flags = MsgFlags::from_byte(flags[0])
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::InvalidMsgFlags))?;

        let msg_security_model = seq.read_integer()?;
        seq.expect_end()?;

        Ok(Self {
            msg_id,
            msg_max_size,
            msg_flags,
            msg_security_model,
        })
    }
}

/// Context identification plus the PDU (`ScopedPDU`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedPdu {
    pub context_engine_id: Bytes,
    pub context_name: Bytes,
    pub pdu: Pdu,
}

impl ScopedPdu {
    pub fn new(
        context_engine_id: impl Into<Bytes>,
        context_name: impl Into<Bytes>,
        pdu: Pdu,
    ) -> Self {
        Self {
            context_engine_id: context_engine_id.into(),
            context_name: context_name.into(),
            pdu,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.context_name);
            buf.push_octet_string(&self.context_engine_id);
        });
    }

    /// Standalone encoding, the plaintext input to encryption.
    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let context_engine_id = seq.read_octet_string()?;
        let context_name = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;
        seq.expect_end()?;

        Ok(Self {
            context_engine_id,
            context_name,
            pdu,
        })
    }

    /// Decode decrypted plaintext.
    ///
    /// Block ciphers pad the plaintext, so bytes after the SEQUENCE are ignored.
    pub fn decode_plaintext(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        Self::decode(&mut decoder)
    }
}

/// `msgData`: plaintext or encrypted scoped PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum V3MessageData {
    Plaintext(ScopedPdu),
    Encrypted(Bytes),
}

/// A complete SNMPv3 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Message {
    pub global_data: MsgGlobalData,
    /// BER-encoded USM security parameters.
    pub security_params: Bytes,
    pub data: V3MessageData,
}

impl V3Message {
    pub fn new(global_data: MsgGlobalData, security_params: Bytes, scoped_pdu: ScopedPdu) -> Self {
        Self {
            global_data,
            security_params,
            data: V3MessageData::Plaintext(scoped_pdu),
        }
    }

    pub fn new_encrypted(
        global_data: MsgGlobalData,
        security_params: Bytes,
        encrypted: Bytes,
    ) -> Self {
        Self {
            global_data,
            security_params,
            data: V3MessageData::Encrypted(encrypted),
        }
    }

    pub fn msg_id(&self) -> i32 {
        self.global_data.msg_id
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.global_data.msg_flags.security_level
    }

    pub fn is_reportable(&self) -> bool {
        self.global_data.msg_flags.reportable
    }

    pub fn scoped_pdu(&self) -> Option<&ScopedPdu> {
        match &self.data {
            V3MessageData::Plaintext(scoped) => Some(scoped),
            V3MessageData::Encrypted(_) => None,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            match &self.data {
                V3MessageData::Plaintext(scoped) => scoped.encode(buf),
                V3MessageData::Encrypted(ciphertext) => buf.push_octet_string(ciphertext),
            }
            buf.push_octet_string(&self.security_params);
            self.global_data.encode(buf);
            buf.push_integer(3);
        });

        buf.finish()
    }

    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let version = seq.read_integer()?;
        if version != 3 {
            return Err(Error::decode(at, DecodeErrorKind::UnknownVersion(version)));
        }

        let msg = Self::decode_from_sequence(&mut seq)?;
        seq.expect_end()?;
        Ok(msg)
    }

    pub(crate) fn decode_from_sequence(seq: &mut Decoder) -> Result<Self> {
        let global_data = MsgGlobalData::decode(seq)?;
        let security_params = seq.read_octet_string()?;

        let data = if global_data.msg_flags.security_level.requires_priv() {
            V3MessageData::Encrypted(seq.read_octet_string()?)
        } else {
            V3MessageData::Plaintext(ScopedPdu::decode(seq)?)
        };

        Ok(Self {
            global_data,
            security_params,
            data,
        })
    }
}
