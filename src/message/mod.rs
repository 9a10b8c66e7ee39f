//! SNMP message envelopes.
//!
//! - [`CommunityMessage`]: v1/v2c, `SEQUENCE { version, community, PDU }`
//! - [`V3Message`]: v3 with header data, USM parameters and a scoped PDU

mod community;
mod v3;

pub use community::CommunityMessage;
pub use v3::{
    DEFAULT_MSG_MAX_SIZE, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, USM_SECURITY_MODEL,
    V3Message, V3MessageData,
};

use crate::ber::Decoder;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::version::Version;
use bytes::Bytes;

/// Any decoded SNMP message.
#[derive(Debug, Clone)]
pub enum Message {
    Community(CommunityMessage),
    V3(V3Message),
}

impl Message {
    /// Protocol version of the message.
    pub fn version(&self) -> Version {
        match self {
            Message::Community(m) => m.version,
            Message::V3(_) => Version::V3,
        }
    }

    /// Decode a datagram, dispatching on its version field.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::UnknownVersion(version_num)))?;

        let message = match version {
            Version::V1 | Version::V2c => {
                Message::Community(CommunityMessage::decode_from_sequence(&mut seq, version)?)
            }
            Version::V3 => Message::V3(V3Message::decode_from_sequence(&mut seq)?),
        };
        seq.expect_end()?;
        Ok(message)
    }
}

impl From<CommunityMessage> for Message {
    fn from(msg: CommunityMessage) -> Self {
        Message::Community(msg)
    }
}

impl From<V3Message> for Message {
    fn from(msg: V3Message) -> Self {
        Message::V3(msg)
    }
}
