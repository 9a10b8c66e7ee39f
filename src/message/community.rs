//! Community-based SNMP message format (v1/v2c).
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`, with
//! version 0 for v1 and 1 for v2c.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// A v1 or v2c message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });

        buf.finish()
    }

    /// Decode a complete datagram.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::UnknownVersion(version_num)))?;

        let msg = Self::decode_from_sequence(&mut seq, version)?;
        seq.expect_end()?;
        Ok(msg)
    }

    pub(crate) fn decode_from_sequence(seq: &mut Decoder, version: Version) -> Result<Self> {
        if version == Version::V3 {
            return Err(Error::decode(
                seq.offset(),
                DecodeErrorKind::UnknownVersion(version.as_i32()),
            ));
        }

        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(seq)?;

        Ok(CommunityMessage {
            version,
            community,
            pdu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::PduType;
    use crate::varbind::VarBind;

    fn get(request_id: i32) -> Pdu {
        Pdu::request(
            PduType::GetRequest,
            request_id,
            vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))],
        )
    }

    #[test]
    fn test_v1_wire_prefix() {
        let bytes = CommunityMessage::new(Version::V1, "public", get(1)).encode();
        // SEQUENCE, len, INTEGER 0, OCTET STRING "public"
        assert_eq!(bytes[0], 0x30);
        assert_eq!(&bytes[2..13], &[0x02, 0x01, 0x00, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c']);
        assert_eq!(bytes[13], 0xA0);
    }

    #[test]
    fn test_version_preserved() {
        for version in [Version::V1, Version::V2c] {
            let msg = CommunityMessage::new(version, "private", get(123));
            let decoded = CommunityMessage::decode(msg.encode()).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut bytes = CommunityMessage::new(Version::V2c, "public", get(9))
            .encode()
            .to_vec();
        // grow the outer SEQUENCE by one byte of junk
        bytes[1] += 1;
        bytes.push(0x00);
        assert!(CommunityMessage::decode(Bytes::from(bytes)).is_err());
    }
}
