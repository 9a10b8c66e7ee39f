//! USM security parameters (RFC 3414 section 2.4).
//!
//! ```text
//! UsmSecurityParameters ::= SEQUENCE {
//!     msgAuthoritativeEngineID     OCTET STRING,
//!     msgAuthoritativeEngineBoots  INTEGER (0..2147483647),
//!     msgAuthoritativeEngineTime   INTEGER (0..2147483647),
//!     msgUserName                  OCTET STRING (SIZE(0..32)),
//!     msgAuthenticationParameters  OCTET STRING,
//!     msgPrivacyParameters         OCTET STRING
//! }
//! ```

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};

/// Decoded `msgSecurityParameters`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsmSecurityParams {
    pub engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
    pub username: Bytes,
    /// HMAC digest; all zeros while the message is being signed.
    pub auth_params: Bytes,
    /// Privacy salt.
    pub priv_params: Bytes,
}

impl UsmSecurityParams {
    pub fn new(
        engine_id: impl Into<Bytes>,
        engine_boots: u32,
        engine_time: u32,
        username: impl Into<Bytes>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            engine_boots,
            engine_time,
            username: username.into(),
            ..Self::default()
        }
    }

    /// Reserve a zeroed digest field of `mac_len` bytes.
    pub fn with_auth_placeholder(mut self, mac_len: usize) -> Self {
        self.auth_params = Bytes::from(vec![0u8; mac_len]);
        self
    }

    pub fn with_priv_params(mut self, priv_params: impl Into<Bytes>) -> Self {
        self.priv_params = priv_params.into();
        self
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(&self.priv_params);
            buf.push_octet_string(&self.auth_params);
            buf.push_octet_string(&self.username);
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_time.min(i32::MAX as u32));
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_boots.min(i32::MAX as u32));
            buf.push_octet_string(&self.engine_id);
        });
        buf.finish()
    }

    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let engine_id = seq.read_octet_string()?;
        let engine_boots = read_non_negative(&mut seq)?;
        let engine_time = read_non_negative(&mut seq)?;
        let username = seq.read_octet_string()?;
        let auth_params = seq.read_octet_string()?;
        let priv_params = seq.read_octet_string()?;
        seq.expect_end()?;

        Ok(Self {
            engine_id,
            engine_boots,
            engine_time,
            username,
            auth_params,
            priv_params,
        })
    }

    /// Locate the `msgAuthenticationParameters` content in an encoded v3 message.
    ///
    /// Returns `(offset, length)` relative to the start of `encoded_msg`.
    pub fn find_auth_params_offset(encoded_msg: &[u8]) -> Option<(usize, usize)> {
        let mut decoder = Decoder::from_slice(encoded_msg);
        let mut msg = decoder.read_sequence().ok()?;
        // msgVersion, msgGlobalData
        msg.skip_tlv().ok()?;
        msg.skip_tlv().ok()?;

        msg.expect_tag(tag::universal::OCTET_STRING).ok()?;
        let mut usm = msg.read_sequence().ok()?;
        // engine ID, boots, time, user name
        for _ in 0..4 {
            usm.skip_tlv().ok()?;
        }
        let len = usm.expect_tag(tag::universal::OCTET_STRING).ok()?;
        let start = usm.offset();
        (start + len <= encoded_msg.len()).then_some((start, len))
    }
}

fn read_non_negative(decoder: &mut Decoder) -> Result<u32> {
    let at = decoder.offset();
    let value = decoder.read_integer()?;
    u32::try_from(value).map_err(|_| Error::decode(at, DecodeErrorKind::IntegerOverflow))
}
