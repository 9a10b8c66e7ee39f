//! Decoded SNMP values.
//!
//! [`Value`] is the closed set of BER values the engine understands. Code
//! that consumes a response matches on it exhaustively instead of probing
//! types at run time.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::util::encode_hex;
use bytes::Bytes;

/// Deepest SEQUENCE nesting accepted inside a value.
pub const MAX_NESTING: usize = 16;

/// A BER value as carried in a varbind or a generic SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed 32-bit INTEGER.
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// NULL, the placeholder value of GET-style requests.
    Null,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// SEQUENCE of values.
    Sequence(Vec<Value>),
    /// IpAddress (application 0).
    IpAddress([u8; 4]),
    /// Counter32 (application 1).
    Counter32(u32),
    /// Gauge32 / Unsigned32 (application 2).
    Gauge32(u32),
    /// TimeTicks in hundredths of a second (application 3).
    TimeTicks(u32),
    /// Opaque (application 4).
    Opaque(Bytes),
    /// Counter64 (application 6).
    Counter64(u64),
    /// v2c exception: the object does not exist.
    NoSuchObject,
    /// v2c exception: the instance does not exist.
    NoSuchInstance,
    /// v2c exception: no further objects in the view.
    EndOfMibView,
    /// Any other tag, kept verbatim.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// Integer content, for INTEGER only.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned content of Counter32, Gauge32, TimeTicks and non-negative INTEGER.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Raw bytes of OCTET STRING and Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(data) | Value::Opaque(data) => Some(data),
            _ => None,
        }
    }

    /// OCTET STRING content as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(data) => std::str::from_utf8(data).ok(),
            _ => None,
        }
    }

    /// OID content.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// True for noSuchObject, noSuchInstance and endOfMibView.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::Sequence(items) => buf.push_sequence(|buf| {
                for item in items.iter().rev() {
                    item.encode(buf);
                }
            }),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => buf.push_tagged_bytes(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => buf.push_tagged_bytes(tag::context::NO_SUCH_OBJECT, &[]),
            Value::NoSuchInstance => buf.push_tagged_bytes(tag::context::NO_SUCH_INSTANCE, &[]),
            Value::EndOfMibView => buf.push_tagged_bytes(tag::context::END_OF_MIB_VIEW, &[]),
            Value::Unknown { tag: t, data } => buf.push_tagged_bytes(*t, data),
        }
    }

    /// Encode to a standalone BER byte string.
    pub fn to_ber(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    /// Decode one TLV, advancing the decoder past it.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        Self::decode_nested(decoder, 0)
    }

    fn decode_nested(decoder: &mut Decoder, depth: usize) -> Result<Self> {
        let start = decoder.offset();
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        let value = match tag {
            tag::universal::INTEGER => Value::Integer(decoder.read_integer_value(len)?),
            tag::universal::OCTET_STRING => Value::OctetString(decoder.read_bytes(len)?),
            tag::universal::NULL => {
                if len != 0 {
                    return Err(Error::decode(start, DecodeErrorKind::InvalidNull));
                }
                Value::Null
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Value::ObjectIdentifier(decoder.read_oid_value(len)?)
            }
            tag::universal::SEQUENCE => {
                if depth >= MAX_NESTING {
                    return Err(Error::decode(
                        start,
                        DecodeErrorKind::NestingTooDeep { depth: MAX_NESTING },
                    ));
                }
                let mut seq = decoder.sub_decoder(len)?;
                let mut items = Vec::new();
                while !seq.is_empty() {
                    items.push(Self::decode_nested(&mut seq, depth + 1)?);
                }
                Value::Sequence(items)
            }
            tag::universal::OCTET_STRING_CONSTRUCTED => {
                return Err(Error::decode(
                    start,
                    DecodeErrorKind::ConstructedOctetString,
                ));
            }
            tag::application::IP_ADDRESS => {
                if len != 4 {
                    return Err(Error::decode(
                        start,
                        DecodeErrorKind::InvalidIpAddressLength { length: len },
                    ));
                }
                let data = decoder.read_bytes(4)?;
                Value::IpAddress([data[0], data[1], data[2], data[3]])
            }
            tag::application::COUNTER32 => Value::Counter32(decoder.read_unsigned32_value(len)?),
            tag::application::GAUGE32 => Value::Gauge32(decoder.read_unsigned32_value(len)?),
            tag::application::TIMETICKS => Value::TimeTicks(decoder.read_unsigned32_value(len)?),
            tag::application::OPAQUE => Value::Opaque(decoder.read_bytes(len)?),
            tag::application::COUNTER64 => Value::Counter64(decoder.read_integer64_value(len)?),
            tag::context::NO_SUCH_OBJECT => {
                decoder.read_bytes(len)?;
                Value::NoSuchObject
            }
            tag::context::NO_SUCH_INSTANCE => {
                decoder.read_bytes(len)?;
                Value::NoSuchInstance
            }
            tag::context::END_OF_MIB_VIEW => {
                decoder.read_bytes(len)?;
                Value::EndOfMibView
            }
            other => Value::Unknown {
                tag: other,
                data: decoder.read_bytes(len)?,
            },
        };

        Ok(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => f.write_str(s),
                Err(_) => write!(f, "0x{}", encode_hex(data)),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::Sequence(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
            Value::IpAddress(addr) => write!(f, "{}", std::net::Ipv4Addr::from(*addr)),
            Value::Counter32(v) | Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                write!(
                    f,
                    "{}d {}h {}m {}s",
                    secs / 86400,
                    (secs % 86400) / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
            Value::Opaque(data) => write!(f, "Opaque(0x{})", encode_hex(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
            Value::Unknown { tag, data } => {
                write!(f, "Unknown(tag=0x{:02X}, data=0x{})", tag, encode_hex(data))
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}
