//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Covers the X.690 subset SNMP needs: INTEGER, OCTET STRING, NULL,
//! OBJECT IDENTIFIER, SEQUENCE, the SNMP application types and the
//! context-specific PDU tags. Only definite lengths are accepted.
//!
//! Decoding is driven by the caller: each position in an SNMP message has
//! a known expected type, so the [`Decoder`] offers typed reads
//! (`read_integer`, `read_oid`, ...) rather than a self-describing parse.
//! [`crate::value::Value::decode`] is the one place that dispatches on
//! the tag byte.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
pub use tag::*;
