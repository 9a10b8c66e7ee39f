//! Variable bindings.
//!
//! Responses are matched to requests by position, so a list keeps the
//! order it was built or received in.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;

/// An OID and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Binding with a NULL value, as sent in GET and GETNEXT requests.
    pub fn null(oid: Oid) -> Self {
        Self::new(oid, Value::Null)
    }

    /// True when the value is noSuchObject, noSuchInstance or endOfMibView.
    pub fn is_exception(&self) -> bool {
        self.value.is_exception()
    }

    /// `SEQUENCE { name OBJECT IDENTIFIER, value ObjectSyntax }`
    pub fn encode(&self, buf: &mut EncodeBuf) {
        // the buffer grows backwards
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut body = decoder.read_sequence()?;
        let oid = body.read_oid()?;
        let value = Value::decode(&mut body)?;
        body.expect_end()?;
        Ok(Self::new(oid, value))
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode `SEQUENCE OF VarBind`.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| varbinds.iter().rev().for_each(|vb| vb.encode(buf)));
}

/// Decode `SEQUENCE OF VarBind`, keeping wire order.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut list = decoder.read_sequence()?;
    std::iter::from_fn(|| (!list.is_empty()).then(|| VarBind::decode(&mut list))).collect()
}
