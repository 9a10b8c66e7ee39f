//! BER encoding.
//!
//! Uses a reverse buffer: each TLV writes its content first, then prepends
//! the length and tag, so constructed lengths never need pre-computing.

use super::length::encode_length;
use super::tag;
use bytes::Bytes;

/// Buffer for BER encoding that writes backwards.
///
/// Items inside a constructed value must be pushed last-to-first.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Prepend a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Prepend bytes given in forward order.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Prepend a BER definite length.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Prepend a BER tag.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents, then wraps with length and tag.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode an INTEGER in its minimal two's-complement width.
    pub fn push_integer(&mut self, value: i32) {
        let content = minimal_integer(value);
        self.push_bytes(content.as_slice());
        self.push_length(content.len());
        self.push_tag(tag::universal::INTEGER);
    }

    /// Encode a 64-bit unsigned integer (Counter64).
    pub fn push_integer64(&mut self, value: u64) {
        let bytes = value.to_be_bytes();
        self.push_unsigned_be(tag::application::COUNTER64, &bytes);
    }

    /// Encode an unsigned 32-bit integer with a specific tag.
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        let bytes = value.to_be_bytes();
        self.push_unsigned_be(tag, &bytes);
    }

    fn push_unsigned_be(&mut self, tag: u8, bytes: &[u8]) {
        let first = bytes
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(bytes.len() - 1);
        let significant = &bytes[first..];
        self.push_bytes(significant);
        let mut len = significant.len();
        if significant[0] & 0x80 != 0 {
            // leading zero keeps the value positive
            self.push_byte(0);
            len += 1;
        }
        self.push_length(len);
        self.push_tag(tag);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tagged_bytes(tag::universal::OCTET_STRING, data);
    }

    /// Encode a primitive with arbitrary tag and raw content.
    pub fn push_tagged_bytes(&mut self, tag: u8, data: &[u8]) {
        self.push_bytes(data);
        self.push_length(data.len());
        self.push_tag(tag);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &crate::oid::Oid) {
        let ber = oid.to_ber_smallvec();
        self.push_tagged_bytes(tag::universal::OBJECT_IDENTIFIER, &ber);
    }

    /// Encode an IP address.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tagged_bytes(tag::application::IP_ADDRESS, &addr);
    }

    /// Finalize and return the encoded bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }

    /// Finalize and return as `Vec<u8>`.
    pub fn finish_vec(mut self) -> Vec<u8> {
        self.buf.reverse();
        self.buf
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Content octets of a signed INTEGER, without redundant sign bytes.
#[derive(Debug, Clone, Copy)]
pub struct IntegerContent {
    bytes: [u8; 4],
    start: usize,
}

impl IntegerContent {
    /// The significant bytes, most significant first.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    /// Width in bytes (1 to 4).
    pub fn len(&self) -> usize {
        4 - self.start
    }

    /// Always false: every integer needs at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Strip leading 0x00/0xFF bytes that the next byte's sign bit already implies.
pub fn minimal_integer(value: i32) -> IntegerContent {
    let bytes = value.to_be_bytes();
    let pad = if value < 0 { 0xFF } else { 0x00 };
    let mut start = 0;
    while start < 3 && bytes[start] == pad && (bytes[start + 1] & 0x80) == (pad & 0x80) {
        start += 1;
    }
    IntegerContent { bytes, start }
}
