//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: single byte, bit 8=0, value 0-127
//! - Long form: initial byte (bit 8=1, bits 7-1=count), followed by up to 4 length bytes
//! - Indefinite form (0x80): rejected

use crate::error::{DecodeErrorKind, Error, Result};

/// Largest length accepted while decoding.
///
/// Messages on the wire are a few hundred bytes to a few KB; 2MB is a
/// sanity bound against hostile length fields.
pub const MAX_LENGTH: usize = 0x200000;

/// Encode a length value (returns bytes in reverse order for prepending).
///
/// Uses short form for lengths <= 127, long form otherwise.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= 127 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut count = 0;
    let mut rest = len;
    while rest > 0 && count < 4 {
        buf[count] = rest as u8;
        rest >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Decode a length from bytes, returning (length, bytes_consumed).
///
/// `base_offset` is the position of `data[0]` in the enclosing buffer and
/// is only used for error reporting.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;

    if num_octets > 4 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + num_octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        assert_eq!(decode_length(&[0], 0).unwrap(), (0, 1));
        assert_eq!(decode_length(&[127], 0).unwrap(), (127, 1));
        assert_eq!(decode_length(&[1], 0).unwrap(), (1, 1));
    }

    #[test]
    fn test_long_form() {
        assert_eq!(decode_length(&[0x81, 128], 0).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0x81, 255], 0).unwrap(), (255, 2));
        assert_eq!(decode_length(&[0x82, 0x01, 0x00], 0).unwrap(), (256, 3));
        assert_eq!(decode_length(&[0x82, 0xFF, 0xFF], 0).unwrap(), (65535, 3));
    }

    #[test]
    fn test_indefinite_rejected() {
        let err = decode_length(&[0x80], 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::IndefiniteLength,
                ..
            }
        ));
    }

    #[test]
    fn test_length_of_length_over_four_octets() {
        let err = decode_length(&[0x85, 0, 0, 0, 0, 1], 10).unwrap_err();
        assert!(err.is_malformed_length());
        assert!(matches!(err, Error::Decode { offset: 10, .. }));
    }

    #[test]
    fn test_truncated_long_form() {
        let err = decode_length(&[0x82, 0x01], 0).unwrap_err();
        assert!(err.is_malformed_length());
        assert!(decode_length(&[], 0).is_err());
    }

    #[test]
    fn test_encode_short() {
        let (buf, len) = encode_length(0);
        assert_eq!(&buf[..len], &[0]);

        let (buf, len) = encode_length(127);
        assert_eq!(&buf[..len], &[127]);
    }

    #[test]
    fn test_encode_long() {
        let (buf, len) = encode_length(128);
        assert_eq!(&buf[..len], &[128, 0x81]);

        let (buf, len) = encode_length(256);
        assert_eq!(&buf[..len], &[0, 1, 0x82]);

        let (buf, len) = encode_length(0x01_00_00);
        assert_eq!(&buf[..len], &[0, 0, 1, 0x83]);
    }

    #[test]
    fn test_accept_non_minimal_length() {
        assert_eq!(decode_length(&[0x82, 0x00, 0x05], 0).unwrap(), (5, 3));
        assert_eq!(decode_length(&[0x81, 0x01], 0).unwrap(), (1, 2));
        assert_eq!(decode_length(&[0x83, 0x00, 0x00, 0x80], 0).unwrap(), (128, 4));
    }

    #[test]
    fn test_max_length_enforced() {
        let max = MAX_LENGTH;
        let max_bytes = [0x83, (max >> 16) as u8, (max >> 8) as u8, max as u8];
        assert_eq!(decode_length(&max_bytes, 0).unwrap(), (MAX_LENGTH, 4));

        let over = MAX_LENGTH + 1;
        let over_bytes = [
            0x84,
            (over >> 24) as u8,
            (over >> 16) as u8,
            (over >> 8) as u8,
            over as u8,
        ];
        let err = decode_length(&over_bytes, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::LengthExceedsMax { .. },
                ..
            }
        ));
    }
}
