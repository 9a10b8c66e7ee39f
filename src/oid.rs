//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>`, so the short OIDs SNMP deals
//! in (system group scalars, USM counters) never touch the heap.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs accepted when decoding (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an OID from arc values.
    ///
    /// ```
    /// use netman_snmp::oid::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1]);
    /// assert_eq!(oid.len(), 4);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted notation such as `"1.3.6.1.2.1.1.1.0"`.
    ///
    /// A single leading dot is tolerated (`".1.3.6"`), empty arcs are not.
    /// Arc constraints are checked separately by [`validate`](Self::validate).
    ///
    /// ```
    /// use netman_snmp::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.5.0").unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    /// assert!(Oid::parse("1..3").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: arcs.len(),
                max: MAX_OID_LEN,
            }));
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `self` begins with every arc of `prefix`.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Check arc constraints (X.690 8.19.4): arc1 in 0..=2, arc2 <= 39 unless
    /// arc1 is 2, and `arc1 * 40 + arc2` fits one 32-bit subidentifier.
    pub fn validate(&self) -> Result<()> {
        let Some(&arc1) = self.arcs.first() else {
            return Ok(());
        };
        if arc1 > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(arc1)));
        }
        if let Some(&arc2) = self.arcs.get(1)
            && ((arc1 < 2 && arc2 >= 40) || arc2 > u32::MAX - 80)
        {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first: arc1,
                second: arc2,
            }));
        }
        Ok(())
    }

    /// Encode the OID content octets.
    ///
    /// The first two arcs share one subidentifier, `arc1 * 40 + arc2`; every
    /// subidentifier is written base-128 with the continuation bit set on all
    /// but its last byte. Arcs that fail [`validate`](Self::validate) do not
    /// round-trip.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.as_slice() {
            [] => {}
            [arc1] => push_subidentifier(&mut bytes, arc1.wrapping_mul(40)),
            [arc1, arc2, rest @ ..] => {
                push_subidentifier(&mut bytes, arc1.wrapping_mul(40).wrapping_add(*arc2));
                for &arc in rest {
                    push_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Encode to BER content octets.
    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Decode BER content octets.
    ///
    /// Error offsets are relative to `data`.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        let (first, mut pos) = decode_subidentifier(data, 0)?;
        match first {
            0..40 => arcs.extend([0, first]),
            40..80 => arcs.extend([1, first - 40]),
            _ => arcs.extend([2, first - 80]),
        }

        while pos < data.len() {
            let (arc, next) = decode_subidentifier(data, pos)?;
            arcs.push(arc);
            pos = next;
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(pos, DecodeErrorKind::InvalidOidEncoding));
            }
        }

        Ok(Self { arcs })
    }
}

fn push_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = (32 - value.leading_zeros()).div_ceil(7).max(1);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Returns the subidentifier starting at `pos` and the position after it.
fn decode_subidentifier(data: &[u8], mut pos: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    loop {
        let Some(&byte) = data.get(pos) else {
            return Err(Error::decode(pos, DecodeErrorKind::TruncatedData));
        };
        if value > (u32::MAX >> 7) {
            return Err(Error::decode(pos, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        pos += 1;
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use netman_snmp::oid;
///
/// let sys_name = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
/// assert_eq!(sys_name.len(), 9);
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
        assert_eq!(Oid::parse(".1.3.6").unwrap(), oid!(1, 3, 6));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Oid::parse("").is_err());
        assert!(Oid::parse("1.3.x").is_err());
        assert!(Oid::parse("1..3").is_err());
        assert!(Oid::parse("1.3.").is_err());
    }

    #[test]
    fn test_ber_encoding() {
        assert_eq!(oid!(1, 3, 6, 1).to_ber(), vec![0x2B, 0x06, 0x01]);
        // 1.3.6.1.6.3.15.1.1.4.0 (usmStatsUnknownEngineIDs.0)
        assert_eq!(
            oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, 4, 0).to_ber(),
            vec![0x2B, 0x06, 0x01, 0x06, 0x03, 0x0F, 0x01, 0x01, 0x04, 0x00]
        );
    }

    #[test]
    fn test_multibyte_subidentifier() {
        // enterprises.8072 -> 0xBF 0x08
        let oid = oid!(1, 3, 6, 1, 4, 1, 8072);
        let ber = oid.to_ber();
        assert_eq!(&ber[ber.len() - 2..], &[0xBF, 0x08]);
        assert_eq!(Oid::from_ber(&ber).unwrap(), oid);
    }

    #[test]
    fn test_large_arcs_round_trip() {
        let oid = oid!(2, 999, u32::MAX, 0, 128);
        assert_eq!(Oid::from_ber(&oid.to_ber()).unwrap(), oid);
    }

    #[test]
    fn test_from_ber_truncated() {
        assert!(Oid::from_ber(&[0x2B, 0x86]).is_err());
    }

    #[test]
    fn test_from_ber_overflow() {
        assert!(Oid::from_ber(&[0x2B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(oid!(1, 3, 6).validate().is_ok());
        assert!(oid!(3, 0).validate().is_err());
        assert!(oid!(0, 40).validate().is_err());
        assert!(oid!(2, 999).validate().is_ok());
        assert!(oid!(2, u32::MAX - 80).validate().is_ok());
        assert!(oid!(2, u32::MAX - 79).validate().is_err());
    }

    #[test]
    fn test_ordering_and_prefix() {
        let sys = oid!(1, 3, 6, 1, 2, 1, 1);
        let descr = sys.child(1).child(0);
        assert!(descr.starts_with(&sys));
        assert!(!sys.starts_with(&descr));
        assert!(sys < descr);
        assert!(oid!(1, 3, 6, 1, 2, 1, 1, 9) > descr);
    }
}
