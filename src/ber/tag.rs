//! Identifier octets used by SNMP.
//!
//! All SNMP tags fit in one octet: class in bits 7-6, the constructed flag
//! in bit 5, the number in bits 4-0.

const APPLICATION: u8 = 0x40;
const CONTEXT: u8 = 0x80;
const CONSTRUCTED: u8 = 0x20;

/// ASN.1 universal types.
pub mod universal {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
    /// Segmented OCTET STRING. Never produced by agents and refused on decode.
    pub const OCTET_STRING_CONSTRUCTED: u8 = 0x24;
}

/// SMIv2 application types.
pub mod application {
    use super::APPLICATION;

    pub const IP_ADDRESS: u8 = APPLICATION;
    pub const COUNTER32: u8 = APPLICATION | 1;
    /// Gauge32 and Unsigned32 share a tag.
    pub const GAUGE32: u8 = APPLICATION | 2;
    pub const TIMETICKS: u8 = APPLICATION | 3;
    pub const OPAQUE: u8 = APPLICATION | 4;
    pub const COUNTER64: u8 = APPLICATION | 6;
}

/// Exception values that stand in for a varbind value (SNMPv2).
pub mod context {
    use super::CONTEXT;

    pub const NO_SUCH_OBJECT: u8 = CONTEXT;
    pub const NO_SUCH_INSTANCE: u8 = CONTEXT | 1;
    pub const END_OF_MIB_VIEW: u8 = CONTEXT | 2;
}

/// PDU types: context-specific and constructed, numbered 0 to 8.
pub mod pdu {
    const fn pdu(number: u8) -> u8 {
        super::CONTEXT | super::CONSTRUCTED | number
    }

    pub const GET_REQUEST: u8 = pdu(0);
    pub const GET_NEXT_REQUEST: u8 = pdu(1);
    pub const RESPONSE: u8 = pdu(2);
    pub const SET_REQUEST: u8 = pdu(3);
    pub const TRAP_V1: u8 = pdu(4);
    pub const GET_BULK_REQUEST: u8 = pdu(5);
    pub const INFORM_REQUEST: u8 = pdu(6);
    pub const TRAP_V2: u8 = pdu(7);
    pub const REPORT: u8 = pdu(8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(pdu::GET_REQUEST, 0xA0);
        assert_eq!(pdu::GET_BULK_REQUEST, 0xA5);
        assert_eq!(pdu::TRAP_V2, 0xA7);
        assert_eq!(pdu::REPORT, 0xA8);
        assert_eq!(application::TIMETICKS, 0x43);
        assert_eq!(application::COUNTER64, 0x46);
        assert_eq!(context::END_OF_MIB_VIEW, 0x82);
    }
}
