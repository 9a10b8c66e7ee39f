//! SNMP Protocol Data Units (PDUs).
//!
//! Every PDU except the v1 trap shares one body layout:
//! `request-id, error-status, error-index, VarBindList`, wrapped in a
//! context-specific constructed tag that names the operation. GETBULK
//! reuses the two error fields for non-repeaters and max-repetitions.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
    SetRequest = tag::pdu::SET_REQUEST,
    TrapV1 = tag::pdu::TRAP_V1,
    GetBulkRequest = tag::pdu::GET_BULK_REQUEST,
    InformRequest = tag::pdu::INFORM_REQUEST,
    TrapV2 = tag::pdu::TRAP_V2,
    Report = tag::pdu::REPORT,
}

impl PduType {
    /// Map a tag byte to a PDU type.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP_V1 => Some(Self::TrapV1),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            tag::pdu::INFORM_REQUEST => Some(Self::InformRequest),
            tag::pdu::TRAP_V2 => Some(Self::TrapV2),
            tag::pdu::REPORT => Some(Self::Report),
            _ => None,
        }
    }

    /// The tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// True for the unconfirmed and confirmed notification types.
    pub fn is_notification(self) -> bool {
        matches!(self, Self::TrapV1 | Self::TrapV2 | Self::InformRequest)
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetRequest => "GetRequest",
            Self::GetNextRequest => "GetNextRequest",
            Self::Response => "Response",
            Self::SetRequest => "SetRequest",
            Self::TrapV1 => "TrapV1",
            Self::GetBulkRequest => "GetBulkRequest",
            Self::InformRequest => "InformRequest",
            Self::TrapV2 => "TrapV2",
            Self::Report => "Report",
        };
        f.write_str(name)
    }
}

/// GETBULK repetition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkParams {
    /// Leading varbinds fetched once with GETNEXT semantics.
    pub non_repeaters: i32,
    /// Successors fetched for each remaining varbind.
    pub max_repetitions: i32,
}

impl Default for BulkParams {
    /// No non-repeaters, ten repetitions.
    fn default() -> Self {
        Self::new(0, 10)
    }
}

impl BulkParams {
    pub fn new(non_repeaters: i32, max_repetitions: i32) -> Self {
        Self {
            non_repeaters,
            max_repetitions,
        }
    }
}

/// Generic PDU body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    /// Error status, or non-repeaters for GETBULK.
    pub error_status: i32,
    /// Error index, or max-repetitions for GETBULK.
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Build a request body.
    pub fn request(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Build a GETBULK body.
    pub fn get_bulk(request_id: i32, bulk: BulkParams, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: bulk.non_repeaters,
            error_index: bulk.max_repetitions,
            varbinds,
        }
    }

    /// Build a REPORT body carrying one reason counter.
    pub fn report(request_id: i32, reason: Oid, counter: u32) -> Self {
        Self::request(
            PduType::Report,
            request_id,
            vec![VarBind::new(reason, crate::value::Value::Counter32(counter))],
        )
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Decode from BER.
    ///
    /// The v1 trap body has a different layout and is rejected.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let at = decoder.offset();
        let tag = decoder.read_tag()?;
        let pdu_type = match PduType::from_tag(tag) {
            Some(PduType::TrapV1) | None => {
                return Err(Error::decode(at, DecodeErrorKind::UnknownPduType(tag)));
            }
            Some(t) => t,
        };

        let len = decoder.read_length()?;
        let mut body = decoder.sub_decoder(len)?;

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = decode_varbind_list(&mut body)?;
        body.expect_end()?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// True if the agent reported an error.
    pub fn is_error(&self) -> bool {
        self.pdu_type != PduType::GetBulkRequest && self.error_status != 0
    }

    /// Error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// Acknowledgement for an inform: same request-id and varbinds.
    pub fn to_response(&self) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: 0,
            error_index: 0,
            varbinds: self.varbinds.clone(),
        }
    }

    /// The i-th varbind, if present.
    pub fn varbind(&self, index: usize) -> Option<&VarBind> {
        self.varbinds.get(index)
    }
}
