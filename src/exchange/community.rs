//! SNMPv1/v2c exchanges.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

use super::{DEFAULT_TIMEOUT, Outgoing};
use crate::error::{EncodeErrorKind, Error, Result};
use crate::message::CommunityMessage;
use crate::notification::Notification;
use crate::oid::Oid;
use crate::pdu::{BulkParams, Pdu, PduType};
use crate::session::Session;
use crate::transport::{RecvFilter, Transport};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// A community-authenticated request/response exchange.
#[derive(Debug)]
pub struct CommunityExchange {
    version: Version,
    community: Bytes,
    timeout: Duration,
    outgoing: Outgoing,
    last_request_id: Option<i32>,
    response: Option<Pdu>,
}

impl CommunityExchange {
    /// Exchange for `version`, which must be v1 or v2c.
    pub fn new(version: Version, community: impl Into<Bytes>) -> Result<Self> {
        if version == Version::V3 {
            return Err(Error::config("version", "community exchanges are v1 or v2c"));
        }
        Ok(Self::with_version(version, community.into()))
    }

    pub fn v1(community: impl Into<Bytes>) -> Self {
        Self::with_version(Version::V1, community.into())
    }

    pub fn v2c(community: impl Into<Bytes>) -> Self {
        Self::with_version(Version::V2c, community.into())
    }

    fn with_version(version: Version, community: Bytes) -> Self {
        Self {
            version,
            community,
            timeout: DEFAULT_TIMEOUT,
            outgoing: Outgoing::default(),
            last_request_id: None,
            response: None,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn community(&self) -> &[u8] {
        &self.community
    }

    /// Set the receive timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Append a binding. Fails after a send until [`clear`](Self::clear).
    pub fn add_varbind(&mut self, oid: Oid, value: Value) -> Result<()> {
        self.outgoing.add(oid, value)
    }

    /// Outgoing bindings.
    pub fn varbinds(&self) -> &[VarBind] {
        self.outgoing.varbinds()
    }

    /// Reset for reuse.
    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.last_request_id = None;
        self.response = None;
    }

    /// Request-id of the last send.
    pub fn last_request_id(&self) -> Option<i32> {
        self.last_request_id
    }

    /// Send the varbind list as a `pdu_type` request, returning its request-id.
    ///
    /// Nothing is transmitted when the list is empty. A GETBULK sent this way
    /// uses [`BulkParams::default`]; see [`send_bulk_request`](Self::send_bulk_request).
    pub async fn send_request<T: Transport>(
        &mut self,
        session: &Session,
        pdu_type: PduType,
        transport: &T,
        dest: SocketAddr,
    ) -> Result<i32> {
        if pdu_type == PduType::GetBulkRequest {
            return self
                .send_bulk_request(session, BulkParams::default(), transport, dest)
                .await;
        }
        let varbinds = self.outgoing.take_for_send()?;
        let request_id = session.next_request_id();
        self.send_pdu(Pdu::request(pdu_type, request_id, varbinds), transport, dest)
            .await
    }

    /// Send a GETBULK request. SNMPv1 has no GETBULK.
    pub async fn send_bulk_request<T: Transport>(
        &mut self,
        session: &Session,
        bulk: BulkParams,
        transport: &T,
        dest: SocketAddr,
    ) -> Result<i32> {
        if self.version == Version::V1 {
            return Err(Error::encode(EncodeErrorKind::GetBulkInV1));
        }
        let varbinds = self.outgoing.take_for_send()?;
        let request_id = session.next_request_id();
        self.send_pdu(Pdu::get_bulk(request_id, bulk, varbinds), transport, dest)
            .await
    }

    async fn send_pdu<T: Transport>(&mut self, pdu: Pdu, transport: &T, dest: SocketAddr) -> Result<i32> {
        let request_id = pdu.request_id;
        let pdu_type = pdu.pdu_type;
        let data = CommunityMessage::new(self.version, self.community.clone(), pdu).encode();

        self.last_request_id = Some(request_id);
        self.response = None;

        tracing::trace!(target: "netman_snmp::exchange", { snmp.target = %dest, snmp.request_id = request_id, snmp.pdu_type = %pdu_type, snmp.bytes = data.len() }, "sending request");
        transport.send_to(&data, dest).await?;
        Ok(request_id)
    }

    /// Receive and validate the response to the last request.
    ///
    /// The PDU type must be `expected` and the request-id must match the
    /// last send; anything else fails the call.
    pub async fn recv_response<T: Transport>(
        &mut self,
        transport: &T,
        filter: RecvFilter,
        expected: PduType,
    ) -> Result<&Pdu> {
        let expected_id = self.last_request_id.unwrap_or(0);
        let (data, source) = transport
            .recv_from(filter, self.timeout)
            .await
            .map_err(|e| with_request_id(e, expected_id))?;
        let msg = CommunityMessage::decode(data)?;

        if msg.version != self.version {
            return Err(Error::VersionMismatch {
                expected: self.version,
                actual: msg.version,
            });
        }
        if msg.pdu.pdu_type != expected {
            return Err(Error::UnexpectedPduType {
                expected,
                actual: msg.pdu.pdu_type,
            });
        }
        if msg.pdu.request_id != expected_id {
            tracing::debug!(target: "netman_snmp::exchange", { snmp.source = %source, snmp.request_id = msg.pdu.request_id, expected = expected_id }, "request-id mismatch");
            return Err(Error::RequestIdMismatch {
                expected: expected_id,
                actual: msg.pdu.request_id,
            });
        }

        tracing::trace!(target: "netman_snmp::exchange", { snmp.source = %source, snmp.request_id = expected_id, snmp.varbinds = msg.pdu.varbinds.len() }, "response accepted");
        Ok(self.response.insert(msg.pdu))
    }

    /// Receive a Trap(v2) or InformRequest. Informs are acknowledged to their origin.
    pub async fn recv_trap<T: Transport>(
        &mut self,
        transport: &T,
        filter: RecvFilter,
    ) -> Result<Notification> {
        let (data, origin) = transport.recv_from(filter, self.timeout).await?;
        let msg = CommunityMessage::decode(data)?;

        let pdu_type = msg.pdu.pdu_type;
        if !matches!(pdu_type, PduType::TrapV2 | PduType::InformRequest) {
            return Err(Error::NotNotification { actual: pdu_type });
        }

        if pdu_type == PduType::InformRequest {
            let ack = CommunityMessage::new(msg.version, msg.community.clone(), msg.pdu.to_response());
            tracing::trace!(target: "netman_snmp::exchange", { snmp.target = %origin, snmp.request_id = msg.pdu.request_id }, "acknowledging inform");
            transport.send_to(&ack.encode(), origin).await?;
        }

        self.response = Some(msg.pdu.clone());
        Ok(Notification {
            origin,
            version: msg.version,
            pdu: msg.pdu,
        })
    }

    /// The last accepted response or notification.
    pub fn response(&self) -> Option<&Pdu> {
        self.response.as_ref()
    }

    /// The i-th binding of the last response.
    pub fn varbind(&self, index: usize) -> Option<&VarBind> {
        self.response.as_ref()?.varbind(index)
    }
}

pub(crate) fn with_request_id(err: Error, request_id: i32) -> Error {
    match err {
        Error::Timeout {
            target, elapsed, ..
        } => Error::Timeout {
            target,
            elapsed,
            request_id,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::transport::MockTransport;

    fn agent() -> SocketAddr {
        "192.0.2.1:161".parse().unwrap()
    }

    fn response_bytes(version: Version, request_id: i32, pdu_type: PduType) -> Bytes {
        let pdu = Pdu::request(
            pdu_type,
            request_id,
            vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router"))],
        );
        CommunityMessage::new(version, "public", pdu).encode()
    }

    #[test]
    fn test_new_checks_version() {
        let ex = CommunityExchange::new(Version::V1, "private").unwrap();
        assert_eq!(ex.version(), Version::V1);
        assert_eq!(ex.community(), b"private");
        assert_eq!(ex.timeout(), DEFAULT_TIMEOUT);
        assert!(ex.last_request_id().is_none());
        assert!(matches!(
            CommunityExchange::new(Version::V3, "public"),
            Err(Error::InvalidConfig { field: "version", .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_list_not_sent() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v2c("public");
        let err = ex
            .send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyVarBindList));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_unencodable_oid_refused() {
        let mut ex = CommunityExchange::v2c("public");
        assert!(matches!(
            ex.add_varbind(oid!(3, 6, 1), Value::Null),
            Err(Error::InvalidOid { .. })
        ));
        assert!(ex.add_varbind(oid!(1, 40, 1), Value::Null).is_err());
        assert!(ex.varbinds().is_empty());
    }

    #[tokio::test]
    async fn test_add_after_send_locked_until_clear() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v1("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Null).unwrap();
        ex.send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap();

        assert!(matches!(
            ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::Null),
            Err(Error::VarBindsLocked)
        ));
        ex.clear();
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::Null).unwrap();
    }

    #[tokio::test]
    async fn test_request_response() {
        let transport = MockTransport::with_responder(|data, target| {
            let msg = CommunityMessage::decode(Bytes::copy_from_slice(data)).unwrap();
            vec![(response_bytes(msg.version, msg.pdu.request_id, PduType::Response), target)]
        });
        let session = Session::new();
        let mut ex = CommunityExchange::v2c("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null).unwrap();

        let id = ex
            .send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap();
        assert_eq!(id, 1);
        let pdu = ex
            .recv_response(&transport, RecvFilter::from_addr(agent()), PduType::Response)
            .await
            .unwrap();
        assert_eq!(pdu.varbinds.len(), 1);
        assert_eq!(ex.varbind(0).unwrap().value.as_str(), Some("router"));
        assert!(ex.varbind(1).is_none());
    }

    #[tokio::test]
    async fn test_request_id_mismatch_is_fatal() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v2c("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null).unwrap();
        ex.send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap();

        transport.push_inbound(response_bytes(Version::V2c, 99, PduType::Response), agent());
        let err = ex
            .recv_response(&transport, RecvFilter::any(), PduType::Response)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RequestIdMismatch {
                expected: 1,
                actual: 99
            }
        ));
    }

    #[tokio::test]
    async fn test_unexpected_type_and_garbage() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v2c("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null).unwrap();
        ex.send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap();

        transport.push_inbound(response_bytes(Version::V2c, 1, PduType::Report), agent());
        assert!(matches!(
            ex.recv_response(&transport, RecvFilter::any(), PduType::Response)
                .await,
            Err(Error::UnexpectedPduType { .. })
        ));

        transport.push_inbound(Bytes::from_static(&[0x30, 0x84, 0xFF]), agent());
        assert!(matches!(
            ex.recv_response(&transport, RecvFilter::any(), PduType::Response)
                .await,
            Err(Error::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_carries_request_id() {
        let transport = MockTransport::new();
        let session = Session::with_initial_request_id(40);
        let mut ex = CommunityExchange::v2c("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null).unwrap();
        ex.send_request(&session, PduType::GetRequest, &transport, agent())
            .await
            .unwrap();
        let err = ex
            .recv_response(&transport, RecvFilter::any(), PduType::Response)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { request_id: 40, .. }));
    }

    #[tokio::test]
    async fn test_bulk_rejected_for_v1() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v1("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2), Value::Null).unwrap();
        let err = ex
            .send_bulk_request(&session, BulkParams::new(0, 10), &transport, agent())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::GetBulkInV1
            }
        ));
    }

    #[tokio::test]
    async fn test_bulk_fields_on_wire() {
        let transport = MockTransport::new();
        let session = Session::new();
        let mut ex = CommunityExchange::v2c("public");
        ex.add_varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2), Value::Null).unwrap();
        ex.send_bulk_request(&session, BulkParams::new(1, 20), &transport, agent())
            .await
            .unwrap();

        let (data, _) = &transport.sent()[0];
        let msg = CommunityMessage::decode(data.clone()).unwrap();
        assert_eq!(msg.pdu.pdu_type, PduType::GetBulkRequest);
        assert_eq!(msg.pdu.error_status, 1);
        assert_eq!(msg.pdu.error_index, 20);
    }

    #[tokio::test]
    async fn test_inform_acknowledged() {
        let transport = MockTransport::new();
        let origin: SocketAddr = "192.0.2.50:49152".parse().unwrap();
        let inform = Pdu::request(
            PduType::InformRequest,
            321,
            vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(9))],
        );
        transport.push_inbound(CommunityMessage::new(Version::V2c, "public", inform).encode(), origin);

        let mut ex = CommunityExchange::v2c("public");
        let notification = ex.recv_trap(&transport, RecvFilter::any()).await.unwrap();
        assert!(notification.is_inform());
        assert_eq!(notification.origin, origin);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, origin);
        let ack = CommunityMessage::decode(sent[0].0.clone()).unwrap();
        assert_eq!(ack.pdu.pdu_type, PduType::Response);
        assert_eq!(ack.pdu.request_id, 321);
    }

    #[tokio::test]
    async fn test_recv_trap_rejects_response() {
        let transport = MockTransport::new();
        transport.push_inbound(response_bytes(Version::V2c, 5, PduType::Response), agent());
        let mut ex = CommunityExchange::v2c("public");
        assert!(matches!(
            ex.recv_trap(&transport, RecvFilter::any()).await,
            Err(Error::NotNotification {
                actual: PduType::Response
            })
        ));
        assert!(transport.sent().is_empty());
    }
}
