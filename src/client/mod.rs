//! High-level request client.
//!
//! [`Client`] wraps one transport, one target and one exchange object and
//! turns them into plain `get`/`get_next`/`get_bulk`/`set` calls and a
//! subtree [`walk`](Client::walk). Requests on a client are serialized: a
//! second call waits until the first has its answer or has failed.
//!
//! For SNMPv3 the client performs discovery transparently. When the first
//! request of an exchange is answered with an `unknownEngineIDs` or
//! `notInTimeWindows` REPORT, the learned engine state is applied and the
//! request is sent once more.

mod builder;
mod walk;

pub use builder::{CommunityClientBuilder, UsmClientBuilder};
pub use walk::Walk;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::exchange::{CommunityExchange, EngineState, UsmExchange};
use crate::oid::Oid;
use crate::pdu::{BulkParams, Pdu, PduType};
use crate::session::Session;
use crate::transport::{RecvFilter, Transport};
use crate::user_store::UserStore;
use crate::v3::ReportReason;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

enum Exchange {
    Community(CommunityExchange),
    Usm {
        exchange: UsmExchange,
        store: Arc<UserStore>,
    },
}

struct ClientInner<T> {
    transport: T,
    target: SocketAddr,
    session: Session,
    exchange: Mutex<Exchange>,
}

/// Request client for one agent.
///
/// Cheap to clone; clones share the transport, session and exchange.
pub struct Client<T: Transport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("target", &self.inner.target)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Client<T> {
    /// SNMPv1/v2c client.
    pub fn community(
        transport: T,
        target: SocketAddr,
        version: Version,
        community: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut exchange = CommunityExchange::new(version, community)?;
        exchange.set_timeout(timeout);
        Ok(Self::new(transport, target, Exchange::Community(exchange)))
    }

    /// SNMPv3 client for `user`, whose credentials live in `store`.
    ///
    /// An empty `engine_id` is discovered on the first request.
    pub fn usm(
        transport: T,
        target: SocketAddr,
        store: Arc<UserStore>,
        user: impl Into<String>,
        engine_id: impl Into<Bytes>,
        context_name: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Self> {
        let user = user.into();
        store.get_user(&user)?;
        let mut exchange = UsmExchange::new(engine_id, context_name, user);
        exchange.set_timeout(timeout);
        Ok(Self::new(transport, target, Exchange::Usm { exchange, store }))
    }

    /// Client built from manager settings.
    ///
    /// With `user` set the client speaks SNMPv3 and takes the engine ID and
    /// context name from `config`; otherwise it speaks SNMPv2c with the
    /// configured community. The target port is `config.snmp_port`.
    pub fn from_config(
        transport: T,
        host: std::net::IpAddr,
        config: &ManagerConfig,
        store: Arc<UserStore>,
        user: Option<&str>,
    ) -> Result<Self> {
        config.validate()?;
        let target = SocketAddr::new(host, config.snmp_port);
        match user {
            Some(user) => Self::usm(
                transport,
                target,
                store,
                user,
                config.engine_id_bytes()?,
                config.context_name_bytes(),
                config.timeout(),
            ),
            None => Self::community(
                transport,
                target,
                Version::V2c,
                config.community_bytes(),
                config.timeout(),
            ),
        }
    }

    fn new(transport: T, target: SocketAddr, exchange: Exchange) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                target,
                session: Session::new(),
                exchange: Mutex::new(exchange),
            }),
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.inner.target
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Protocol version this client speaks.
    pub async fn version(&self) -> Version {
        match &*self.inner.exchange.lock().await {
            Exchange::Community(ex) => ex.version(),
            Exchange::Usm { .. } => Version::V3,
        }
    }

    /// Engine state learned so far (SNMPv3 only).
    pub async fn engine(&self) -> Option<EngineState> {
        match &*self.inner.exchange.lock().await {
            Exchange::Community(_) => None,
            Exchange::Usm { exchange, .. } => Some(exchange.engine().clone()),
        }
    }

    /// GET the given OIDs.
    pub async fn get(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let varbinds = oids.iter().cloned().map(VarBind::null).collect();
        self.request(PduType::GetRequest, None, varbinds).await
    }

    /// GETNEXT for a single OID.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        self.request(PduType::GetNextRequest, None, vec![VarBind::null(oid.clone())])
            .await?
            .into_iter()
            .next()
            .ok_or(Error::EmptyVarBindList)
    }

    /// GETBULK. Not available over SNMPv1.
    pub async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: i32,
        max_repetitions: i32,
    ) -> Result<Vec<VarBind>> {
        let varbinds = oids.iter().cloned().map(VarBind::null).collect();
        self.request(
            PduType::GetBulkRequest,
            Some(BulkParams::new(non_repeaters, max_repetitions)),
            varbinds,
        )
        .await
    }

    /// SET the given bindings.
    pub async fn set(&self, varbinds: &[(Oid, Value)]) -> Result<Vec<VarBind>> {
        let varbinds = varbinds
            .iter()
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
            .collect();
        self.request(PduType::SetRequest, None, varbinds).await
    }

    /// Walk the subtree under `oid` with GETNEXT.
    pub fn walk(&self, oid: Oid) -> Walk<T> {
        Walk::new(self.clone(), oid)
    }

    async fn request(
        &self,
        pdu_type: PduType,
        bulk: Option<BulkParams>,
        varbinds: Vec<VarBind>,
    ) -> Result<Vec<VarBind>> {
        let inner = &*self.inner;
        let filter = RecvFilter::from_addr(inner.target);
        let mut guard = inner.exchange.lock().await;

        let pdu = match &mut *guard {
            Exchange::Community(ex) => {
                ex.clear();
                for vb in varbinds {
                    ex.add_varbind(vb.oid, vb.value)?;
                }
                match bulk {
                    Some(bulk) => {
                        ex.send_bulk_request(&inner.session, bulk, &inner.transport, inner.target)
                            .await?
                    }
                    None => {
                        ex.send_request(&inner.session, pdu_type, &inner.transport, inner.target)
                            .await?
                    }
                };
                ex.recv_response(&inner.transport, filter, PduType::Response)
                    .await?
                    .clone()
            }
            Exchange::Usm { exchange, store } => {
                usm_request(inner, exchange, store, pdu_type, bulk, &varbinds, filter).await?
            }
        };

        check_status(&pdu, inner.target)?;
        Ok(pdu.varbinds)
    }
}

async fn usm_request<T: Transport>(
    inner: &ClientInner<T>,
    ex: &mut UsmExchange,
    store: &UserStore,
    pdu_type: PduType,
    bulk: Option<BulkParams>,
    varbinds: &[VarBind],
    filter: RecvFilter,
) -> Result<Pdu> {
    let mut retried = false;
    loop {
        ex.clear();
        for vb in varbinds {
            ex.add_varbind(vb.oid.clone(), vb.value.clone())?;
        }
        match bulk {
            Some(bulk) => {
                ex.send_bulk_request(&inner.session, store, bulk, &inner.transport, inner.target)
                    .await?
            }
            None => {
                ex.send_request(&inner.session, store, pdu_type, &inner.transport, inner.target)
                    .await?
            }
        };

        match ex
            .recv_response(&inner.session, store, &inner.transport, filter, PduType::Response)
            .await
        {
            Ok(pdu) => return Ok(pdu.clone()),
            Err(Error::ReportReceived { oid, target }) if !retried => {
                match ReportReason::from_oid(&oid) {
                    Some(ReportReason::UnknownEngineIds | ReportReason::NotInTimeWindows) => {
                        tracing::debug!(target: "netman_snmp::client", { snmp.target = %inner.target, report = %oid }, "resending after engine discovery");
                        retried = true;
                    }
                    _ => return Err(Error::ReportReceived { oid, target }),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Turn an error-status in a response into [`Error::Snmp`].
fn check_status(pdu: &Pdu, target: SocketAddr) -> Result<()> {
    if !pdu.is_error() {
        return Ok(());
    }
    let index = pdu.error_index.max(0) as u32;
    let oid = (index as usize)
        .checked_sub(1)
        .and_then(|i| pdu.varbinds.get(i))
        .map(|vb| vb.oid.clone());
    Err(Error::Snmp {
        target: Some(target),
        status: pdu.error_status_enum(),
        index,
        oid,
    })
}
