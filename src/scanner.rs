//! SNMP agent discovery.
//!
//! A scan probes a contiguous IPv4 range with a GET for the seven scalar
//! objects of the `system` group. Probes go out in batches; after each
//! batch the scanner waits, then drains whatever answers arrived. Answers
//! are keyed by the address they came from, so an agent answering from an
//! address outside the probed range is still recorded under its own IP.
//!
//! ```rust,no_run
//! # use netman_snmp::scanner::{ScanParams, spawn_scan};
//! # use netman_snmp::UdpTransport;
//! # use std::sync::Arc;
//! # async fn example() -> netman_snmp::Result<()> {
//! let transport = Arc::new(UdpTransport::bind("0.0.0.0:0".parse().unwrap()).await?);
//! let params = ScanParams::new("192.168.1.1".parse().unwrap(), 254).max_requests(32);
//! let handle = spawn_scan(transport, params)?;
//! while !handle.is_finished() {
//!     println!("{}%", handle.progress().get());
//!     tokio::time::sleep(std::time::Duration::from_millis(500)).await;
//! }
//! let report = handle.wait().await?;
//! println!("{}", report.to_json()?);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::exchange::CommunityExchange;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::session::Session;
use crate::transport::{RecvFilter, Transport};
use crate::value::Value;
use crate::version::Version;

/// Request-id shared by every probe of a scan.
pub const SCAN_REQUEST_ID: i32 = 0x4E4D;

/// `system` group scalars, in probe order.
pub fn system_oids() -> [Oid; 7] {
    std::array::from_fn(|i| Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, i as u32 + 1, 0]))
}

/// Scan parameters.
#[derive(Debug, Clone)]
pub struct ScanParams {
    pub base: Ipv4Addr,
    pub nhosts: u16,
    pub port: u16,
    pub version: Version,
    /// Probes sent before waiting for answers.
    pub max_requests: u8,
    /// Wait after each batch.
    pub timeout: Duration,
    /// Bound on each receive while draining a batch.
    pub drain_timeout: Duration,
    pub community: Bytes,
}

impl ScanParams {
    /// Scan `nhosts` addresses starting at `base` with SNMPv2c on port 161.
    pub fn new(base: Ipv4Addr, nhosts: u16) -> Self {
        Self {
            base,
            nhosts,
            port: 161,
            version: Version::V2c,
            max_requests: 10,
            timeout: Duration::from_secs(5),
            drain_timeout: Duration::from_millis(250),
            community: Bytes::from_static(b"public"),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn max_requests(mut self, max_requests: u8) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = community.into();
        self
    }

    /// Reject parameters a scan cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.version == Version::V3 {
            return Err(Error::config("version", "scans use SNMPv1 or SNMPv2c"));
        }
        if self.max_requests == 0 {
            return Err(Error::config("max_requests", "must be at least 1"));
        }
        if self.port == 0 {
            return Err(Error::config("port", "must not be 0"));
        }
        let last = u64::from(u32::from(self.base)) + u64::from(self.nhosts);
        if last > u64::from(u32::MAX) + 1 {
            return Err(Error::config("nhosts", "range runs past 255.255.255.255"));
        }
        Ok(())
    }

    fn host(&self, index: u16) -> SocketAddr {
        let ip = Ipv4Addr::from(u32::from(self.base).wrapping_add(u32::from(index)));
        SocketAddr::new(IpAddr::V4(ip), self.port)
    }
}

/// Scan progress in percent, shared between the scan task and its observers.
#[derive(Debug, Clone, Default)]
pub struct ScanProgress(Arc<AtomicU8>);

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, percent: u8) {
        self.0.store(percent, Ordering::Release);
    }
}

/// What an agent told us about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnmpAgentEntry {
    pub sys_descr: String,
    pub sys_object_id: String,
    pub sys_up_time: u32,
    pub sys_contact: String,
    pub sys_name: String,
    pub sys_location: String,
    pub sys_services: i32,
}

impl SnmpAgentEntry {
    /// Read the seven `system` bindings of a probe response.
    ///
    /// Exception values read as empty or zero. Returns `None` when a binding
    /// is missing or holds the wrong type.
    pub fn from_pdu(pdu: &Pdu) -> Option<Self> {
        let [descr, object_id, up_time, contact, name, location, services] =
            <&[_; 7]>::try_from(pdu.varbinds.get(..7)?).ok()?;

        Some(Self {
            sys_descr: text(&descr.value)?,
            sys_object_id: match &object_id.value {
                Value::ObjectIdentifier(oid) => oid.to_string(),
                v if v.is_exception() => String::new(),
                _ => return None,
            },
            sys_up_time: match &up_time.value {
                v if v.is_exception() => 0,
                v => v.as_u32()?,
            },
            sys_contact: text(&contact.value)?,
            sys_name: text(&name.value)?,
            sys_location: text(&location.value)?,
            sys_services: match &services.value {
                v if v.is_exception() => 0,
                v => v.as_i32()?,
            },
        })
    }

    /// The five text fields, labelled and newline-joined.
    pub fn export_data(&self) -> String {
        format!(
            "sysDescr:\n{}\nsysObjectID:\n{}\nsysContact:\n{}\nsysName:\n{}\nsysLocation:\n{}",
            self.sys_descr, self.sys_object_id, self.sys_contact, self.sys_name, self.sys_location
        )
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::OctetString(data) => Some(String::from_utf8_lossy(data).into_owned()),
        v if v.is_exception() => Some(String::new()),
        _ => None,
    }
}

/// One exported agent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentRecord {
    pub ip: String,
    pub data: String,
}

/// Agents found by a scan, keyed by the address they answered from.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    agents: BTreeMap<IpAddr, SnmpAgentEntry>,
    cancelled: bool,
}

impl ScanReport {
    pub fn agents(&self) -> &BTreeMap<IpAddr, SnmpAgentEntry> {
        &self.agents
    }

    pub fn get(&self, ip: IpAddr) -> Option<&SnmpAgentEntry> {
        self.agents.get(&ip)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// True if the scan stopped before probing every host.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Flatten into `{ip, data}` records, ordered by address.
    pub fn export(&self) -> Vec<AgentRecord> {
        self.agents
            .iter()
            .map(|(ip, entry)| AgentRecord {
                ip: ip.to_string(),
                data: entry.export_data(),
            })
            .collect()
    }

    /// The export as a JSON array.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export())?)
    }
}

/// Run a scan to completion on the current task.
///
/// Send failures are expected for absent hosts and only logged. Progress is
/// updated after every probe and set to 100 when the scan completes.
pub async fn scan_agents<T: Transport>(
    transport: &T,
    params: &ScanParams,
    progress: Option<&ScanProgress>,
    cancel: &CancellationToken,
) -> Result<ScanReport> {
    params.validate()?;

    let session = Session::with_initial_request_id(SCAN_REQUEST_ID);
    let mut exchange = CommunityExchange::new(params.version, params.community.clone())?;
    exchange.set_timeout(params.drain_timeout);
    let filter = RecvFilter {
        ip: None,
        port: Some(params.port),
    };
    let oids = system_oids();
    let mut report = ScanReport::default();

    tracing::info!(target: "netman_snmp::scanner", { scan.base = %params.base, scan.nhosts = params.nhosts, snmp.version = %params.version, scan.max_requests = params.max_requests }, "starting agent scan");

    let mut checked: u16 = 0;
    let mut batch = 0usize;
    while checked < params.nhosts {
        let batch_size = u16::from(params.max_requests).min(params.nhosts - checked);
        batch += 1;

        for i in 0..batch_size {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(report);
            }
            let dest = params.host(checked + i);

            exchange.clear();
            for oid in &oids {
                exchange.add_varbind(oid.clone(), Value::Null)?;
            }
            session.reset_request_id(SCAN_REQUEST_ID);
            if let Err(e) = exchange
                .send_request(&session, PduType::GetRequest, transport, dest)
                .await
            {
                tracing::debug!(target: "netman_snmp::scanner", { snmp.target = %dest, error = %e }, "probe not sent");
            }

            if let Some(progress) = progress {
                let done = u32::from(checked + i) * 100 / u32::from(params.nhosts);
                progress.set(done as u8);
            }
        }
        checked += batch_size;

        tokio::select! {
            _ = cancel.cancelled() => {
                report.cancelled = true;
                return Ok(report);
            }
            _ = tokio::time::sleep(params.timeout) => {}
        }

        let before = report.len();
        for _ in 0..batch_size {
            match exchange
                .recv_response(transport, filter, PduType::Response)
                .await
            {
                Ok(pdu) => {
                    let Some(origin) = transport.last_origin() else {
                        continue;
                    };
                    match SnmpAgentEntry::from_pdu(pdu) {
                        Some(entry) => {
                            report.agents.insert(origin.ip().to_canonical(), entry);
                        }
                        None => {
                            tracing::debug!(target: "netman_snmp::scanner", { snmp.source = %origin }, "answer lacks system group values");
                        }
                    }
                }
                Err(Error::Timeout { .. } | Error::Io { .. }) => break,
                Err(e) => {
                    tracing::debug!(target: "netman_snmp::scanner", { error = %e }, "skipping datagram");
                }
            }
        }
        tracing::debug!(target: "netman_snmp::scanner", { snmp.batch = batch, scan.checked = checked, scan.answered = report.len() - before }, "batch drained");
    }

    if let Some(progress) = progress {
        progress.set(100);
    }
    tracing::info!(target: "netman_snmp::scanner", { scan.agents = report.len(), scan.batches = batch }, "agent scan finished");
    Ok(report)
}

/// A scan running on its own task.
#[derive(Debug)]
pub struct ScanHandle {
    task: JoinHandle<Result<ScanReport>>,
    progress: ScanProgress,
    cancel: CancellationToken,
}

impl ScanHandle {
    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    /// Ask the scan to stop. It returns the agents found so far.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the scan's result.
    pub async fn wait(self) -> Result<ScanReport> {
        self.task
            .await
            .map_err(|e| Error::io(std::io::Error::other(e)))?
    }
}

/// Start a scan on a new tokio task.
pub fn spawn_scan<T: Transport + 'static>(transport: Arc<T>, params: ScanParams) -> Result<ScanHandle> {
    params.validate()?;
    let progress = ScanProgress::new();
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let progress = progress.clone();
        let cancel = cancel.clone();
        async move { scan_agents(transport.as_ref(), &params, Some(&progress), &cancel).await }
    });

    Ok(ScanHandle {
        task,
        progress,
        cancel,
    })
}
