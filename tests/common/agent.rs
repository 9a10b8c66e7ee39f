//! An in-memory network of simulated SNMP agents.
//!
//! [`AgentNet`] implements [`Transport`]: every datagram sent to an address
//! with a [`SimAgent`] behind it is answered synchronously, and the answer
//! is queued for the next `recv_from`. Datagrams to other addresses vanish.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use netman_snmp::exchange::{UserKeys, open_v3, seal_v3};
use netman_snmp::message::{
    CommunityMessage, Message, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, V3Message,
};
use netman_snmp::v3::UsmSecurityParams;
use netman_snmp::{
    Error, Oid, Pdu, PduType, RecvFilter, ReportReason, Result, Transport, UserStore, Value,
    VarBind, Version,
};

use super::fixtures::{ENGINE_BOOTS, ENGINE_ID, ENGINE_TIME};

const NO_SUCH_NAME: i32 = 2;

/// One simulated agent: a sorted MIB table behind a community and a USM engine.
#[derive(Debug, Clone)]
pub struct SimAgent {
    pub community: Bytes,
    pub table: Vec<(Oid, Value)>,
    pub engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
    pub users: UserStore,
    /// Send answers from this port instead of the one probed.
    pub reply_port: Option<u16>,
}

impl SimAgent {
    pub fn new(table: Vec<(Oid, Value)>) -> Self {
        let mut table = table;
        table.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            community: Bytes::from_static(b"public"),
            table,
            engine_id: Bytes::from_static(ENGINE_ID),
            engine_boots: ENGINE_BOOTS,
            engine_time: ENGINE_TIME,
            users: UserStore::new(),
            reply_port: None,
        }
    }

    pub fn community(mut self, community: &'static [u8]) -> Self {
        self.community = Bytes::from_static(community);
        self
    }

    pub fn users(mut self, users: UserStore) -> Self {
        self.users = users;
        self
    }

    pub fn engine(mut self, engine_id: &'static [u8], boots: u32, time: u32) -> Self {
        self.engine_id = Bytes::from_static(engine_id);
        self.engine_boots = boots;
        self.engine_time = time;
        self
    }

    pub fn reply_port(mut self, port: u16) -> Self {
        self.reply_port = Some(port);
        self
    }

    fn lookup(&self, oid: &Oid) -> Option<&Value> {
        self.table.iter().find(|(o, _)| o == oid).map(|(_, v)| v)
    }

    fn next_after(&self, oid: &Oid) -> Option<(Oid, Value)> {
        self.table.iter().find(|(o, _)| o > oid).cloned()
    }

    fn store(&mut self, oid: Oid, value: Value) {
        match self.table.binary_search_by(|(o, _)| o.cmp(&oid)) {
            Ok(i) => self.table[i].1 = value,
            Err(i) => self.table.insert(i, (oid, value)),
        }
    }

    /// Process one request PDU, returning the response PDU.
    fn answer(&mut self, version: Version, request: &Pdu) -> Pdu {
        let mut response = Pdu::request(PduType::Response, request.request_id, Vec::new());
        let fail = |index: usize| {
            let mut pdu = request.to_response();
            pdu.error_status = NO_SUCH_NAME;
            pdu.error_index = index as i32 + 1;
            pdu
        };

        match request.pdu_type {
            PduType::GetRequest => {
                for (i, vb) in request.varbinds.iter().enumerate() {
                    match self.lookup(&vb.oid) {
                        Some(value) => response.varbinds.push(VarBind::new(vb.oid.clone(), value.clone())),
                        None if version == Version::V1 => return fail(i),
                        None => response.varbinds.push(VarBind::new(vb.oid.clone(), Value::NoSuchObject)),
                    }
                }
            }
            PduType::GetNextRequest => {
                for (i, vb) in request.varbinds.iter().enumerate() {
                    match self.next_after(&vb.oid) {
                        Some((oid, value)) => response.varbinds.push(VarBind::new(oid, value)),
                        None if version == Version::V1 => return fail(i),
                        None => response.varbinds.push(VarBind::new(vb.oid.clone(), Value::EndOfMibView)),
                    }
                }
            }
            PduType::GetBulkRequest => {
                let non_repeaters = request.error_status.max(0) as usize;
                let max_repetitions = request.error_index.max(0) as usize;
                let (fixed, repeating) = request
                    .varbinds
                    .split_at(non_repeaters.min(request.varbinds.len()));
                for vb in fixed {
                    let (oid, value) = self
                        .next_after(&vb.oid)
                        .unwrap_or((vb.oid.clone(), Value::EndOfMibView));
                    response.varbinds.push(VarBind::new(oid, value));
                }
                let mut cursors: Vec<Oid> = repeating.iter().map(|vb| vb.oid.clone()).collect();
                for _ in 0..max_repetitions {
                    for cursor in &mut cursors {
                        match self.next_after(cursor) {
                            Some((oid, value)) => {
                                *cursor = oid.clone();
                                response.varbinds.push(VarBind::new(oid, value));
                            }
                            None => response
                                .varbinds
                                .push(VarBind::new(cursor.clone(), Value::EndOfMibView)),
                        }
                    }
                }
            }
            PduType::SetRequest => {
                for vb in &request.varbinds {
                    self.store(vb.oid.clone(), vb.value.clone());
                }
                response.varbinds = request.varbinds.clone();
            }
            _ => response.varbinds = request.varbinds.clone(),
        }
        response
    }

    fn handle_community(&mut self, msg: CommunityMessage) -> Option<Bytes> {
        if msg.community != self.community {
            return None;
        }
        let pdu = self.answer(msg.version, &msg.pdu);
        Some(CommunityMessage::new(msg.version, msg.community, pdu).encode())
    }

    fn report(&self, msg: &V3Message, user: Bytes, reason: ReportReason) -> Bytes {
        let scoped = ScopedPdu::new(
            self.engine_id.clone(),
            Bytes::new(),
            Pdu::report(0, reason.oid(), 1),
        );
        V3Message::new(
            MsgGlobalData::new(msg.msg_id(), MsgFlags::new(SecurityLevel::NoAuthNoPriv, false)),
            UsmSecurityParams::new(self.engine_id.clone(), self.engine_boots, self.engine_time, user)
                .encode(),
            scoped,
        )
        .encode()
    }

    fn handle_v3(&mut self, msg: V3Message, raw: &[u8]) -> Option<Bytes> {
        let params = UsmSecurityParams::decode(msg.security_params.clone()).ok()?;
        if params.engine_id != self.engine_id {
            return Some(self.report(&msg, params.username, ReportReason::UnknownEngineIds));
        }
        let name = String::from_utf8_lossy(&params.username).into_owned();
        let Ok(entry) = self.users.get_user(&name) else {
            return Some(self.report(&msg, params.username, ReportReason::UnknownUserNames));
        };
        let keys = UserKeys::derive(entry, &self.engine_id).ok()?;
        if msg.security_level() > keys.security_level() {
            return Some(self.report(&msg, params.username, ReportReason::UnsupportedSecLevels));
        }
        if msg.security_level().requires_auth()
            && (params.engine_boots != self.engine_boots
                || params.engine_time.abs_diff(self.engine_time) > 150)
        {
            return Some(self.report(&msg, params.username, ReportReason::NotInTimeWindows));
        }
        let scoped = open_v3(&msg, raw, &params, &keys).ok()?;

        let pdu = self.answer(Version::V3, &scoped.pdu);
        let reply = ScopedPdu::new(scoped.context_engine_id, scoped.context_name, pdu);
        seal_v3(
            MsgGlobalData::new(msg.msg_id(), MsgFlags::new(msg.security_level(), false)),
            UsmSecurityParams::new(
                self.engine_id.clone(),
                self.engine_boots,
                self.engine_time,
                params.username,
            ),
            &reply,
            &keys,
            u64::from(self.engine_time),
        )
        .ok()
    }

    fn handle(&mut self, data: &[u8]) -> Option<Bytes> {
        match Message::decode(Bytes::copy_from_slice(data)).ok()? {
            Message::Community(msg) => self.handle_community(msg),
            Message::V3(msg) => self.handle_v3(msg, data),
        }
    }
}

/// A set of simulated agents reachable through one [`Transport`].
pub struct AgentNet {
    local_addr: SocketAddr,
    agents: Mutex<HashMap<SocketAddr, SimAgent>>,
    inbound: Mutex<VecDeque<(Bytes, SocketAddr)>>,
    sent: Mutex<Vec<(Bytes, SocketAddr)>>,
    last_origin: Mutex<Option<SocketAddr>>,
}

impl AgentNet {
    pub fn new() -> Self {
        Self {
            local_addr: "127.0.0.1:40162".parse().unwrap(),
            agents: Mutex::new(HashMap::new()),
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            last_origin: Mutex::new(None),
        }
    }

    pub fn with_agent(self, addr: SocketAddr, agent: SimAgent) -> Self {
        self.agents.lock().unwrap().insert(addr, agent);
        self
    }

    /// Queue a datagram as if `source` had sent it.
    pub fn inject(&self, data: Bytes, source: SocketAddr) {
        self.inbound.lock().unwrap().push_back((data, source));
    }

    pub fn sent(&self) -> Vec<(Bytes, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }

    /// Current table value at `oid` on the agent at `addr`.
    pub fn value_at(&self, addr: SocketAddr, oid: &Oid) -> Option<Value> {
        self.agents.lock().unwrap().get(&addr)?.lookup(oid).cloned()
    }

    /// Move the agent's clock, as after a reboot or a long idle.
    pub fn set_engine_clock(&self, addr: SocketAddr, boots: u32, time: u32) {
        if let Some(agent) = self.agents.lock().unwrap().get_mut(&addr) {
            agent.engine_boots = boots;
            agent.engine_time = time;
        }
    }
}

impl Default for AgentNet {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for AgentNet {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((Bytes::copy_from_slice(data), target));

        let mut agents = self.agents.lock().unwrap();
        if let Some(agent) = agents.get_mut(&target)
            && let Some(reply) = agent.handle(data)
        {
            let source = SocketAddr::new(target.ip(), agent.reply_port.unwrap_or(target.port()));
            self.inbound.lock().unwrap().push_back((reply, source));
        }
        Ok(())
    }

    async fn recv_from(&self, filter: RecvFilter, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut inbound = self.inbound.lock().unwrap();
        while let Some((data, source)) = inbound.pop_front() {
            if filter.matches(source) {
                *self.last_origin.lock().unwrap() = Some(source);
                return Ok((data, source));
            }
        }
        Err(Error::Timeout {
            target: filter.target(),
            elapsed: timeout,
            request_id: 0,
        })
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn last_origin(&self) -> Option<SocketAddr> {
        *self.last_origin.lock().unwrap()
    }
}
