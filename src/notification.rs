//! Received notifications and the trap log.

use std::collections::VecDeque;
use std::net::SocketAddr;

use crate::oid;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::version::Version;

/// `snmpTrapOID.0`, the second varbind of every v2c/v3 notification.
pub fn snmp_trap_oid() -> Oid {
    oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0)
}

/// A trap or inform accepted by `recv_trap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub origin: SocketAddr,
    pub version: Version,
    pub pdu: Pdu,
}

impl Notification {
    pub fn is_inform(&self) -> bool {
        self.pdu.pdu_type == PduType::InformRequest
    }

    /// The notification's `snmpTrapOID.0` value, if present.
    pub fn trap_oid(&self) -> Option<&Oid> {
        let trap_oid = snmp_trap_oid();
        self.pdu
            .varbinds
            .iter()
            .find(|vb| vb.oid == trap_oid)
            .and_then(|vb| vb.value.as_oid())
    }
}

/// One log line: a short name and the varbinds as text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapRecord {
    pub name: String,
    pub data: String,
}

impl From<&Notification> for TrapRecord {
    fn from(n: &Notification) -> Self {
        let kind = if n.is_inform() { "inform" } else { "trap" };
        let name = match n.trap_oid() {
            Some(oid) => format!("{} {} {}", n.origin.ip(), kind, oid),
            None => format!("{} {}", n.origin.ip(), kind),
        };
        let data = n
            .pdu
            .varbinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self { name, data }
    }
}

/// Newest-last log of notifications holding at most `limit` records.
#[derive(Debug, Clone)]
pub struct TrapLog {
    records: VecDeque<TrapRecord>,
    limit: usize,
}

impl TrapLog {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Record a notification, dropping the oldest record when full.
    pub fn push(&mut self, notification: &Notification) {
        self.push_record(TrapRecord::from(notification));
    }

    pub fn push_record(&mut self, record: TrapRecord) {
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &TrapRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Serialize as a JSON list of `{name, data}` objects.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Load a JSON list, keeping the newest `limit` records.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str, limit: usize) -> crate::Result<Self> {
        let records: Vec<TrapRecord> = serde_json::from_str(json)?;
        let mut log = Self::new(limit);
        for record in records {
            log.push_record(record);
        }
        Ok(log)
    }
}
