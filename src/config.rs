//! Manager configuration.
//!
//! The typed settings the engine reads: ports, trap receivers, the v3
//! identity (engine ID and context name), the community string and the
//! receive timeout. How they are persisted is up to the embedding program.

use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::util::decode_hex;

/// Largest accepted trap log size and timeout (seconds).
pub const MAX_LIMIT: u32 = 999;

/// Manager settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Port requests are sent to.
    pub snmp_port: u16,
    pub trap_v1_port: u16,
    pub trap_v2_port: u16,
    pub trap_v3_port: u16,
    pub trap_v1_enabled: bool,
    pub trap_v2_enabled: bool,
    pub trap_v3_enabled: bool,
    /// Records kept in the trap log.
    pub trap_limit: u32,
    /// Authoritative engine ID as hex text. Empty means discover it.
    pub engine_id: String,
    pub context_name: String,
    pub community: String,
    /// Receive timeout in seconds.
    pub timeout_secs: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            snmp_port: 161,
            trap_v1_port: 162,
            trap_v2_port: 162,
            trap_v3_port: 162,
            trap_v1_enabled: false,
            trap_v2_enabled: false,
            trap_v3_enabled: false,
            trap_limit: 100,
            engine_id: String::new(),
            context_name: String::new(),
            community: "public".to_string(),
            timeout_secs: 5,
        }
    }
}

impl ManagerConfig {
    /// Check ports, limits and the engine ID text.
    pub fn validate(&self) -> Result<()> {
        for (field, port) in [
            ("snmp_port", self.snmp_port),
            ("trap_v1_port", self.trap_v1_port),
            ("trap_v2_port", self.trap_v2_port),
            ("trap_v3_port", self.trap_v3_port),
        ] {
            if port == 0 {
                return Err(Error::config(field, "port must not be 0"));
            }
        }
        if !(1..=MAX_LIMIT).contains(&self.trap_limit) {
            return Err(Error::config("trap_limit", format!("must be 1..={MAX_LIMIT}")));
        }
        if !(1..=MAX_LIMIT).contains(&self.timeout_secs) {
            return Err(Error::config("timeout_secs", format!("must be 1..={MAX_LIMIT}")));
        }
        self.engine_id_bytes()?;
        Ok(())
    }

    /// The engine ID decoded from hex.
    pub fn engine_id_bytes(&self) -> Result<Bytes> {
        decode_hex(&self.engine_id)
            .map(Bytes::from)
            .map_err(|e| Error::config("engine_id", e.to_string()))
    }

    pub fn context_name_bytes(&self) -> Bytes {
        Bytes::from(self.context_name.clone().into_bytes())
    }

    pub fn community_bytes(&self) -> Bytes {
        Bytes::from(self.community.clone().into_bytes())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }

    /// Trap ports that are switched on.
    pub fn enabled_trap_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = [
            (self.trap_v1_enabled, self.trap_v1_port),
            (self.trap_v2_enabled, self.trap_v2_port),
            (self.trap_v3_enabled, self.trap_v3_port),
        ]
        .into_iter()
        .filter_map(|(enabled, port)| enabled.then_some(port))
        .collect();
        ports.dedup();
        ports
    }
}
