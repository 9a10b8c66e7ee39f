//! Request/response exchanges.
//!
//! An exchange object holds one outgoing varbind list and the last response.
//! It is reused across requests with [`clear`](CommunityExchange::clear).
//! Request-ids come from a [`Session`](crate::Session) passed to every send,
//! so exchanges in different sessions never collide.
//!
//! - [`CommunityExchange`]: SNMPv1/v2c
//! - [`UsmExchange`]: SNMPv3 with USM

mod community;
mod usm;

pub use community::CommunityExchange;
pub use usm::{EngineState, UserKeys, UsmExchange, open_v3, seal_v3};

use std::time::Duration;

/// Receive timeout used unless one is set explicitly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Outgoing varbind list that locks after a send until cleared.
#[derive(Debug, Default)]
pub(crate) struct Outgoing {
    varbinds: Vec<VarBind>,
    sent: bool,
}

impl Outgoing {
    /// Arcs the BER encoding cannot represent are refused here, before send.
    pub(crate) fn add(&mut self, oid: Oid, value: Value) -> Result<()> {
        if self.sent {
            return Err(Error::VarBindsLocked);
        }
        oid.validate()?;
        self.varbinds.push(VarBind::new(oid, value));
        Ok(())
    }

    /// Varbinds for a send. Fails on an empty list; locks the list otherwise.
    pub(crate) fn take_for_send(&mut self) -> Result<Vec<VarBind>> {
        if self.varbinds.is_empty() {
            return Err(Error::EmptyVarBindList);
        }
        self.sent = true;
        Ok(self.varbinds.clone())
    }

    pub(crate) fn varbinds(&self) -> &[VarBind] {
        &self.varbinds
    }

    pub(crate) fn clear(&mut self) {
        self.varbinds.clear();
        self.sent = false;
    }
}
