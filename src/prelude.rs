//! Common imports.
//!
//! ```rust,no_run
//! use netman_snmp::prelude::*;
//! ```

pub use crate::client::Client;
pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::session::Session;
pub use crate::transport::{RecvFilter, Transport, UdpTransport};
pub use crate::user_store::{UserEntry, UserStore};
pub use crate::v3::{AuthProtocol, PrivProtocol};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
