//! # netman-snmp
//!
//! SNMP engine for a network-management client.
//!
//! - BER codec with a closed [`Value`] type and [`Oid`]
//! - SNMPv1/v2c exchanges correlated by request-id ([`CommunityExchange`])
//! - SNMPv3 User-based Security Model with REPORT-driven engine discovery,
//!   HMAC authentication and DES/AES privacy ([`UsmExchange`])
//! - Trap and inform reception with automatic inform acknowledgement
//! - A credential store with a flat-file format ([`UserStore`])
//! - Agent discovery over an IPv4 range ([`scanner`])
//! - A [`Client`] facade with get/get-next/get-bulk/set and subtree walks
//!
//! Request-ids come from a [`Session`] that is passed to every send. Give
//! each logical conversation its own session and exchanges never see each
//! other's responses.
//!
//! ```rust,no_run
//! use netman_snmp::{Client, oid};
//! use std::time::Duration;
//!
//! # async fn example() -> netman_snmp::Result<()> {
//! let client = Client::v2c("192.168.1.1:161")
//!     .community(b"public")
//!     .timeout(Duration::from_secs(2))
//!     .connect()
//!     .await?;
//!
//! for vb in client.get(&[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]).await? {
//!     println!("{vb}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `serde` (default): JSON export of scans and the trap log, serde for
//!   [`ManagerConfig`]
//! - `cli`: the `netman-scan` and `netman-get` binaries
//! - `rt-multi-thread`: multi-threaded tokio runtime

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod ber;
#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod exchange;
pub mod message;
pub mod notification;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod scanner;
pub mod session;
pub mod transport;
pub mod user_store;
pub mod util;
pub mod v3;
pub mod value;
pub mod varbind;
pub mod version;

pub use client::Client;
pub use config::ManagerConfig;
pub use error::{Error, ErrorStatus, Result};
pub use exchange::{CommunityExchange, EngineState, UsmExchange};
pub use notification::{Notification, TrapLog, TrapRecord};
pub use oid::Oid;
pub use pdu::{BulkParams, Pdu, PduType};
pub use scanner::{ScanParams, ScanProgress, ScanReport, SnmpAgentEntry, scan_agents, spawn_scan};
pub use session::Session;
pub use transport::{RecvFilter, Transport, UdpTransport};
pub use user_store::{UserEntry, UserStore};
pub use v3::{AuthProtocol, PrivProtocol, ReportReason};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
