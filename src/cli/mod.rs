//! Pieces shared by the `netman-*` command-line tools.
//!
//! Only available with the `cli` feature.

use clap::Args;

use crate::error::Result;
use crate::oid::Oid;
use crate::varbind::VarBind;

/// Logging flags.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Enable debug logging (netman_snmp=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (netman_snmp=trace).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl LogArgs {
    /// Install a stderr subscriber. `RUST_LOG` wins over the flags.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let level = if self.trace {
            "netman_snmp=trace"
        } else if self.debug {
            "netman_snmp=debug"
        } else {
            "netman_snmp=warn"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Parse a dotted OID, allowing a leading dot.
pub fn parse_oid(text: &str) -> Result<Oid> {
    Oid::parse(text.strip_prefix('.').unwrap_or(text))
}

/// One `OID = value` line per binding.
pub fn format_varbinds(varbinds: &[VarBind]) -> String {
    varbinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
