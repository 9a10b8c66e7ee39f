//! netman-scan: discover SNMP agents in an IPv4 range.

use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use netman_snmp::cli::LogArgs;
use netman_snmp::scanner::{ScanParams, spawn_scan};
use netman_snmp::{UdpTransport, Version};

/// Probe a range of addresses for SNMP agents and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "netman-scan", version, about)]
struct Args {
    /// First address of the range.
    #[arg(value_name = "BASE")]
    base: Ipv4Addr,

    /// Number of consecutive addresses to probe.
    #[arg(value_name = "COUNT")]
    nhosts: u16,

    /// Agent port.
    #[arg(short = 'p', long, default_value_t = 161)]
    port: u16,

    /// SNMP version: 1 or 2c.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    version: Version,

    /// Community string.
    #[arg(short = 'c', long, default_value = "public")]
    community: String,

    /// Probes sent before waiting for answers.
    #[arg(short = 'n', long, default_value_t = 10)]
    max_requests: u8,

    /// Seconds to wait after each batch.
    #[arg(short = 't', long, default_value_t = 5)]
    timeout: u64,

    /// Print progress to stderr.
    #[arg(long)]
    progress: bool,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> netman_snmp::Result<()> {
    let transport = UdpTransport::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
    let params = ScanParams::new(args.base, args.nhosts)
        .port(args.port)
        .version(args.version)
        .community(args.community.into_bytes())
        .max_requests(args.max_requests)
        .timeout(Duration::from_secs(args.timeout));

    let handle = spawn_scan(Arc::new(transport), params)?;
    if args.progress {
        let progress = handle.progress().clone();
        while !handle.is_finished() {
            eprint!("\rscanning... {:3}%", progress.get());
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        eprintln!("\rscanning... 100%");
    }

    let report = handle.wait().await?;
    println!("{}", report.to_json()?);
    Ok(())
}
