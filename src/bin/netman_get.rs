//! netman-get: read values from an SNMP agent.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures_core::Stream;
use netman_snmp::cli::{LogArgs, format_varbinds, parse_oid};
use netman_snmp::util::decode_hex;
use netman_snmp::{Client, Error, Oid, UdpTransport, UserStore, Version};

/// GET (or walk) OIDs over SNMPv1, v2c or v3.
#[derive(Debug, Parser)]
#[command(name = "netman-get", version, about)]
struct Args {
    /// Target host or host:port.
    #[arg(value_name = "TARGET")]
    target: String,

    /// OIDs to read, dotted.
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,

    /// SNMP version: 1, 2c or 3. Implied 3 when --user is given.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    version: Version,

    /// Community string (v1/v2c).
    #[arg(short = 'c', long, default_value = "public")]
    community: String,

    /// SNMPv3 user name.
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// User store file with SNMPv3 credentials.
    #[arg(long, default_value = "snmpv3_users.txt")]
    users_file: String,

    /// Expected authoritative engine ID in hex. Discovered when omitted.
    #[arg(short = 'e', long)]
    engine_id: Option<String>,

    /// SNMPv3 context name.
    #[arg(short = 'n', long, default_value = "")]
    context: String,

    /// Receive timeout in seconds.
    #[arg(short = 't', long, default_value_t = 5)]
    timeout: u64,

    /// Walk each OID's subtree instead of reading it.
    #[arg(short = 'w', long)]
    walk: bool,

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

async fn connect(args: &Args) -> netman_snmp::Result<Client<UdpTransport>> {
    let timeout = Duration::from_secs(args.timeout);
    let target = if args.target.contains(':') {
        args.target.clone()
    } else {
        format!("{}:161", args.target)
    };

    if args.user.is_some() || args.version == Version::V3 {
        let user = args
            .user
            .clone()
            .ok_or_else(|| Error::config("user", "SNMPv3 needs --user"))?;
        let store = Arc::new(UserStore::load(&args.users_file)?);
        let engine_id = match &args.engine_id {
            Some(hex) => decode_hex(hex).map_err(|e| Error::config("engine_id", e.to_string()))?,
            None => Vec::new(),
        };
        return Client::v3(target, user, store)
            .engine_id(engine_id)
            .context_name(args.context.clone().into_bytes())
            .timeout(timeout)
            .connect()
            .await;
    }

    let builder = if args.version == Version::V1 {
        Client::v1(target)
    } else {
        Client::v2c(target)
    };
    builder
        .community(args.community.as_bytes())
        .timeout(timeout)
        .connect()
        .await
}

async fn run(args: Args) -> netman_snmp::Result<()> {
    let oids: Vec<Oid> = args
        .oids
        .iter()
        .map(|s| parse_oid(s))
        .collect::<netman_snmp::Result<_>>()?;
    let client = connect(&args).await?;

    if args.walk {
        for oid in oids {
            let mut walk = Box::pin(client.walk(oid));
            while let Some(vb) = std::future::poll_fn(|cx| walk.as_mut().poll_next(cx)).await {
                println!("{}", vb?);
            }
        }
    } else {
        let varbinds = client.get(&oids).await?;
        println!("{}", format_varbinds(&varbinds));
    }
    Ok(())
}
