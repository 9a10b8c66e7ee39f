//! Client builders.
//!
//! # Entry Points
//!
//! - [`Client::v1()`] - SNMPv1 with community string
//! - [`Client::v2c()`] - SNMPv2c with community string
//! - [`Client::v3()`] - SNMPv3 for a user from a [`UserStore`]
//!
//! # Examples
//!
//! ```rust,no_run
//! # use netman_snmp::{Client, UserStore};
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # async fn example() -> netman_snmp::Result<()> {
//! let client = Client::v2c("192.168.1.1:161")
//!     .community(b"public")
//!     .timeout(Duration::from_secs(2))
//!     .connect()
//!     .await?;
//!
//! let store = Arc::new(UserStore::load("users.txt")?);
//! let client = Client::v3("192.168.1.1:161", "admin", store)
//!     .context_name("")
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::exchange::DEFAULT_TIMEOUT;
use crate::transport::{Transport, UdpTransport};
use crate::user_store::UserStore;
use crate::version::Version;

use super::Client;

/// Settings shared by all builders.
struct BaseConfig {
    target: String,
    timeout: Duration,
}

impl BaseConfig {
    fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        self.target
            .to_socket_addrs()
            .map_err(Error::io)?
            .next()
            .ok_or_else(|| {
                Error::io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not resolve address",
                ))
            })
    }

    /// Resolve the target and bind an ephemeral socket of the same family.
    async fn bind(&self) -> Result<(UdpTransport, SocketAddr)> {
        let target = self.resolve_target()?;
        let local = match target.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        Ok((UdpTransport::bind(local).await?, target))
    }
}

macro_rules! impl_common_methods {
    ($builder:ty) => {
        impl $builder {
            /// Set the receive timeout.
            pub fn timeout(mut self, timeout: Duration) -> Self {
                self.base.timeout = timeout;
                self
            }
        }
    };
}

/// Builder for SNMPv1 and SNMPv2c clients.
///
/// Created via [`Client::v1()`] or [`Client::v2c()`].
pub struct CommunityClientBuilder {
    base: BaseConfig,
    version: Version,
    community: Bytes,
}

impl CommunityClientBuilder {
    fn new(target: impl Into<String>, version: Version) -> Self {
        Self {
            base: BaseConfig::new(target),
            version,
            community: Bytes::from_static(b"public"),
        }
    }

    /// Set the community string.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.community = Bytes::copy_from_slice(community);
        self
    }

    /// Bind a UDP socket and create the client.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let (transport, target) = self.base.bind().await?;
        Self::finish(self.version, self.community, self.base.timeout, transport, target)
    }

    /// Create the client over a supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let target = self.base.resolve_target()?;
        Self::finish(self.version, self.community, self.base.timeout, transport, target)
    }

    fn finish<T: Transport>(
        version: Version,
        community: Bytes,
        timeout: Duration,
        transport: T,
        target: SocketAddr,
    ) -> Result<Client<T>> {
        Client::community(transport, target, version, community, timeout)
    }
}

impl_common_methods!(CommunityClientBuilder);

/// Builder for SNMPv3 clients.
///
/// Created via [`Client::v3()`]. The engine ID starts empty and is
/// discovered on the first request unless set.
pub struct UsmClientBuilder {
    base: BaseConfig,
    user: String,
    store: Arc<UserStore>,
    engine_id: Bytes,
    context_name: Bytes,
}

impl UsmClientBuilder {
    fn new(target: impl Into<String>, user: impl Into<String>, store: Arc<UserStore>) -> Self {
        Self {
            base: BaseConfig::new(target),
            user: user.into(),
            store,
            engine_id: Bytes::new(),
            context_name: Bytes::new(),
        }
    }

    /// Expect this authoritative engine ID.
    pub fn engine_id(mut self, engine_id: impl Into<Bytes>) -> Self {
        self.engine_id = engine_id.into();
        self
    }

    pub fn context_name(mut self, context_name: impl Into<Bytes>) -> Self {
        self.context_name = context_name.into();
        self
    }

    /// Bind a UDP socket and create the client.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let (transport, target) = self.base.bind().await?;
        self.finish(transport, target)
    }

    /// Create the client over a supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let target = self.base.resolve_target()?;
        self.finish(transport, target)
    }

    fn finish<T: Transport>(self, transport: T, target: SocketAddr) -> Result<Client<T>> {
        Client::usm(
            transport,
            target,
            self.store,
            self.user,
            self.engine_id,
            self.context_name,
            self.base.timeout,
        )
    }
}

impl_common_methods!(UsmClientBuilder);

impl Client<UdpTransport> {
    /// Create an SNMPv1 client builder.
    pub fn v1(target: impl Into<String>) -> CommunityClientBuilder {
        CommunityClientBuilder::new(target, Version::V1)
    }

    /// Create an SNMPv2c client builder.
    pub fn v2c(target: impl Into<String>) -> CommunityClientBuilder {
        CommunityClientBuilder::new(target, Version::V2c)
    }

    /// Create an SNMPv3 client builder for `user`.
    ///
    /// The user's protocols and passwords are read from `store`.
    pub fn v3(
        target: impl Into<String>,
        user: impl Into<String>,
        store: Arc<UserStore>,
    ) -> UsmClientBuilder {
        UsmClientBuilder::new(target, user, store)
    }
}
