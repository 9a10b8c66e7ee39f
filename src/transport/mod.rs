//! Transport layer abstraction.
//!
//! Provides the [`Transport`] trait the exchanges and the scanner send and
//! receive datagrams through, and [`UdpTransport`], its UDP implementation.

mod udp;

#[cfg(test)]
mod mock;

pub use udp::*;

#[cfg(test)]
pub(crate) use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Datagram transport used by exchanges and the scanner.
///
/// One unconnected endpoint that can talk to any number of peers.
pub trait Transport: Send + Sync {
    /// Send one datagram to `target`.
    fn send_to(&self, data: &[u8], target: SocketAddr) -> impl Future<Output = Result<()>> + Send;

    /// Receive the next datagram accepted by `filter`.
    ///
    /// Datagrams the filter rejects are discarded. `timeout` bounds the
    /// whole call; when it elapses the result is [`Error::Timeout`](crate::Error::Timeout).
    fn recv_from(
        &self,
        filter: RecvFilter,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;

    /// Origin of the last datagram returned by [`recv_from`](Self::recv_from).
    fn last_origin(&self) -> Option<SocketAddr>;
}

/// Origin criteria for [`Transport::recv_from`].
///
/// A datagram is accepted when it matches every criterion that is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecvFilter {
    pub ip: Option<IpAddr>,
    pub port: Option<u16>,
}

impl RecvFilter {
    /// Accept datagrams from anywhere.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept datagrams from exactly `addr`.
    pub fn from_addr(addr: SocketAddr) -> Self {
        Self {
            ip: Some(addr.ip()),
            port: Some(addr.port()),
        }
    }

    /// Accept datagrams from `ip`, any port.
    pub fn from_ip(ip: IpAddr) -> Self {
        Self {
            ip: Some(ip),
            port: None,
        }
    }

    pub fn matches(&self, source: SocketAddr) -> bool {
        let ip_ok = self
            .ip
            .is_none_or(|ip| ip.to_canonical() == source.ip().to_canonical());
        let port_ok = self.port.is_none_or(|port| port == source.port());
        ip_ok && port_ok
    }

    /// The single address this filter names, if it names one.
    pub fn target(&self) -> Option<SocketAddr> {
        Some(SocketAddr::new(self.ip?, self.port?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_all_set_criteria() {
        let addr: SocketAddr = "192.0.2.10:161".parse().unwrap();
        assert!(RecvFilter::any().matches(addr));
        assert!(RecvFilter::from_addr(addr).matches(addr));
        assert!(!RecvFilter::from_addr(addr).matches("192.0.2.10:162".parse().unwrap()));
        assert!(!RecvFilter::from_addr(addr).matches("192.0.2.11:161".parse().unwrap()));
        assert!(RecvFilter::from_ip(addr.ip()).matches("192.0.2.10:40000".parse().unwrap()));

        let port_only = RecvFilter {
            ip: None,
            port: Some(161),
        };
        assert!(port_only.matches("198.51.100.1:161".parse().unwrap()));
        assert!(!port_only.matches("198.51.100.1:162".parse().unwrap()));
    }

    #[test]
    fn test_filter_mapped_ipv4() {
        let filter = RecvFilter::from_ip("192.0.2.10".parse().unwrap());
        assert!(filter.matches("[::ffff:192.0.2.10]:161".parse().unwrap()));
    }

    #[test]
    fn test_filter_target() {
        let addr: SocketAddr = "192.0.2.10:161".parse().unwrap();
        assert_eq!(RecvFilter::from_addr(addr).target(), Some(addr));
        assert_eq!(RecvFilter::from_ip(addr.ip()).target(), None);
    }
}
