//! UDP transport.

use super::{RecvFilter, Transport};
use crate::error::{Error, Result};
use crate::util::bind_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// Largest UDP payload.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65507;

/// Unconnected UDP socket implementing [`Transport`].
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    last_origin: Mutex<Option<SocketAddr>>,
    max_message_size: usize,
}

impl UdpTransport {
    /// Bind to `addr`. Use port 0 for an ephemeral port.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        Self::bind_with_buffer(addr, None).await
    }

    /// Bind with an explicit kernel receive buffer size.
    pub async fn bind_with_buffer(addr: SocketAddr, recv_buffer_size: Option<usize>) -> Result<Self> {
        let socket = bind_udp_socket(addr, recv_buffer_size).map_err(Error::io)?;
        let local_addr = socket.local_addr().map_err(Error::io)?;

        tracing::debug!(target: "netman_snmp::transport", { snmp.local_addr = %local_addr }, "UDP transport bound");

        Ok(Self {
            socket,
            local_addr,
            last_origin: Mutex::new(None),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        })
    }
}

impl Transport for UdpTransport {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        tracing::trace!(target: "netman_snmp::transport", { snmp.target = %target, snmp.bytes = data.len() }, "UDP send");
        self.socket
            .send_to(data, target)
            .await
            .map_err(|source| Error::Io {
                target: Some(target),
                source,
            })?;
        Ok(())
    }

    async fn recv_from(&self, filter: RecvFilter, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; self.max_message_size];

        loop {
            let (len, source) = match tokio::time::timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Ok(Ok(received)) => received,
                Ok(Err(source)) => {
                    return Err(Error::Io {
                        target: filter.target(),
                        source,
                    });
                }
                Err(_) => {
                    tracing::trace!(target: "netman_snmp::transport", { snmp.timeout_ms = timeout.as_millis() as u64 }, "UDP recv timeout");
                    return Err(Error::Timeout {
                        target: filter.target(),
                        elapsed: timeout,
                        request_id: 0,
                    });
                }
            };

            if !filter.matches(source) {
                tracing::trace!(target: "netman_snmp::transport", { snmp.source = %source }, "discarding datagram from unexpected origin");
                continue;
            }

            tracing::trace!(target: "netman_snmp::transport", { snmp.source = %source, snmp.bytes = len }, "UDP recv");
            *self.last_origin.lock().unwrap_or_else(PoisonError::into_inner) = Some(source);
            return Ok((Bytes::copy_from_slice(&buf[..len]), source));
        }
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn last_origin(&self) -> Option<SocketAddr> {
        *self.last_origin.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_filter_and_origin() {
        let a = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let b = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let c = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();

        c.send_to(b"noise", a.local_addr()).await.unwrap();
        b.send_to(b"hello", a.local_addr()).await.unwrap();

        let (data, source) = a
            .recv_from(RecvFilter::from_addr(b.local_addr()), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(&data[..], b"hello");
        assert_eq!(source, b.local_addr());
        assert_eq!(a.last_origin(), Some(b.local_addr()));
    }

    #[tokio::test]
    async fn test_timeout() {
        let a = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let err = a
            .recv_from(RecvFilter::any(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(a.last_origin(), None);
    }
}
