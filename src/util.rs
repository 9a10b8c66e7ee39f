//! Internal utilities: socket setup and hex text.

use std::fmt::Write as _;
use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Bind an unconnected, non-blocking UDP socket for the manager.
///
/// An IPv6 wildcard bind also accepts IPv4 peers as mapped addresses, so
/// one `[::]` socket serves agents of both families. The receive buffer
/// request is best effort; the kernel clamps it to its own maximum.
pub(crate) fn bind_udp_socket(addr: SocketAddr, recv_buffer_size: Option<usize>) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    if let Some(size) = recv_buffer_size
        && let Err(e) = socket.set_recv_buffer_size(size)
    {
        tracing::debug!(target: "netman_snmp::transport", { requested = size, error = %e }, "receive buffer size not applied");
    }
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}

/// Hex text that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexDecodeError {
    #[error("odd number of hex digits")]
    OddLength,
    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

/// Lowercase hex without separators.
pub fn encode_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Decode hex text, tolerating an optional `0x` prefix and `:` or space separators.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, HexDecodeError> {
    let body = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: Vec<char> = body.chars().filter(|c| *c != ':' && *c != ' ').collect();
    if digits.len() % 2 != 0 {
        return Err(HexDecodeError::OddLength);
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16).ok_or(HexDecodeError::InvalidDigit(pair[0]))?;
            let lo = pair[1].to_digit(16).ok_or(HexDecodeError::InvalidDigit(pair[1]))?;
            Ok((hi * 16 + lo) as u8)
        })
        .collect()
}
