//! In-memory transport for unit tests.

use super::{RecvFilter, Transport};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::{HashSet, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&[u8], SocketAddr) -> Vec<(Bytes, SocketAddr)> + Send + Sync>;

/// Queue-backed transport. An empty queue times out immediately.
pub(crate) struct MockTransport {
    local_addr: SocketAddr,
    inbound: Mutex<VecDeque<(Bytes, SocketAddr)>>,
    sent: Mutex<Vec<(Bytes, SocketAddr)>>,
    unreachable: Mutex<HashSet<IpAddr>>,
    last_origin: Mutex<Option<SocketAddr>>,
    responder: Option<Responder>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            local_addr: "127.0.0.1:40000".parse().unwrap(),
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            unreachable: Mutex::new(HashSet::new()),
            last_origin: Mutex::new(None),
            responder: None,
        }
    }

    /// Answer every send with whatever `f` returns.
    pub(crate) fn with_responder(
        f: impl Fn(&[u8], SocketAddr) -> Vec<(Bytes, SocketAddr)> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Some(Box::new(f)),
            ..Self::new()
        }
    }

    pub(crate) fn push_inbound(&self, data: impl Into<Bytes>, source: SocketAddr) {
        self.inbound.lock().unwrap().push_back((data.into(), source));
    }

    pub(crate) fn fail_sends_to(&self, ip: IpAddr) {
        self.unreachable.lock().unwrap().insert(ip);
    }

    pub(crate) fn sent(&self) -> Vec<(Bytes, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        if self.unreachable.lock().unwrap().contains(&target.ip()) {
            return Err(Error::Io {
                target: Some(target),
                source: std::io::Error::new(std::io::ErrorKind::HostUnreachable, "no route"),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((Bytes::copy_from_slice(data), target));
        if let Some(responder) = &self.responder {
            let replies = responder(data, target);
            self.inbound.lock().unwrap().extend(replies);
        }
        Ok(())
    }

    async fn recv_from(&self, filter: RecvFilter, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut inbound = self.inbound.lock().unwrap();
        while let Some((data, source)) = inbound.pop_front() {
            if filter.matches(source) {
                *self.last_origin.lock().unwrap() = Some(source);
                return Ok((data, source));
            }
        }
        Err(Error::Timeout {
            target: filter.target(),
            elapsed: timeout,
            request_id: 0,
        })
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn last_origin(&self) -> Option<SocketAddr> {
        *self.last_origin.lock().unwrap()
    }
}
