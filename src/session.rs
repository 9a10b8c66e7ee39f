//! Per-session correlation and USM state.
//!
//! A [`Session`] owns the request-id counter that v1/v2c request-ids and
//! v3 msgIDs are drawn from, the USM statistics counters reported to peers,
//! and the privacy salt counter. Independent sessions never share ids.

use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, Ordering};

use crate::v3::ReportReason;

const FIRST_REQUEST_ID: i32 = 1;

/// Request-id counter and security statistics for one logical session.
#[derive(Debug)]
pub struct Session {
    request_id: AtomicI32,
    stats: [AtomicU32; ReportReason::ALL.len()],
    salt: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::with_initial_request_id(FIRST_REQUEST_ID)
    }

    /// Start the counter at `id` instead of 1.
    pub fn with_initial_request_id(id: i32) -> Self {
        let mut seed = [0u8; 8];
        if getrandom::fill(&mut seed).is_err() {
            tracing::warn!(target: "netman_snmp::session", "no OS randomness, salt counter starts at zero");
        }
        Self {
            request_id: AtomicI32::new(id.max(FIRST_REQUEST_ID)),
            stats: Default::default(),
            salt: AtomicU64::new(u64::from_be_bytes(seed)),
        }
    }

    /// Take the next id. Wraps back to 1 after `i32::MAX`.
    pub fn next_request_id(&self) -> i32 {
        self.request_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| {
                Some(if id == i32::MAX { FIRST_REQUEST_ID } else { id + 1 })
            })
            .unwrap_or(FIRST_REQUEST_ID)
    }

    /// The id the next call to [`next_request_id`](Self::next_request_id) returns.
    pub fn current_request_id(&self) -> i32 {
        self.request_id.load(Ordering::Relaxed)
    }

    /// Restart correlation at `id`.
    pub fn reset_request_id(&self, id: i32) {
        self.request_id.store(id.max(FIRST_REQUEST_ID), Ordering::Relaxed);
    }

    /// Bump a statistics counter and return its new value.
    pub fn increment_stat(&self, reason: ReportReason) -> u32 {
        self.stats[reason.index()]
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }

    pub fn stat(&self, reason: ReportReason) -> u32 {
        self.stats[reason.index()].load(Ordering::Relaxed)
    }

    /// Next privacy salt. Never repeats within 2^64 messages.
    pub fn next_salt(&self) -> u64 {
        self.salt.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
