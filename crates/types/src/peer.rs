//! Peer identity and per-peer record.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::state::PeerState;

/// Length in bytes of a base64-encoded WireGuard public key.
pub const PEER_KEY_LEN: usize = 44;

/// A WireGuard public key: exactly 44 base64 characters, the last one `=`.
///
/// The key is the primary identifier of a peer and is immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerKey(String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeerKeyError {
    #[error("peer key must be {PEER_KEY_LEN} characters long, got {0}")]
    BadLength(usize),

    #[error("peer key must end with '='")]
    MissingPadding,
}

impl PeerKey {
    pub fn new(key: impl Into<String>) -> Result<Self, PeerKeyError> {
        let key = key.into();

        if key.len() != PEER_KEY_LEN {
            return Err(PeerKeyError::BadLength(key.len()));
        }
        if !key.ends_with('=') {
            return Err(PeerKeyError::MissingPadding);
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PeerKey {
    type Err = PeerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One remote VPN participant tracked across polling cycles.
#[derive(Debug, Clone)]
pub struct Peer {
    key: PeerKey,
    state: PeerState,
    /// Timestamp of the most recent successful handshake, if any was ever
    /// observed.
    last_handshake: Option<SystemTime>,
    /// True while the probe has never reported a nonzero handshake for this
    /// peer.
    never_seen: bool,
}

impl Peer {
    pub fn new(key: PeerKey) -> Self {
        Self {
            key,
            state: PeerState::Unset,
            last_handshake: None,
            never_seen: true,
        }
    }

    pub fn key(&self) -> &PeerKey {
        &self.key
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn last_handshake(&self) -> Option<SystemTime> {
        self.last_handshake
    }

    pub fn never_seen(&self) -> bool {
        self.never_seen
    }

    pub(crate) fn record_handshake(&mut self, stamp: SystemTime) {
        self.last_handshake = Some(stamp);
        self.never_seen = false;
    }

    pub(crate) fn record_never_seen(&mut self) {
        self.never_seen = true;
    }

    /// The timestamp age is measured against. Peers the probe has never seen
    /// borrow the process-start timestamp, so they get one full timeout
    /// window to appear before being flagged as lost.
    pub fn reference_handshake(&self, started_at: SystemTime) -> SystemTime {
        if self.never_seen {
            return started_at;
        }

        self.last_handshake.unwrap_or(started_at)
    }

    /// Whether this peer's handshake age exceeds the lost threshold at `now`.
    pub fn timed_out(&self, now: SystemTime, threshold: Duration, started_at: SystemTime) -> bool {
        let reference = self.reference_handshake(started_at);

        match now.duration_since(reference) {
            Ok(age) => age > threshold,
            // Reference in the future counts as fresh.
            Err(_) => false,
        }
    }

    /// Advance the state machine one cycle. Returns whether the transition
    /// counts as a change.
    pub fn step(&mut self, timed_out: bool) -> bool {
        let (next, changed) = self.state.step(timed_out);
        self.state = next;

        changed
    }
}
