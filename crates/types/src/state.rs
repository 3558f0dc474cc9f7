//! The four-state connectivity automaton.

use std::fmt;

/// Per-peer connectivity state, advanced once per polling cycle.
///
/// `JustLost` and `JustReturned` are one-cycle edge labels; `Present` and
/// `StillLost` are the steady states. `Unset` only exists between a peer
/// record being created and its first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerState {
    Unset,
    Present,
    JustReturned,
    JustLost,
    StillLost,
}

impl PeerState {
    /// Transition function: `(current, timed_out)` to `(next, changed)`.
    ///
    /// An `Unset` peer that already exceeds the threshold at first
    /// observation goes straight to `StillLost` and counts as a change, so
    /// the first cycle can report it.
    pub fn step(self, timed_out: bool) -> (PeerState, bool) {
        use PeerState::*;

        match (self, timed_out) {
            (Unset, false) => (Present, false),
            (Unset, true) => (StillLost, true),
            (Present, false) => (Present, false),
            (Present, true) => (JustLost, true),
            (JustReturned, false) => (Present, false),
            (JustReturned, true) => (JustLost, true),
            (JustLost, false) => (JustReturned, true),
            (JustLost, true) => (StillLost, false),
            (StillLost, false) => (JustReturned, true),
            (StillLost, true) => (StillLost, false),
        }
    }

    /// Whether the peer currently counts against `all_present`.
    pub fn is_lost(self) -> bool {
        matches!(self, PeerState::JustLost | PeerState::StillLost)
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerState::Unset => "unset",
            PeerState::Present => "present",
            PeerState::JustReturned => "just returned",
            PeerState::JustLost => "just lost",
            PeerState::StillLost => "still lost",
        };

        f.write_str(name)
    }
}
