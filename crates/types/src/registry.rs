//! Peer store and the per-cycle bucket snapshot.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::peer::{Peer, PeerKey};
use crate::state::PeerState;

/// One parsed row of handshake output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRow {
    pub key: PeerKey,
    pub stamp: HandshakeStamp,
}

/// The timestamp column of a handshake row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStamp {
    /// The tool's `0` sentinel: the peer has never completed a handshake.
    NeverSeen,
    /// A completed handshake at the given wall-clock time.
    At(SystemTime),
}

/// Peer store keyed by public key.
///
/// Mutated only by [`PeerRegistry::apply`] (probe rows) and the
/// orchestrator's stepping pass. Peers outside the configured set are kept
/// but never stepped, so they stay `Unset` and out of every bucket.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerKey, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a batch of fully parsed probe rows.
    ///
    /// Callers parse the whole probe output before applying it, so a
    /// structural failure never leaves the registry half-updated.
    pub fn apply(&mut self, rows: Vec<HandshakeRow>) {
        for row in rows {
            let peer = self
                .peers
                .entry(row.key.clone())
                .or_insert_with(|| Peer::new(row.key));

            match row.stamp {
                HandshakeStamp::NeverSeen => peer.record_never_seen(),
                HandshakeStamp::At(stamp) => peer.record_handshake(stamp),
            }
        }
    }

    pub fn get(&self, key: &PeerKey) -> Option<&Peer> {
        self.peers.get(key)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Peer> {
        self.peers.values_mut()
    }
}

/// Snapshot partition of the registry, one sorted bucket per post-init
/// state. Recomputed every cycle.
#[derive(Debug, Clone, Default)]
pub struct SortedBuckets {
    pub present: Vec<Peer>,
    pub just_returned: Vec<Peer>,
    pub just_lost: Vec<Peer>,
    pub still_lost: Vec<Peer>,
}

impl SortedBuckets {
    /// Partition a registry snapshot. `Unset` peers (never stepped, i.e.
    /// not in the configured set) are left out.
    pub fn collect(registry: &PeerRegistry) -> Self {
        let mut buckets = Self::default();

        for peer in registry.iter() {
            match peer.state() {
                PeerState::Unset => {}
                PeerState::Present => buckets.present.push(peer.clone()),
                PeerState::JustReturned => buckets.just_returned.push(peer.clone()),
                PeerState::JustLost => buckets.just_lost.push(peer.clone()),
                PeerState::StillLost => buckets.still_lost.push(peer.clone()),
            }
        }

        for bucket in [
            &mut buckets.present,
            &mut buckets.just_returned,
            &mut buckets.just_lost,
            &mut buckets.still_lost,
        ] {
            bucket.sort_by(|a, b| a.key().cmp(b.key()));
        }

        buckets
    }

    /// True when no peer is in a lost state. The `just_returned` bucket does
    /// not affect this.
    pub fn all_present(&self) -> bool {
        self.just_lost.is_empty() && self.still_lost.is_empty()
    }
}

/// Space-joined full keys of a bucket, for the notification command's
/// positional peer-set arguments.
pub fn join_keys(peers: &[Peer]) -> String {
    peers
        .iter()
        .map(|peer| peer.key().as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn key(tag: u8) -> PeerKey {
        let mut raw = String::new();
        raw.push(char::from(tag));
        raw.push_str(&"A".repeat(42));
        raw.push('=');

        PeerKey::new(raw).expect("test key must be valid")
    }

    fn stamp(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn apply_upserts_and_clears_never_seen() {
        let mut registry = PeerRegistry::new();

        registry.apply(vec![HandshakeRow {
            key: key(b'a'),
            stamp: HandshakeStamp::NeverSeen,
        }]);

        let peer = registry.get(&key(b'a')).unwrap();
        assert!(peer.never_seen());
        assert_eq!(peer.last_handshake(), None);

        registry.apply(vec![HandshakeRow {
            key: key(b'a'),
            stamp: HandshakeStamp::At(stamp(100)),
        }]);

        let peer = registry.get(&key(b'a')).unwrap();
        assert!(!peer.never_seen());
        assert_eq!(peer.last_handshake(), Some(stamp(100)));
    }

    #[test]
    fn sentinel_does_not_erase_recorded_handshake() {
        let mut registry = PeerRegistry::new();

        registry.apply(vec![HandshakeRow {
            key: key(b'a'),
            stamp: HandshakeStamp::At(stamp(100)),
        }]);
        registry.apply(vec![HandshakeRow {
            key: key(b'a'),
            stamp: HandshakeStamp::NeverSeen,
        }]);

        let peer = registry.get(&key(b'a')).unwrap();
        assert!(peer.never_seen());
        assert_eq!(peer.last_handshake(), Some(stamp(100)));
    }

    fn registry_with_states(entries: &[(u8, bool)]) -> PeerRegistry {
        // `timed_out` per entry; one step turns Unset into Present or
        // StillLost.
        let mut registry = PeerRegistry::new();

        registry.apply(
            entries
                .iter()
                .map(|(tag, _)| HandshakeRow {
                    key: key(*tag),
                    stamp: HandshakeStamp::At(stamp(100)),
                })
                .collect(),
        );

        for (tag, timed_out) in entries {
            let peer = registry
                .iter_mut()
                .find(|peer| peer.key() == &key(*tag))
                .unwrap();
            peer.step(*timed_out);
        }

        registry
    }

    #[test]
    fn buckets_are_sorted_ascending_by_key() {
        let registry = registry_with_states(&[(b'c', false), (b'a', false), (b'b', false)]);
        let buckets = SortedBuckets::collect(&registry);

        let keys: Vec<_> = buckets
            .present
            .iter()
            .map(|peer| peer.key().clone())
            .collect();
        assert_eq!(keys, vec![key(b'a'), key(b'b'), key(b'c')]);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn collect_is_stable_across_runs() {
        let registry = registry_with_states(&[(b'b', true), (b'a', false)]);

        let first = SortedBuckets::collect(&registry);
        let second = SortedBuckets::collect(&registry);

        let keys = |bucket: &[Peer]| {
            bucket
                .iter()
                .map(|peer| peer.key().clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(keys(&first.present), keys(&second.present));
        assert_eq!(keys(&first.still_lost), keys(&second.still_lost));
    }

    #[test]
    fn unstepped_peers_are_excluded() {
        let mut registry = PeerRegistry::new();
        registry.apply(vec![HandshakeRow {
            key: key(b'x'),
            stamp: HandshakeStamp::At(stamp(100)),
        }]);

        let buckets = SortedBuckets::collect(&registry);

        assert!(buckets.present.is_empty());
        assert!(buckets.all_present());
    }

    #[test]
    fn all_present_ignores_just_returned() {
        let registry = registry_with_states(&[(b'a', true)]);
        let mut buckets = SortedBuckets::collect(&registry);
        assert!(!buckets.all_present());

        // Move the lost peer to just_returned by hand; all_present flips.
        buckets.just_returned = std::mem::take(&mut buckets.still_lost);
        assert!(buckets.all_present());
    }

    #[test]
    fn join_keys_concatenates_full_keys() {
        let registry = registry_with_states(&[(b'a', false), (b'b', false)]);
        let buckets = SortedBuckets::collect(&registry);

        let joined = join_keys(&buckets.present);
        assert_eq!(joined, format!("{} {}", key(b'a'), key(b'b')));

        assert_eq!(join_keys(&buckets.still_lost), "");
    }
}
