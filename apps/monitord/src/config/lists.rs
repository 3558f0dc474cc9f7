//! Peer and URL list parsing.
//!
//! Both files share the same lexical rules: one entry per line, blank lines
//! skipped, `#` starts a comment (whole-line or inline). Peer entries must
//! be well-formed keys; anything else is collected for logging rather than
//! failing startup.

use std::collections::BTreeSet;

use wgmon_types::PeerKey;

pub(crate) struct PeerList {
    pub peers: BTreeSet<PeerKey>,
    pub invalid: Vec<String>,
}

pub(crate) fn parse_peer_list(text: &str) -> PeerList {
    let mut peers = BTreeSet::new();
    let mut invalid = Vec::new();

    for entry in entries(text) {
        match PeerKey::new(entry) {
            Ok(key) => {
                peers.insert(key);
            }
            Err(_) => invalid.push(entry.to_owned()),
        }
    }

    PeerList { peers, invalid }
}

pub(crate) fn parse_url_list(text: &str) -> Vec<String> {
    entries(text).map(str::to_owned).collect()
}

/// Lines with comments stripped and whitespace trimmed, empties dropped.
fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| {
            let line = match line.find('#') {
                Some(at) => &line[..at],
                None => line,
            };

            line.trim()
        })
        .filter(|line| !line.is_empty())
}
