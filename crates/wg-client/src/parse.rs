//! Parsing of `latest-handshakes` output.

use std::time::{Duration, SystemTime};

use wgmon_types::{HandshakeRow, HandshakeStamp, PeerKey};

/// Parse the TSV rows emitted by `wg show <iface> latest-handshakes`.
///
/// One line per peer: `<base64 key>\t<unix seconds>`. Malformed lines are
/// skipped row by row; the returned batch is complete before any of it is
/// applied to a registry, so a bad line never causes a partial update.
///
/// A value whose first byte is `0` is the tool's sentinel for "no handshake
/// yet" and maps to [`HandshakeStamp::NeverSeen`].
pub fn parse_latest_handshakes(output: &str) -> Vec<HandshakeRow> {
    let mut rows = Vec::new();

    for line in output.lines() {
        let Some((key_token, value_token)) = line.split_once('\t') else {
            continue;
        };

        let Ok(key) = PeerKey::new(key_token) else {
            continue;
        };

        let value_token = value_token.trim();
        if value_token.is_empty() {
            continue;
        }

        let stamp = if value_token.starts_with('0') {
            HandshakeStamp::NeverSeen
        } else {
            let Ok(seconds) = value_token.parse::<u64>() else {
                continue;
            };

            HandshakeStamp::At(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds))
        };

        rows.push(HandshakeRow { key, stamp });
    }

    rows
}
