//! Localized notification bodies.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use wgmon_i18n::Translation;
use wgmon_types::{DisplayName, Peer, PeerKey, SortedBuckets};

const TOKEN_NUM_PEERS: &str = "$numPeers";
const TOKEN_PEER_NOUN: &str = "$peerNoun";
const TOKEN_TIMESTAMP: &str = "$timestamp";
const TOKEN_PHASE_NAME: &str = "$phaseName";
const TOKEN_PHASE_NUMBER: &str = "$phaseNumber";
const TOKEN_SERVER_NAME: &str = "$serverName";

const ROW_INDENT: &str = "    ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Which timestamp phrase a bucket's rows use.
#[derive(Clone, Copy)]
enum Phrase {
    LastSeen,
    Back,
}

/// The subject line for URL notifications.
pub fn subject_line(translation: &Translation, server_name: &str) -> String {
    translation.subject.replace(TOKEN_SERVER_NAME, server_name)
}

/// A peer's rendered name: capitalized, with the locale's phase description
/// when the key carries a phase.
pub fn render_peer_name(translation: &Translation, key: &PeerKey) -> String {
    let display = DisplayName::derive(key);

    if display.phase() > 0 {
        return translation
            .phase_description
            .replace(TOKEN_PHASE_NAME, display.name())
            .replace(TOKEN_PHASE_NUMBER, &display.phase().to_string());
    }

    display.name().to_owned()
}

/// Compose the report body for one cycle.
///
/// Cycle 0 announces the monitor itself coming (back) up. Later cycles
/// render one section per non-empty bucket, in the fixed order just lost /
/// just returned / still lost, separated by single blank lines, with an
/// all-present trailer when no peer remains lost.
pub fn compose_body(
    translation: &Translation,
    server_name: &str,
    buckets: &SortedBuckets,
    cycle: u64,
) -> String {
    if cycle == 0 {
        return translation
            .power_restored
            .replace(TOKEN_SERVER_NAME, server_name);
    }

    let mut sections: Vec<Vec<String>> = Vec::new();

    if !buckets.just_lost.is_empty() {
        sections.push(section(
            translation,
            &translation.just_lost_contact_with,
            &buckets.just_lost,
            Phrase::LastSeen,
        ));
    }
    if !buckets.just_returned.is_empty() {
        sections.push(section(
            translation,
            &translation.just_regained_contact_with,
            &buckets.just_returned,
            Phrase::Back,
        ));
    }
    if !buckets.still_lost.is_empty() {
        sections.push(section(
            translation,
            &translation.still_missing_contact_with,
            &buckets.still_lost,
            Phrase::LastSeen,
        ));
    }

    if sections.is_empty() {
        // A report forced out with nothing to say states that all is well.
        return translation.now_has_contact_with_all.clone();
    }

    if buckets.all_present() {
        sections.push(vec![translation.now_has_contact_with_all.clone()]);
    }

    sections
        .iter()
        .map(|lines| lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn section(
    translation: &Translation,
    header_template: &str,
    peers: &[Peer],
    phrase: Phrase,
) -> Vec<String> {
    let count = peers.len();

    let mut lines = Vec::with_capacity(count + 1);
    lines.push(
        header_template
            .replace(TOKEN_NUM_PEERS, &count.to_string())
            .replace(TOKEN_PEER_NOUN, translation.peer_noun(count)),
    );

    for peer in peers {
        let name = render_peer_name(translation, peer.key());
        let phrase = timestamp_phrase(translation, peer, phrase);

        lines.push(format!("{ROW_INDENT}{name}, {phrase}"));
    }

    lines
}

fn timestamp_phrase(translation: &Translation, peer: &Peer, phrase: Phrase) -> String {
    let stamp = match peer.last_handshake() {
        Some(stamp) if !peer.never_seen() => stamp,
        _ => return translation.not_seen_since_restart.clone(),
    };

    let template = match phrase {
        Phrase::LastSeen => &translation.last_seen,
        Phrase::Back => &translation.back,
    };

    template.replace(TOKEN_TIMESTAMP, &format_timestamp(stamp))
}

fn format_timestamp(stamp: SystemTime) -> String {
    DateTime::<Local>::from(stamp)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
