//! Display-name derivation from vanity key prefixes.

use crate::peer::PeerKey;

/// How many leading key characters participate in name derivation.
const NAME_PREFIX_LEN: usize = 7;

/// A human-facing peer name extracted from the leading characters of a
/// public key, plus an optional phase number (1 to 3) for multi-phase sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    name: String,
    phase: u8,
}

impl DisplayName {
    /// Derive the display name from a key.
    ///
    /// Within the first 7 characters, a `+` ends the name and may be
    /// followed by a phase digit `1`-`3`; a `/` ends the name with no phase;
    /// otherwise the whole prefix is the name.
    pub fn derive(key: &PeerKey) -> Self {
        let prefix = &key.as_str()[..NAME_PREFIX_LEN];

        let (name, phase) = if let Some(at) = prefix.find('+') {
            let phase = match prefix.as_bytes().get(at + 1) {
                Some(digit @ b'1'..=b'3') => digit - b'0',
                _ => 0,
            };

            (&prefix[..at], phase)
        } else if let Some(at) = prefix.find('/') {
            (&prefix[..at], 0)
        } else {
            (prefix, 0)
        };

        Self {
            name: capitalize(name),
            phase,
        }
    }

    /// The capitalized name, without any phase decoration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase number; 0 means the key carries none.
    pub fn phase(&self) -> u8 {
        self.phase
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
