//! Catalog file parsing.
//!
//! A catalog is a text file of blank-line-separated blocks. Each block is a
//! sequence of `key=value` lines, one of which must be `language=<name>`.
//! Lines starting with `#` are comments. The catalog is parsed once at
//! startup; the active [`Translation`] is passed around by reference
//! afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::Translation;

/// The default catalog compiled into the binary.
const DEFAULT_CATALOG_TEXT: &str = include_str!("../translations.txt");

/// The block name hidden from the available-language listing.
const DEBUG_LANGUAGE: &str = "debug";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog block starting at line {line} has no language= entry")]
    MissingLanguage { line: usize },

    #[error("catalog defines language {0:?} twice")]
    DuplicateLanguage(String),
}

/// Immutable, process-wide lookup of locale to template record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    translations: HashMap<String, Translation>,
}

impl Catalog {
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut translations = HashMap::new();

        for block in blocks(text) {
            let translation = parse_block(&block)?;

            if translations.contains_key(&translation.language) {
                return Err(CatalogError::DuplicateLanguage(translation.language));
            }

            translations.insert(translation.language.clone(), translation);
        }

        Ok(Self { translations })
    }

    pub fn get(&self, language: &str) -> Option<&Translation> {
        self.translations.get(language)
    }

    /// Language names suitable for user-facing listings, sorted. The
    /// `debug` block is excluded.
    pub fn available_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self
            .translations
            .keys()
            .map(String::as_str)
            .filter(|language| *language != DEBUG_LANGUAGE)
            .collect();
        languages.sort_unstable();

        languages
    }
}

/// The embedded default catalog, parsed on first use.
pub fn default_catalog() -> &'static Catalog {
    static CATALOG: Lazy<Catalog> = Lazy::new(|| {
        Catalog::parse(DEFAULT_CATALOG_TEXT).expect("embedded catalog must be well-formed")
    });

    &CATALOG
}

/// Split the file into blocks of `(line_number, line)` pairs, dropping
/// comments and blank separators.
fn blocks(text: &str) -> Vec<Vec<(usize, &str)>> {
    let mut out = Vec::new();
    let mut current: Vec<(usize, &str)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        current.push((index + 1, line));
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn parse_block(block: &[(usize, &str)]) -> Result<Translation, CatalogError> {
    let first_line = block.first().map(|(line, _)| *line).unwrap_or(0);
    let mut translation = Translation::default();

    for (_, line) in block {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let value = value.to_owned();
        match key.trim() {
            "language" => translation.language = value,
            "subject" => translation.subject = value,
            "powerRestored" => translation.power_restored = value,
            "justLostContactWith" => translation.just_lost_contact_with = value,
            "justRegainedContactWith" => translation.just_regained_contact_with = value,
            "stillMissingContactWith" => translation.still_missing_contact_with = value,
            "nowHasContactWithAll" => translation.now_has_contact_with_all = value,
            "lastSeen" => translation.last_seen = value,
            "back" => translation.back = value,
            "notSeenSinceRestart" => translation.not_seen_since_restart = value,
            "peerSingular" => translation.peer_singular = value,
            "peerPlural" => translation.peer_plural = value,
            "phaseDescription" => translation.phase_description = value,
            // Unknown keys are tolerated so newer catalogs keep loading.
            _ => {}
        }
    }

    if translation.language.is_empty() {
        return Err(CatalogError::MissingLanguage { line: first_line });
    }

    Ok(translation)
}
