//! List-file discovery.
//!
//! Per logical file there is a base name and a per-interface override
//! extension; candidates are probed in a fixed order and the first existing
//! file wins.

use std::path::{Path, PathBuf};

/// System-wide configuration directory.
pub(crate) const CONFIG_DIR: &str = "/etc/wg-monitor";

pub(crate) const PEER_FILE_BASE: &str = "peers.list";
pub(crate) const PEER_FILE_EXT: &str = ".list";

pub(crate) const URL_FILE_BASE: &str = "batsign.url";
pub(crate) const URL_FILE_EXT: &str = ".url";

/// Candidate paths in precedence order:
/// the explicit CLI path, `<iface><ext>` and `<base>` in the working
/// directory, then the same two under `/etc/wg-monitor`.
fn candidates(explicit: Option<&Path>, iface: &str, base: &str, ext: &str) -> Vec<PathBuf> {
    let override_name = format!("{iface}{ext}");
    let mut paths = Vec::with_capacity(5);

    if let Some(path) = explicit {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from(&override_name));
    paths.push(PathBuf::from(base));
    paths.push(Path::new(CONFIG_DIR).join(&override_name));
    paths.push(Path::new(CONFIG_DIR).join(base));

    paths
}

/// First existing candidate, if any.
pub(crate) fn discover(
    explicit: Option<&Path>,
    iface: &str,
    base: &str,
    ext: &str,
) -> Option<PathBuf> {
    candidates(explicit, iface, base, ext)
        .into_iter()
        .find(|path| path.is_file())
}
