pub type Result<T> = std::result::Result<T, ProbeError>;

/// Classified probe failures. One classifier produces these from the tool's
/// exit status and output text; callers pattern-match to decide whether a
/// failure is fatal, retried, or skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The tool reported "Operation not permitted". The caller may
    /// re-execute the process with elevated privileges.
    #[error("wg requires elevated privileges")]
    NeedElevation,

    /// The interface does not exist (yet, or anymore).
    #[error("no such interface: {iface}")]
    NoSuchInterface { iface: String },

    /// The tool reported "Address family not supported by protocol".
    #[error("network failure while querying wg")]
    NetworkFailure,

    /// The executable could not be spawned at all.
    #[error("wg executable not found")]
    ToolMissing,

    /// Any other nonzero exit.
    #[error("wg failed: {msg}")]
    Generic { msg: String },
}

/// Substrings of the tool's output that are part of its stable contract.
const NEED_ELEVATION_MARKER: &str = "Operation not permitted";
const NO_SUCH_DEVICE_MARKER: &str = "No such device";
const NETWORK_FAILURE_MARKER: &str = "Address family not supported by protocol";

/// Map a nonzero exit's combined stderr/stdout text to a [`ProbeError`].
pub(crate) fn classify_failure(iface: &str, text: &str) -> ProbeError {
    if text.contains(NEED_ELEVATION_MARKER) {
        return ProbeError::NeedElevation;
    }
    if text.contains(NO_SUCH_DEVICE_MARKER) {
        return ProbeError::NoSuchInterface {
            iface: iface.to_owned(),
        };
    }
    if text.contains(NETWORK_FAILURE_MARKER) {
        return ProbeError::NetworkFailure;
    }

    ProbeError::Generic {
        msg: text.trim().to_owned(),
    }
}
