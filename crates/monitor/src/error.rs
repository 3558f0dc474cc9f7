use wg_client::ProbeError;

/// A probe failure that terminates the monitoring loop.
///
/// The phase matters to the caller: `NeedElevation` at startup can be
/// answered by re-executing the process with privileges, while the same
/// failure mid-run means privileges were dropped underneath us.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("{source}")]
    Startup { source: ProbeError },

    #[error("{source}")]
    Runtime { source: ProbeError },
}

impl MonitorError {
    pub fn probe_error(&self) -> &ProbeError {
        match self {
            MonitorError::Startup { source } | MonitorError::Runtime { source } => source,
        }
    }

    pub fn is_startup(&self) -> bool {
        matches!(self, MonitorError::Startup { .. })
    }
}
