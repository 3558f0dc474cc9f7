//! Stable process exit codes.

use std::process::ExitCode;

use wg_client::ProbeError;
use wgmon_monitor::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exit {
    Success = 0,
    Failure = 1,
    CliParse = 8,
    Exception = 9,
    MissingFiles = 10,
    UnknownLanguage = 11,
    CommandNotFound = 12,
    NetworkError = 13,
    Permissions = 14,
    EmptyFile = 15,
    BadEncoding = 16,
}

impl Exit {
    pub fn code(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

/// The exit code for a probe failure that ended the process.
pub(crate) fn probe_exit(err: &ProbeError) -> Exit {
    match err {
        ProbeError::NeedElevation => Exit::Permissions,
        ProbeError::ToolMissing => Exit::CommandNotFound,
        ProbeError::NetworkFailure => Exit::NetworkError,
        ProbeError::NoSuchInterface { .. } => Exit::Failure,
        ProbeError::Generic { .. } => Exit::Exception,
    }
}

pub(crate) fn monitor_exit(err: &MonitorError) -> Exit {
    probe_exit(err.probe_error())
}
