//! The external-command notification channel.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use wgmon_types::{join_keys, SortedBuckets};

/// Runs the operator-supplied notification command.
///
/// The command receives six positional arguments: the report body, the cycle
/// index, and the space-joined keys of the just-lost, just-returned,
/// still-lost and present buckets. Exit code 0 counts as success.
///
/// The command is not subject to any timeout; a hanging hook blocks the
/// cycle until the supervisor intervenes.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    executable: PathBuf,
}

impl CommandChannel {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub async fn run(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool {
        let status = Command::new(&self.executable)
            .arg(body)
            .arg(cycle.to_string())
            .arg(join_keys(&buckets.just_lost))
            .arg(join_keys(&buckets.just_returned))
            .arg(join_keys(&buckets.still_lost))
            .arg(join_keys(&buckets.present))
            .status()
            .await;

        match status {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::warn!(
                    command = %self.executable.display(),
                    %status,
                    "notification command exited nonzero",
                );

                false
            }
            Err(err) => {
                tracing::error!(
                    command = %self.executable.display(),
                    %err,
                    "failed to run notification command",
                );

                false
            }
        }
    }
}
