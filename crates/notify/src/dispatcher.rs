//! Channel selection and the dispatch entry point.

use std::path::PathBuf;

use async_trait::async_trait;
use wgmon_types::SortedBuckets;

use crate::{CommandChannel, Notify, NotifyError, UrlChannel};

/// Which channels a report goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    CommandOnly,
    UrlsOnly,
    Both,
}

/// Everything the dispatcher needs from the startup configuration.
pub struct DispatcherConfig {
    pub mode: DispatchMode,
    /// Required unless mode is `UrlsOnly`.
    pub command: Option<PathBuf>,
    /// Required (non-empty) unless mode is `CommandOnly`.
    pub urls: Vec<String>,
    pub ca_bundle: Option<PathBuf>,
    /// Pre-rendered subject line for URL payloads.
    pub subject: String,
    pub dry_run: bool,
}

/// The production [`Notify`] implementation.
pub struct Dispatcher {
    mode: DispatchMode,
    dry_run: bool,
    command: Option<CommandChannel>,
    urls: Option<UrlChannel>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Result<Self, NotifyError> {
        let command = config.command.map(CommandChannel::new);

        let urls = if config.urls.is_empty() {
            None
        } else {
            Some(UrlChannel::new(
                config.urls,
                config.subject,
                config.ca_bundle.as_deref(),
            )?)
        };

        Ok(Self {
            mode: config.mode,
            dry_run: config.dry_run,
            command,
            urls,
        })
    }

    async fn run_command(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool {
        match &self.command {
            Some(channel) => channel.run(body, cycle, buckets).await,
            None => {
                tracing::error!("dispatch mode requires a command but none is configured");

                false
            }
        }
    }

    async fn post_urls(&self, body: &str) -> bool {
        match &self.urls {
            Some(channel) => channel.post_all(body).await,
            None => {
                tracing::error!("dispatch mode requires notification URLs but none are configured");

                false
            }
        }
    }
}

#[async_trait]
impl Notify for Dispatcher {
    async fn dispatch(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool {
        if self.dry_run {
            println!("{body}");

            return true;
        }

        match self.mode {
            DispatchMode::CommandOnly => self.run_command(body, cycle, buckets).await,
            DispatchMode::UrlsOnly => self.post_urls(body).await,
            DispatchMode::Both => {
                // The command runs first; its outcome does not gate the
                // URL posts.
                let command_ok = self.run_command(body, cycle, buckets).await;
                let urls_ok = self.post_urls(body).await;

                command_ok && urls_ok
            }
        }
    }
}
