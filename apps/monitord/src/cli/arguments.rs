use std::path::PathBuf;

use clap::Parser;

/// Watches the last-handshake timestamps of the peers on a WireGuard
/// interface and sends notifications when sites drop off or come back.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// WireGuard interface to monitor.
    pub iface: String,

    /// Peer list file; discovered next to the binary or under
    /// /etc/wg-monitor when omitted.
    #[clap(long = "peer-file", short = 'p')]
    pub peer_file: Option<PathBuf>,

    /// Notification URL file; discovered like the peer file when omitted.
    #[clap(long = "url-file", short = 'u')]
    pub url_file: Option<PathBuf>,

    /// Notification command to run instead of posting to URLs.
    #[clap(long, short = 'c')]
    pub command: Option<PathBuf>,

    /// Use both the notification command and the URLs.
    #[clap(long, requires = "command")]
    pub both: bool,

    /// PEM bundle of extra CA certificates for the notification endpoints.
    #[clap(long = "ca-bundle")]
    pub ca_bundle: Option<PathBuf>,

    /// Seconds without a handshake before a peer counts as lost.
    #[clap(long = "peer-timeout", default_value_t = 600)]
    pub peer_timeout: u64,

    /// Seconds to sleep between polling cycles.
    #[clap(long = "sleep", default_value_t = 300)]
    pub sleep_interval: u64,

    /// Five reminder delays in seconds, shortest first. Outage reminders
    /// escalate along these and then repeat the last one.
    #[clap(long = "reminder-delays", num_args = 5, value_name = "SECONDS")]
    pub reminder_delays: Option<Vec<u64>>,

    /// Keep waiting for the interface to appear instead of failing at
    /// startup.
    #[clap(long = "wait-for-interface", short = 'w')]
    pub wait_for_interface: bool,

    /// Print one line per declared peer every cycle.
    #[clap(long)]
    pub progress: bool,

    /// Notification language.
    #[clap(long, short = 'l', default_value = "english")]
    pub language: String,

    /// Compose reports and print them instead of dispatching.
    #[clap(long = "dry-run")]
    pub dry_run: bool,

    /// Set when the process re-executed itself under sudo.
    #[clap(long, hide = true)]
    pub relaunched: bool,
}
