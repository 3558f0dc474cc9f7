use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wgmon_i18n::{default_catalog, Translation};
use wgmon_notify::DispatchMode;
use wgmon_report::ReportSchedule;
use wgmon_types::PeerKey;

use crate::cli::Cli;
use crate::exit::Exit;

mod discovery;
pub(crate) use discovery::{
    discover, PEER_FILE_BASE, PEER_FILE_EXT, URL_FILE_BASE, URL_FILE_EXT,
};

mod lists;
pub(crate) use lists::{parse_peer_list, parse_url_list};

/// Immutable run configuration, assembled once at startup from the CLI
/// surface and the discovered list files.
#[derive(Debug)]
pub(crate) struct Context {
    pub iface: String,
    pub poll_interval: Duration,
    pub lost_threshold: Duration,
    pub schedule: ReportSchedule,
    pub peers: BTreeSet<PeerKey>,
    pub urls: Vec<String>,
    pub command: Option<PathBuf>,
    pub ca_bundle: Option<PathBuf>,
    pub mode: DispatchMode,
    pub dry_run: bool,
    pub wait_for_interface: bool,
    pub progress: bool,
    pub translation: Translation,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum SetupError {
    #[error("unknown language {language:?}; available: {}", available.join(", "))]
    UnknownLanguage {
        language: String,
        available: Vec<String>,
    },

    #[error("no {what} file found; pass one explicitly or install it under /etc/wg-monitor")]
    MissingFile { what: &'static str },

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    BadEncoding { path: PathBuf },

    #[error("{path} contains no usable entries")]
    EmptyFile { path: PathBuf },

    #[error("reminder delays must not decrease")]
    ScheduleNotAscending,
}

impl SetupError {
    pub fn exit(&self) -> Exit {
        match self {
            SetupError::UnknownLanguage { .. } => Exit::UnknownLanguage,
            SetupError::MissingFile { .. } | SetupError::Unreadable { .. } => Exit::MissingFiles,
            SetupError::BadEncoding { .. } => Exit::BadEncoding,
            SetupError::EmptyFile { .. } => Exit::EmptyFile,
            SetupError::ScheduleNotAscending => Exit::CliParse,
        }
    }
}

impl Context {
    pub fn assemble(args: &Cli) -> Result<Self, SetupError> {
        let catalog = default_catalog();
        let translation = catalog.get(&args.language).cloned().ok_or_else(|| {
            SetupError::UnknownLanguage {
                language: args.language.clone(),
                available: catalog
                    .available_languages()
                    .iter()
                    .map(|language| language.to_string())
                    .collect(),
            }
        })?;

        let mode = match (&args.command, args.both) {
            (Some(_), true) => DispatchMode::Both,
            (Some(_), false) => DispatchMode::CommandOnly,
            (None, _) => DispatchMode::UrlsOnly,
        };

        let peers = load_peers(args)?;
        let urls = if mode == DispatchMode::CommandOnly {
            Vec::new()
        } else {
            load_urls(args)?
        };

        Ok(Self {
            iface: args.iface.clone(),
            poll_interval: Duration::from_secs(args.sleep_interval),
            lost_threshold: Duration::from_secs(args.peer_timeout),
            schedule: schedule_from(args)?,
            peers,
            urls,
            command: args.command.clone(),
            ca_bundle: args.ca_bundle.clone(),
            mode,
            dry_run: args.dry_run,
            wait_for_interface: args.wait_for_interface,
            progress: args.progress,
            translation,
        })
    }
}

fn load_peers(args: &Cli) -> Result<BTreeSet<PeerKey>, SetupError> {
    let path = discover(
        args.peer_file.as_deref(),
        &args.iface,
        PEER_FILE_BASE,
        PEER_FILE_EXT,
    )
    .ok_or(SetupError::MissingFile { what: "peer list" })?;

    let list = parse_peer_list(&read_text(&path)?);

    for entry in &list.invalid {
        tracing::warn!(path = %path.display(), %entry, "ignoring invalid peer list entry");
    }

    if list.peers.is_empty() {
        return Err(SetupError::EmptyFile { path });
    }

    Ok(list.peers)
}

fn load_urls(args: &Cli) -> Result<Vec<String>, SetupError> {
    let path = discover(
        args.url_file.as_deref(),
        &args.iface,
        URL_FILE_BASE,
        URL_FILE_EXT,
    )
    .ok_or(SetupError::MissingFile {
        what: "notification URL",
    })?;

    let urls = parse_url_list(&read_text(&path)?);

    if urls.is_empty() {
        return Err(SetupError::EmptyFile { path });
    }

    Ok(urls)
}

fn schedule_from(args: &Cli) -> Result<ReportSchedule, SetupError> {
    let Some(delays) = &args.reminder_delays else {
        return Ok(ReportSchedule::default());
    };

    if delays.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(SetupError::ScheduleNotAscending);
    }

    // clap enforces exactly five values.
    let mut schedule = [Duration::ZERO; 5];
    for (slot, seconds) in schedule.iter_mut().zip(delays) {
        *slot = Duration::from_secs(*seconds);
    }

    Ok(ReportSchedule::new(schedule))
}

fn read_text(path: &Path) -> Result<String, SetupError> {
    let bytes = std::fs::read(path).map_err(|source| SetupError::Unreadable {
        path: PathBuf::from(path),
        source,
    })?;

    String::from_utf8(bytes).map_err(|_| SetupError::BadEncoding {
        path: PathBuf::from(path),
    })
}
