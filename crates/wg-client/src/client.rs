use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use wgmon_types::{HandshakeRow, PeerKey};

use crate::error::{classify_failure, ProbeError};
use crate::parse::parse_latest_handshakes;
use crate::{Result, WgApi};

/// Environment variable overriding the path to the control tool.
pub const WG_ENV_VAR: &str = "WG";
/// Default path of the control tool.
pub const DEFAULT_WG_PATH: &str = "/usr/bin/wg";

/// Probe implementation that spawns the `wg` command-line tool.
#[derive(Debug, Clone)]
pub struct Client {
    tool: PathBuf,
}

impl Client {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Resolve the tool path from the `WG` environment variable, falling
    /// back to `/usr/bin/wg` when unset or empty.
    pub fn from_env() -> Self {
        Self::new(tool_path_from(env::var_os(WG_ENV_VAR)))
    }

    pub fn tool(&self) -> &std::path::Path {
        &self.tool
    }

    async fn show(&self, iface: &str, subcommand: &str) -> Result<String> {
        let output = Command::new(&self.tool)
            .args(["show", iface, subcommand])
            .output()
            .await
            .map_err(|err| spawn_error(&err))?;

        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stdout));

            return Err(classify_failure(iface, &text));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl WgApi for Client {
    async fn latest_handshakes(&self, iface: &str) -> Result<Vec<HandshakeRow>> {
        let output = self.show(iface, "latest-handshakes").await?;

        Ok(parse_latest_handshakes(&output))
    }

    async fn public_key(&self, iface: &str) -> Result<PeerKey> {
        let output = self.show(iface, "public-key").await?;
        let line = output.trim();

        PeerKey::new(line).map_err(|err| ProbeError::Generic {
            msg: format!("unexpected public-key output {line:?}: {err}"),
        })
    }
}

fn tool_path_from(var: Option<OsString>) -> PathBuf {
    match var {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_WG_PATH),
    }
}

fn spawn_error(err: &io::Error) -> ProbeError {
    if err.kind() == io::ErrorKind::NotFound {
        return ProbeError::ToolMissing;
    }

    ProbeError::Generic {
        msg: err.to_string(),
    }
}
