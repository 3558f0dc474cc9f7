//! Startup probing: server-name resolution and privilege re-execution.

use wg_client::{ProbeError, WgApi, WgClient};
use wgmon_monitor::INTERFACE_RETRY_DELAY;
use wgmon_report::render_peer_name;

use crate::config::Context;
use crate::exit::{probe_exit, Exit};

/// Ask the interface for this node's own public key and derive the display
/// name from it.
///
/// An absent interface is waited for when the context says so; a permission
/// failure triggers one attempt to re-execute the process under sudo.
pub(crate) async fn resolve_server_name(
    wg: &WgClient,
    context: &Context,
    relaunched: bool,
) -> Result<String, Exit> {
    loop {
        match wg.public_key(&context.iface).await {
            Ok(key) => return Ok(render_peer_name(&context.translation, &key)),
            Err(ProbeError::NoSuchInterface { iface }) if context.wait_for_interface => {
                tracing::info!(%iface, "interface not present yet, waiting");
                tokio::time::sleep(INTERFACE_RETRY_DELAY).await;
            }
            Err(ProbeError::NeedElevation) if !relaunched => {
                tracing::info!("wg requires elevated privileges, relaunching under sudo");

                // Only returns if the exec itself failed.
                let err = reexec_with_sudo();
                tracing::error!(%err, "failed to relaunch under sudo");

                return Err(Exit::Permissions);
            }
            Err(ProbeError::ToolMissing) => {
                tracing::error!(
                    tool = %wg.tool().display(),
                    "wg executable not found; set the WG environment variable to override the path",
                );

                return Err(Exit::CommandNotFound);
            }
            Err(err) => {
                tracing::error!(%err, "cannot query wg");

                return Err(probe_exit(&err));
            }
        }
    }
}

/// Replace this process with a sudo invocation of itself, marking the child
/// so it cannot re-exec again.
fn reexec_with_sudo() -> std::io::Error {
    use std::os::unix::process::CommandExt;

    const SUDO: &str = "/usr/bin/sudo";
    const RELAUNCH_MARKER: &str = "--relaunched";

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(err) => return err,
    };

    std::process::Command::new(SUDO)
        .arg(exe)
        .args(std::env::args_os().skip(1))
        .arg(RELAUNCH_MARKER)
        .exec()
}
