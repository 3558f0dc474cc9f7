use std::process::ExitCode;

use tokio::select;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wg_client::WgClient;
use wgmon_monitor::{Monitor, MonitorParams};
use wgmon_notify::{Dispatcher, DispatcherConfig, NotifyError};
use wgmon_report::subject_line;

use crate::cli::{startup, Cli};
use crate::config::Context;
use crate::exit::{monitor_exit, Exit};

pub(crate) async fn run(args: Cli) -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install panic reporting: {err}");

        return Exit::Failure.code();
    }

    if let Err(err) = init_tracing() {
        eprintln!("failed to initialise logging: {err}");

        return Exit::Failure.code();
    }

    let context = match Context::assemble(&args) {
        Ok(context) => context,
        Err(err) => {
            tracing::error!("invalid configuration: {err}");

            return err.exit().code();
        }
    };

    let wg = WgClient::from_env();
    let server_name = match startup::resolve_server_name(&wg, &context, args.relaunched).await {
        Ok(name) => name,
        Err(exit) => return exit.code(),
    };

    let dispatcher = match Dispatcher::new(DispatcherConfig {
        mode: context.mode,
        command: context.command.clone(),
        urls: context.urls.clone(),
        ca_bundle: context.ca_bundle.clone(),
        subject: subject_line(&context.translation, &server_name),
        dry_run: context.dry_run,
    }) {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            tracing::error!("cannot set up notification dispatch: {err}");

            return notify_exit(&err).code();
        }
    };

    let params = MonitorParams {
        iface: context.iface.clone(),
        poll_interval: context.poll_interval,
        lost_threshold: context.lost_threshold,
        peers: context.peers.clone(),
        wait_for_interface: context.wait_for_interface,
        progress: context.progress,
    };
    let monitor = Monitor::new(
        params,
        wg,
        dispatcher,
        context.translation.clone(),
        context.schedule,
        server_name,
    );

    let cancellation = CancellationToken::new();
    let mut monitor_task = tokio::spawn(monitor.run(cancellation.clone()));

    let mut sigterm =
        unix::signal(SignalKind::terminate()).expect("Failed to create SIGTERM signal handler");
    let mut sigint =
        unix::signal(SignalKind::interrupt()).expect("Failed to create SIGINT signal handler");

    let result = select! {
        result = &mut monitor_task => result,
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM signal, shutting down");
            cancellation.cancel();
            monitor_task.await
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT signal, shutting down");
            cancellation.cancel();
            monitor_task.await
        }
    };

    match result {
        Ok(Ok(())) => Exit::Success.code(),
        Ok(Err(err)) => {
            tracing::error!("monitor stopped: {err}");

            monitor_exit(&err).code()
        }
        Err(err) => {
            tracing::error!("monitor task failed: {err}");

            Exit::Exception.code()
        }
    }
}

fn notify_exit(err: &NotifyError) -> Exit {
    match err {
        NotifyError::CaBundleRead { .. } => Exit::MissingFiles,
        _ => Exit::Failure,
    }
}

fn init_tracing() -> eyre::Result<()> {
    // Keep the HTTP stack quiet unless explicitly asked for.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    Ok(())
}
