//! The monitoring loop.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime};

use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wg_client::{ProbeError, WgApi};
use wgmon_i18n::Translation;
use wgmon_notify::Notify;
use wgmon_report::{compose_body, render_peer_name, ReportSchedule, ReportScheduler};
use wgmon_types::{PeerKey, PeerRegistry, PeerState, SortedBuckets};

use crate::MonitorError;

/// How often the probe is reinvoked while the interface is absent.
pub const INTERFACE_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Startup knobs for the monitoring loop.
#[derive(Debug, Clone)]
pub struct MonitorParams {
    pub iface: String,
    /// Inter-cycle sleep.
    pub poll_interval: Duration,
    /// Handshake age beyond which a peer counts as lost.
    pub lost_threshold: Duration,
    /// The declared peer set. Undeclared peers showing up in probe output
    /// are tracked but never stepped or reported.
    pub peers: BTreeSet<PeerKey>,
    /// Whether an absent interface at startup is waited for rather than
    /// fatal.
    pub wait_for_interface: bool,
    /// Emit one line per declared peer every cycle.
    pub progress: bool,
}

/// One monitoring agent: owns the registry and the report cadence, drives
/// one cycle at a time.
pub struct Monitor<W, N> {
    pub(crate) params: MonitorParams,
    pub(crate) wg: W,
    pub(crate) notifier: N,
    pub(crate) translation: Translation,
    pub(crate) server_name: String,
    pub(crate) registry: PeerRegistry,
    pub(crate) scheduler: ReportScheduler,
    pub(crate) started_at: SystemTime,
    pub(crate) cycle: u64,
}

/// Outcome of a cancellable pause.
enum Pause {
    Elapsed,
    Shutdown,
}

impl<W, N> Monitor<W, N>
where
    W: WgApi,
    N: Notify,
{
    pub fn new(
        params: MonitorParams,
        wg: W,
        notifier: N,
        translation: Translation,
        schedule: ReportSchedule,
        server_name: String,
    ) -> Self {
        Self {
            params,
            wg,
            notifier,
            translation,
            server_name,
            registry: PeerRegistry::new(),
            scheduler: ReportScheduler::new(schedule),
            started_at: SystemTime::now(),
            cycle: 0,
        }
    }

    /// Run until cancelled or until a fatal probe classification.
    pub async fn run(mut self, cancellation: CancellationToken) -> Result<(), MonitorError> {
        info!(
            server = %self.server_name,
            iface = %self.params.iface,
            peers = self.params.peers.len(),
            "monitoring peers",
        );

        loop {
            let now = SystemTime::now();

            match self.run_cycle(now).await {
                Ok(()) => {}
                Err(ProbeError::NoSuchInterface { iface }) => {
                    if self.cycle == 0 && !self.params.wait_for_interface {
                        return Err(MonitorError::Startup {
                            source: ProbeError::NoSuchInterface { iface },
                        });
                    }

                    info!(%iface, "interface went away, waiting for it to return");
                    self.wait_for_interface().await;

                    // A shutdown requested during the wait takes effect now
                    // that the interface has answered again.
                    if cancellation.is_cancelled() {
                        return Ok(());
                    }

                    // Interface is back; start the next cycle right away.
                    continue;
                }
                Err(source @ (ProbeError::NeedElevation | ProbeError::ToolMissing)) => {
                    return Err(if self.cycle == 0 {
                        MonitorError::Startup { source }
                    } else {
                        MonitorError::Runtime { source }
                    });
                }
                Err(source) => {
                    if self.cycle == 0 {
                        return Err(MonitorError::Startup { source });
                    }

                    warn!(err = %source, "probe failed, skipping this cycle");
                }
            }

            if let Pause::Shutdown = self.pause(&cancellation, self.params.poll_interval).await {
                return Ok(());
            }
        }
    }

    /// One cycle: probe, step every declared peer, sort, consult the
    /// scheduler, dispatch if due. The cycle index only advances when the
    /// probe succeeded, so a disrupted cycle is retried as itself.
    pub(crate) async fn run_cycle(&mut self, now: SystemTime) -> Result<(), ProbeError> {
        let rows = self.wg.latest_handshakes(&self.params.iface).await?;
        self.registry.apply(rows);

        let mut changed: Vec<PeerKey> = Vec::new();
        for peer in self.registry.iter_mut() {
            if !self.params.peers.contains(peer.key()) {
                continue;
            }

            let timed_out =
                peer.timed_out(now, self.params.lost_threshold, self.started_at);
            if peer.step(timed_out) {
                changed.push(peer.key().clone());
            }
        }

        if self.params.progress {
            self.print_progress();
        }

        let buckets = SortedBuckets::collect(&self.registry);
        let decision = self
            .scheduler
            .decide(now, self.cycle == 0, &changed, &buckets);

        if decision.should_report {
            let body = compose_body(&self.translation, &self.server_name, &buckets, self.cycle);
            let delivered = self.notifier.dispatch(&body, self.cycle, &buckets).await;

            if !delivered {
                warn!(cycle = self.cycle, "report dispatch failed");
            }

            self.scheduler
                .commit(now, decision, buckets.all_present(), delivered);
        }

        self.cycle += 1;

        Ok(())
    }

    /// Reinvoke the probe every 10 seconds until the interface answers
    /// again. Registry and cadence state are left untouched throughout.
    ///
    /// The retry deliberately ignores shutdown requests: the process is
    /// expected to run supervised, and a supervisor restart is the way out
    /// of an interface that never returns.
    pub(crate) async fn wait_for_interface(&self) {
        loop {
            sleep(INTERFACE_RETRY_DELAY).await;

            match self.wg.latest_handshakes(&self.params.iface).await {
                Ok(_) => {
                    info!(iface = %self.params.iface, "interface is back");

                    return;
                }
                Err(ProbeError::NoSuchInterface { .. }) => {}
                // Some other failure: let the main loop classify it on the
                // next cycle's probe.
                Err(_) => return,
            }
        }
    }

    fn print_progress(&self) {
        let mut declared: Vec<_> = self
            .registry
            .iter()
            .filter(|peer| self.params.peers.contains(peer.key()))
            .collect();
        declared.sort_by(|a, b| a.key().cmp(b.key()));

        for peer in declared {
            if peer.state() == PeerState::Unset {
                continue;
            }

            println!(
                "    {}: {}",
                render_peer_name(&self.translation, peer.key()),
                peer.state(),
            );
        }
    }

    async fn pause(&self, cancellation: &CancellationToken, duration: Duration) -> Pause {
        select! {
            _ = sleep(duration) => Pause::Elapsed,
            _ = cancellation.cancelled() => Pause::Shutdown,
        }
    }
}
