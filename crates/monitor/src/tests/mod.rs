use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;
use wg_client::{MockWgApi, ProbeError};
use wgmon_i18n::default_catalog;
use wgmon_notify::MockNotify;
use wgmon_report::ReportSchedule;
use wgmon_types::{HandshakeRow, HandshakeStamp, PeerKey, PeerState};

use crate::{Monitor, MonitorError, MonitorParams};

const TIMEOUT: Duration = Duration::from_secs(600);
const HOUR: u64 = 60 * 60;
/// Process start of the simulated runs, in seconds since the epoch.
const BASE: u64 = 2_000_000_000;

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

fn key(prefix: &str) -> PeerKey {
    let mut raw = String::from(prefix);
    raw.push_str(&"A".repeat(43 - prefix.len()));
    raw.push('=');

    PeerKey::new(raw).unwrap()
}

fn row(key: &PeerKey, secs: u64) -> HandshakeRow {
    HandshakeRow {
        key: key.clone(),
        stamp: HandshakeStamp::At(at(secs)),
    }
}

type ProbeBatch = Result<Vec<HandshakeRow>, ProbeError>;

/// A probe that answers `latest-handshakes` with the scripted batches in
/// order.
fn scripted_probe(batches: Vec<ProbeBatch>) -> MockWgApi {
    let queue = Arc::new(Mutex::new(VecDeque::from(batches)));
    let mut wg = MockWgApi::new();

    wg.expect_latest_handshakes().returning(move |_| {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .expect("probe called more often than scripted")
    });

    wg
}

/// A notifier that records every dispatched body and cycle index.
fn recording_notifier(delivered: bool) -> (MockNotify, Arc<Mutex<Vec<(String, u64)>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let record = calls.clone();

    let mut notify = MockNotify::new();
    notify.expect_dispatch().returning(move |body, cycle, _| {
        record.lock().unwrap().push((body.to_owned(), cycle));

        delivered
    });

    (notify, calls)
}

fn monitor(
    wg: MockWgApi,
    notify: MockNotify,
    peers: &[&PeerKey],
) -> Monitor<MockWgApi, MockNotify> {
    let params = MonitorParams {
        iface: "wg0".into(),
        poll_interval: Duration::from_secs(60),
        lost_threshold: TIMEOUT,
        peers: peers.iter().map(|key| (*key).clone()).collect::<BTreeSet<_>>(),
        wait_for_interface: false,
        progress: false,
    };

    let translation = default_catalog().get("english").unwrap().clone();
    let mut monitor = Monitor::new(
        params,
        wg,
        notify,
        translation,
        ReportSchedule::default(),
        "Hub".into(),
    );
    monitor.started_at = at(BASE);

    monitor
}

#[tokio::test]
async fn cold_start_with_everyone_present_reports_startup_line() {
    let a = key("alpha/a");
    let b = key("bravo/b");

    let wg = scripted_probe(vec![Ok(vec![row(&a, BASE - 60), row(&b, BASE - 120)])]);
    let (notify, calls) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a, &b]);

    monitor.run_cycle(at(BASE)).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        &[("Hub is up and running again.".to_owned(), 0)],
    );
    assert_eq!(monitor.cycle, 1);
    assert_eq!(
        monitor.registry.get(&a).unwrap().state(),
        PeerState::Present,
    );
}

#[tokio::test]
async fn loss_is_reported_once_then_goes_quiet() {
    let a = key("alpha/a");
    let b = key("bravo/b");

    let now0 = BASE;
    let now1 = now0 + 60;
    let now2 = now1 + 60;

    let wg = scripted_probe(vec![
        Ok(vec![row(&a, now0 - 60), row(&b, now0 - 60)]),
        // A's handshake has aged past the threshold; B keeps handshaking.
        Ok(vec![row(&a, now1 - 900), row(&b, now1 - 10)]),
        Ok(vec![row(&a, now1 - 900), row(&b, now2 - 10)]),
    ]);
    let (notify, calls) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a, &b]);

    monitor.run_cycle(at(now0)).await.unwrap();
    monitor.run_cycle(at(now1)).await.unwrap();

    {
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2, "startup report plus the loss report");

        let (body, cycle) = &calls[1];
        assert_eq!(*cycle, 1);
        assert!(body.starts_with("Just lost contact with 1 peer:"));
        assert!(body.contains("Alpha, last seen "));
    }
    assert_eq!(
        monitor.registry.get(&a).unwrap().state(),
        PeerState::JustLost,
    );

    // Next cycle: JustLost settles into StillLost, nothing changed, no
    // reminder is due yet, so no report goes out.
    monitor.run_cycle(at(now2)).await.unwrap();

    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(
        monitor.registry.get(&a).unwrap().state(),
        PeerState::StillLost,
    );
}

#[tokio::test]
async fn persistent_outage_triggers_a_reminder_after_the_first_delay() {
    let a = key("alpha/a");

    let now0 = BASE;
    // By the second cycle the only handshake on record has aged out.
    let now1 = now0 + 700;
    let now2 = now1 + 6 * HOUR;

    let stale = now0 - 60;
    let wg = scripted_probe(vec![
        Ok(vec![row(&a, stale)]),
        Ok(vec![row(&a, stale)]),
        Ok(vec![row(&a, stale)]),
    ]);
    let (notify, calls) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a]);

    monitor.run_cycle(at(now0)).await.unwrap();
    monitor.run_cycle(at(now1)).await.unwrap();
    monitor.run_cycle(at(now2)).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3, "startup, loss, reminder");

    let (body, _) = &calls[2];
    assert!(body.starts_with("Still missing contact with 1 peer:"));
    assert_eq!(monitor.scheduler.reminder_counter(), 1);
}

#[tokio::test]
async fn return_only_report_preserves_the_cadence() {
    let a = key("alpha/a");
    let b = key("bravo/b");

    let now0 = BASE;
    // By the second cycle both recorded handshakes have aged out.
    let now1 = now0 + 700;
    let now2 = now1 + 60;

    let stale = now0 - 60;
    let wg = scripted_probe(vec![
        Ok(vec![row(&a, stale), row(&b, stale)]),
        // Both age out together.
        Ok(vec![row(&a, stale), row(&b, stale)]),
        // A is handshaking again; B is not.
        Ok(vec![row(&a, now2 - 10), row(&b, stale)]),
    ]);
    let (notify, calls) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a, &b]);

    monitor.run_cycle(at(now0)).await.unwrap();
    monitor.run_cycle(at(now1)).await.unwrap();

    let anchor = monitor.scheduler.last_report_time();
    let counter = monitor.scheduler.reminder_counter();

    monitor.run_cycle(at(now2)).await.unwrap();

    {
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);

        let (body, _) = &calls[2];
        assert!(body.starts_with("Just regained contact with 1 peer:"));
        assert!(body.contains("Alpha, back since "));
        assert!(
            !body.contains("All peers are present again."),
            "B is still lost",
        );
    }

    // The good-news report did not move the reminder cadence.
    assert_eq!(monitor.scheduler.last_report_time(), anchor);
    assert_eq!(monitor.scheduler.reminder_counter(), counter);
}

#[tokio::test]
async fn interface_outage_preserves_registry_and_cycle() {
    let a = key("alpha/a");

    let now0 = BASE;
    let now1 = now0 + 60;

    let wg = scripted_probe(vec![
        Ok(vec![row(&a, now0 - 60)]),
        Err(ProbeError::NoSuchInterface {
            iface: "wg0".into(),
        }),
        Ok(vec![row(&a, now1 - 900)]),
    ]);
    let (notify, calls) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a]);

    monitor.run_cycle(at(now0)).await.unwrap();

    let err = monitor.run_cycle(at(now1)).await.unwrap_err();
    assert!(matches!(err, ProbeError::NoSuchInterface { .. }));

    // The disrupted cycle left everything as it was.
    assert_eq!(monitor.cycle, 1);
    assert_eq!(
        monitor.registry.get(&a).unwrap().state(),
        PeerState::Present,
    );

    // Once the interface is back, the loss is picked up from the preserved
    // state.
    monitor.run_cycle(at(now1)).await.unwrap();

    let calls = calls.lock().unwrap();
    assert!(calls[1].0.starts_with("Just lost contact with 1 peer:"));
}

#[tokio::test(start_paused = true)]
async fn interface_wait_reprobes_every_ten_seconds() {
    let a = key("alpha/a");

    let wg = scripted_probe(vec![
        Err(ProbeError::NoSuchInterface {
            iface: "wg0".into(),
        }),
        Err(ProbeError::NoSuchInterface {
            iface: "wg0".into(),
        }),
        Ok(vec![]),
    ]);
    let (notify, _) = recording_notifier(true);
    let monitor = monitor(wg, notify, &[&a]);

    let started = tokio::time::Instant::now();
    monitor.wait_for_interface().await;

    assert_eq!(started.elapsed(), Duration::from_secs(30));
}

#[tokio::test]
async fn undeclared_peers_are_tracked_but_never_stepped() {
    let a = key("alpha/a");
    let stranger = key("strange");

    let wg = scripted_probe(vec![Ok(vec![
        row(&a, BASE - 60),
        row(&stranger, BASE - 9_000),
    ])]);
    let (notify, _) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a]);

    monitor.run_cycle(at(BASE)).await.unwrap();

    let stranger_peer = monitor.registry.get(&stranger).unwrap();
    assert_eq!(stranger_peer.state(), PeerState::Unset);
}

#[tokio::test]
async fn failed_dispatch_leaves_the_report_pending() {
    let a = key("alpha/a");

    let wg = scripted_probe(vec![Ok(vec![row(&a, BASE - 60)])]);
    let (notify, calls) = recording_notifier(false);
    let mut monitor = monitor(wg, notify, &[&a]);

    monitor.run_cycle(at(BASE)).await.unwrap();

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(monitor.scheduler.last_report_time(), None);
}

#[tokio::test]
async fn startup_probe_failures_are_fatal() {
    let a = key("alpha/a");

    let wg = scripted_probe(vec![Err(ProbeError::ToolMissing)]);
    let (notify, _) = recording_notifier(true);
    let monitor = monitor(wg, notify, &[&a]);

    let err = monitor.run(CancellationToken::new()).await.unwrap_err();

    assert!(err.is_startup());
    assert_eq!(*err.probe_error(), ProbeError::ToolMissing);
}

#[tokio::test(start_paused = true)]
async fn need_elevation_mid_run_is_fatal() {
    let a = key("alpha/a");

    let wg = scripted_probe(vec![
        Ok(vec![row(&a, BASE - 60)]),
        Err(ProbeError::NeedElevation),
    ]);
    let (notify, _) = recording_notifier(true);
    let mut monitor = monitor(wg, notify, &[&a]);
    // run() would probe with the real clock; anchor the synthetic history
    // near it instead.
    monitor.started_at = SystemTime::now();

    let err = monitor.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, MonitorError::Runtime { .. }));
    assert_eq!(*err.probe_error(), ProbeError::NeedElevation);
}
