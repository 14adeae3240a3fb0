//! Scheduler loop: peer refresh policy, membership fallback, resource
//! release across cycles, cadence and shutdown.

use std::sync::Arc;
use std::time::Duration;

use network_monitor::config::PeerRefresh;
use network_monitor::peers::PeerSet;
use network_monitor::probe::ProbeFailure;
use network_monitor::sweep::{CycleEnd, SweepSettings};
use network_monitor::{Scheduler, SchedulerSettings, Shutdown};

mod common;
use common::{
    peer_set, Behavior, CollectingSink, HangingPeerSource, ScriptedExecutor, ScriptedPeerSource,
};

const LOCAL: &str = "10.0.0.2";

fn settings(refresh: PeerRefresh) -> SchedulerSettings {
    SchedulerSettings {
        sweep: SweepSettings {
            interface: "eth1".into(),
            probe_timeout: Duration::from_secs(5),
            cycle_deadline: Duration::from_secs(10),
        },
        cadence: Duration::from_secs(3),
        peer_refresh: refresh,
        membership_timeout: Duration::from_secs(2),
    }
}

fn scheduler(
    settings: SchedulerSettings,
    initial: PeerSet,
    source: Arc<dyn network_monitor::peers::PeerSource>,
    executor: &ScriptedExecutor,
    sink: &Arc<CollectingSink>,
) -> Scheduler {
    Scheduler::new(
        settings,
        LOCAL.to_string(),
        initial,
        source,
        Arc::new(executor.clone()),
        sink.clone(),
    )
}

#[tokio::test]
async fn test_membership_failure_reuses_last_known_peers() {
    let cycle4 = peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
    let source = Arc::new(ScriptedPeerSource::new(vec![
        Some(peer_set(&["10.0.0.1", "10.0.0.2"])),
        Some(peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])),
        Some(peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])),
        Some(cycle4.clone()),
        None,
        Some(peer_set(&["10.0.0.1", "10.0.0.2"])),
    ]));
    let executor = ScriptedExecutor::new();
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let mut scheduler = scheduler(
        settings(PeerRefresh::EveryCycle),
        peer_set(&["10.0.0.9"]),
        source.clone(),
        &executor,
        &sink,
    );

    for _ in 0..6 {
        scheduler.run_cycle(&mut listener).await;
    }

    let cycles = sink.cycles();
    assert_eq!(cycles.len(), 6);
    assert_eq!(cycles[3].len(), 3);

    // Cycle 5 probed the cycle-4 set.
    let mut cycle5: Vec<_> = cycles[4].outcomes.iter().map(|o| o.peer().to_string()).collect();
    cycle5.sort();
    assert_eq!(cycle5, vec!["10.0.0.1", "10.0.0.3", "10.0.0.4"]);
    assert_eq!(cycles[4].success_count(), 3);

    let failures = sink.membership_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 5);
    assert_eq!(failures[0].2, cycle4.len());
    assert!(failures[0].1.contains("connection refused"));

    // Recovery on cycle 6.
    assert_eq!(cycles[5].len(), 1);
    assert_eq!(scheduler.peers(), &peer_set(&["10.0.0.1", "10.0.0.2"]));
    assert_eq!(source.calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_membership_source_is_bounded() {
    let executor = ScriptedExecutor::new();
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let mut scheduler = scheduler(
        settings(PeerRefresh::EveryCycle),
        peer_set(&["10.0.0.1", "10.0.0.2"]),
        Arc::new(HangingPeerSource),
        &executor,
        &sink,
    );

    let result = scheduler.run_cycle(&mut listener).await;

    assert_eq!(result.len(), 1);
    assert!(result.outcome_for("10.0.0.1").unwrap().is_success());
    let failures = sink.membership_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].1.contains("did not finish"));
}

#[tokio::test]
async fn test_startup_policy_never_refetches() {
    let source = Arc::new(ScriptedPeerSource::new(vec![None]));
    let executor = ScriptedExecutor::new();
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let mut scheduler = scheduler(
        settings(PeerRefresh::Startup),
        peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]),
        source.clone(),
        &executor,
        &sink,
    );

    for _ in 0..3 {
        let result = scheduler.run_cycle(&mut listener).await;
        assert_eq!(result.len(), 2);
    }
    assert_eq!(source.calls(), 0);
    assert!(sink.membership_failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_probe_outlives_its_cycle() {
    let peers = peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5"]);
    let source = Arc::new(ScriptedPeerSource::new(vec![Some(peers.clone())]));
    let executor = ScriptedExecutor::new()
        .with("10.0.0.3", Behavior::Hang)
        .with("10.0.0.4", Behavior::Unreachable)
        .with("10.0.0.5", Behavior::Delay(Duration::from_millis(20)));
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    let mut settings = settings(PeerRefresh::EveryCycle);
    settings.sweep.cycle_deadline = Duration::from_millis(50);
    settings.sweep.probe_timeout = Duration::from_secs(1);
    let mut scheduler = scheduler(settings, peers, source, &executor, &sink);

    for _ in 0..1000 {
        let result = scheduler.run_cycle(&mut listener).await;
        assert_eq!(result.len(), 4);
        assert_eq!(result.end, CycleEnd::DeadlineElapsed);
        assert_eq!(scheduler.live_probes(), 0);
        assert_eq!(executor.live(), 0);
    }

    assert_eq!(scheduler.cycles_run(), 1000);
    let cycles = sink.cycles();
    assert_eq!(cycles.len(), 1000);
    assert!(cycles.iter().all(|c| {
        c.outcome_for("10.0.0.3").and_then(|o| o.failure()) == Some(&ProbeFailure::Cancelled)
            && c.outcome_for("10.0.0.5").map(|o| o.is_success()) == Some(true)
            && c.outcome_for("10.0.0.2").is_none()
    }));
}

#[tokio::test(start_paused = true)]
async fn test_cadence_measured_from_cycle_end() {
    let peers = peer_set(&["10.0.0.1"]);
    let source = Arc::new(ScriptedPeerSource::new(vec![Some(peers.clone())]));
    let executor = ScriptedExecutor::new().with("10.0.0.1", Behavior::Delay(Duration::from_secs(2)));
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();

    let scheduler = scheduler(settings(PeerRefresh::EveryCycle), peers, source, &executor, &sink);
    let handle = tokio::spawn(scheduler.run(shutdown.subscribe()));

    // Cycles start at t=0, 5, 10; stop while the third is in flight.
    tokio::time::sleep(Duration::from_secs(11)).await;
    shutdown.trigger();
    handle.await.unwrap();

    let starts = executor.call_times();
    assert_eq!(starts.len(), 3);
    let gap = starts[1] - starts[0];
    assert!(gap >= Duration::from_secs(5), "gap was {:?}", gap);
    assert!(gap < Duration::from_millis(5100), "gap was {:?}", gap);

    let cycles = sink.cycles();
    assert_eq!(cycles.len(), 3);
    assert_eq!(cycles[2].end, CycleEnd::Shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_in_flight_cycle() {
    let peers = peer_set(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    let source = Arc::new(ScriptedPeerSource::new(vec![Some(peers.clone())]));
    let executor = ScriptedExecutor::new()
        .with("10.0.0.1", Behavior::Hang)
        .with("10.0.0.3", Behavior::Hang);
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();

    let mut settings = settings(PeerRefresh::EveryCycle);
    settings.sweep.probe_timeout = Duration::from_secs(600);
    settings.sweep.cycle_deadline = Duration::from_secs(300);
    let scheduler = scheduler(settings, peers, source, &executor, &sink);
    let handle = tokio::spawn(scheduler.run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(executor.live(), 2);
    shutdown.trigger();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    assert_eq!(executor.live(), 0);
    let cycles = sink.cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].end, CycleEnd::Shutdown);
    assert_eq!(cycles[0].len(), 2);
    assert_eq!(cycles[0].failure_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_sleep_stops_loop() {
    let peers = peer_set(&["10.0.0.1"]);
    let source = Arc::new(ScriptedPeerSource::new(vec![Some(peers.clone())]));
    let executor = ScriptedExecutor::new();
    let sink = Arc::new(CollectingSink::default());
    let shutdown = Shutdown::new();

    let mut settings = settings(PeerRefresh::EveryCycle);
    settings.cadence = Duration::from_secs(60);
    let scheduler = scheduler(settings, peers, source, &executor, &sink);
    let handle = tokio::spawn(scheduler.run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown.trigger();
    handle.await.unwrap();

    let cycles = sink.cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].end, CycleEnd::Completed);
}
