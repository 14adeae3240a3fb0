//! Shared fakes for scheduler and sweep tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use network_monitor::peers::{CommandError, MembershipError, PeerSet, PeerSource};
use network_monitor::probe::{ProbeExecutor, ProbeFailure};
use network_monitor::report::{ReportEvent, ReportSink};
use network_monitor::sweep::CycleResult;

/// How the fake executor answers a given target.
#[derive(Clone)]
pub enum Behavior {
    Reply,
    Unreachable,
    Hang,
    Delay(Duration),
}

/// Probe executor whose answers are scripted per target.
///
/// Targets without a script reply immediately.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<HashMap<String, Behavior>>>,
    live: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, target: &str, behavior: Behavior) -> Self {
        self.set(target, behavior);
        self
    }

    pub fn set(&self, target: &str, behavior: Behavior) {
        self.script.lock().unwrap().insert(target.to_string(), behavior);
    }

    /// Probes currently inside `probe`.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl ProbeExecutor for ScriptedExecutor {
    async fn probe(
        &self,
        interface: &str,
        target: &str,
        _timeout: Duration,
    ) -> Result<String, ProbeFailure> {
        self.live.fetch_add(1, Ordering::SeqCst);
        let _guard = LiveGuard(self.live.clone());
        self.calls
            .lock()
            .unwrap()
            .push((target.to_string(), Instant::now()));

        let behavior = self
            .script
            .lock()
            .unwrap()
            .get(target)
            .cloned()
            .unwrap_or(Behavior::Reply);

        match behavior {
            Behavior::Reply => Ok(reply(interface, target)),
            Behavior::Unreachable => Err(ProbeFailure::Unreachable(format!(
                "From {} icmp_seq=1 Destination Host Unreachable",
                interface
            ))),
            Behavior::Hang => std::future::pending().await,
            Behavior::Delay(d) => {
                tokio::time::sleep(d).await;
                Ok(reply(interface, target))
            }
        }
    }
}

pub fn reply(interface: &str, target: &str) -> String {
    format!("64 bytes from {}: icmp_seq=1 ttl=64 time=0.1 ms ({})", target, interface)
}

/// Peer source returning scripted answers in order, then repeating the last.
pub struct ScriptedPeerSource {
    answers: Mutex<VecDeque<Option<PeerSet>>>,
    last: Mutex<Option<PeerSet>>,
    calls: AtomicUsize,
}

impl ScriptedPeerSource {
    /// `None` entries fail as if `pxctl` exited non-zero.
    pub fn new(answers: Vec<Option<PeerSet>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerSource for ScriptedPeerSource {
    async fn peers(&self) -> Result<PeerSet, MembershipError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.answers.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = answer.clone();
                answer
            }
            None => self.last.lock().unwrap().clone(),
        };
        answer.ok_or_else(|| {
            MembershipError::Command(CommandError::Exit {
                command: "pxctl status -j".into(),
                status: "exit status: 1".into(),
                stderr: "pxctl: connection refused".into(),
            })
        })
    }
}

/// Peer source that never answers.
pub struct HangingPeerSource;

#[async_trait]
impl PeerSource for HangingPeerSource {
    async fn peers(&self) -> Result<PeerSet, MembershipError> {
        std::future::pending().await
    }
}

/// Sink that keeps every event for inspection.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingSink {
    pub fn cycles(&self) -> Vec<CycleResult> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Cycle(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(cycle, error, reused_peers)` for each membership failure.
    pub fn membership_failures(&self) -> Vec<(u64, String, usize)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::MembershipFailure {
                    cycle,
                    error,
                    reused_peers,
                } => Some((*cycle, error.clone(), *reused_peers)),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, event: ReportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn peer_set(peers: &[&str]) -> PeerSet {
    peers.iter().copied().collect()
}
