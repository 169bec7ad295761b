//! Bounded fan-out of probes.
//!
//! A single coordinator pulls targets off the queue in order and spawns one
//! probe task per target, never more than the configured cap at once. Each
//! target is claimed exactly once. Outcomes are collected in completion
//! order; putting them back in target order is the aggregator's job.
//!
//! Two things stop dispatching early:
//! * the overall deadline, which also cancels probes already in flight, and
//! * a caller's [`StopSignal`], which lets in-flight probes run to completion.
//!
//! Either way every target still gets an outcome.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use portcat_common::config::Config;
use portcat_common::network::target::Target;
use portcat_common::report::{DEADLINE_EXCEEDED, ProbeOutcome, STOPPED_BY_CALLER};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::network::tcp::Prober;

const TASK_FAILED: &str = "probe task failed";

/// Lets a caller stop a running scan from elsewhere.
///
/// Clones share the same signal.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// No new probes are dispatched after this.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    async fn stopped(&self) {
        raised(self.tx.subscribe()).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Deadline,
    Stopped,
}

impl Halt {
    fn detail(self) -> &'static str {
        match self {
            Halt::Deadline => DEADLINE_EXCEEDED,
            Halt::Stopped => STOPPED_BY_CALLER,
        }
    }
}

/// Probes every target and returns one outcome per target, unordered.
pub async fn run(
    targets: &[Target],
    prober: Arc<dyn Prober>,
    cfg: &Config,
    stop: Option<&StopSignal>,
) -> Vec<ProbeOutcome> {
    let cap: usize = cfg.concurrency_cap();
    // A budget too large to represent is no deadline at all.
    let deadline: Option<Instant> = cfg
        .deadline
        .and_then(|budget| Instant::now().checked_add(budget));
    let (abort_tx, abort_rx) = watch::channel(false);

    let mut queue = targets.iter().copied();
    let mut in_flight: JoinSet<ProbeOutcome> = JoinSet::new();
    let mut unsettled: HashSet<Target> = HashSet::with_capacity(cap.min(targets.len()));
    let mut outcomes: Vec<ProbeOutcome> = Vec::with_capacity(targets.len());
    let mut halted: Option<Halt> = None;

    'dispatch: loop {
        while in_flight.len() >= cap {
            tokio::select! {
                biased;
                _ = until_stopped(stop) => {
                    halted = Some(Halt::Stopped);
                    break 'dispatch;
                }
                _ = until(deadline) => {
                    halted = Some(Halt::Deadline);
                    break 'dispatch;
                }
                joined = in_flight.join_next() => {
                    if let Some(joined) = joined {
                        settle(joined, &mut unsettled, &mut outcomes);
                    }
                }
            }
        }

        if stop.is_some_and(StopSignal::is_stopped) {
            halted = Some(Halt::Stopped);
            break;
        }
        if deadline.is_some_and(|at| Instant::now() >= at) {
            halted = Some(Halt::Deadline);
            break;
        }

        let Some(target) = queue.next() else {
            break;
        };
        unsettled.insert(target);
        in_flight.spawn(probe_task(
            prober.clone(),
            target,
            cfg.timeout,
            abort_rx.clone(),
        ));
    }

    let mut aborted: bool = false;
    if let Some(halt) = halted {
        let skipped: Vec<Target> = queue.collect();
        warn!(
            "{}, {} target(s) left unprobed",
            halt.detail(),
            skipped.len()
        );
        outcomes.extend(
            skipped
                .into_iter()
                .map(|target| ProbeOutcome::error(target, Duration::ZERO, halt.detail())),
        );

        if halt == Halt::Deadline {
            abort_tx.send_replace(true);
            aborted = true;
        }
    }

    loop {
        tokio::select! {
            joined = in_flight.join_next() => match joined {
                Some(joined) => settle(joined, &mut unsettled, &mut outcomes),
                None => break,
            },
            _ = until(deadline), if !aborted => {
                warn!("{DEADLINE_EXCEEDED}, cancelling {} probe(s) in flight", in_flight.len());
                abort_tx.send_replace(true);
                aborted = true;
            }
        }
    }

    // Only a task that never returned can leave a target here.
    outcomes.extend(unsettled.into_iter().map(|target| {
        ProbeOutcome::error(
            target,
            Duration::ZERO,
            format!("{TASK_FAILED}: task did not return"),
        )
    }));

    debug!("scheduler finished with {} outcome(s)", outcomes.len());
    outcomes
}

async fn probe_task(
    prober: Arc<dyn Prober>,
    target: Target,
    timeout: Duration,
    abort: watch::Receiver<bool>,
) -> ProbeOutcome {
    let start: Instant = Instant::now();
    let mut probe = tokio::spawn(async move { prober.probe(target, timeout).await });
    tokio::select! {
        joined = &mut probe => match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{TASK_FAILED} for {target}: {e}");
                ProbeOutcome::error(target, start.elapsed(), format!("{TASK_FAILED}: {e}"))
            }
        },
        _ = raised(abort) => {
            probe.abort();
            ProbeOutcome::error(target, start.elapsed(), DEADLINE_EXCEEDED)
        }
    }
}

fn settle(
    joined: Result<ProbeOutcome, JoinError>,
    unsettled: &mut HashSet<Target>,
    outcomes: &mut Vec<ProbeOutcome>,
) {
    match joined {
        Ok(outcome) => {
            unsettled.remove(&outcome.target);
            outcomes.push(outcome);
        }
        Err(e) => warn!("{TASK_FAILED}: {e}"),
    }
}

/// Resolves once the flag turns true. Pends forever if the sender is gone.
async fn raised(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn until_stopped(stop: Option<&StopSignal>) {
    match stop {
        Some(signal) => signal.stopped().await,
        None => std::future::pending().await,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
