use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use portcat_common::network::target::Target;
use portcat_common::report::{ProbeOutcome, ProbeStatus};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Runs a single reachability check against one target.
///
/// Implementations must always produce an outcome; failures are classified,
/// never propagated.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: Target, timeout: Duration) -> ProbeOutcome;
}

/// Plain TCP connect probing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: Target, probe_timeout: Duration) -> ProbeOutcome {
        handshake_probe(target, probe_timeout).await
    }
}

/// How a connect attempt ended, before classification.
#[derive(Debug)]
pub enum Attempt {
    Connected,
    Failed(io::Error),
    TimedOut,
}

/// Attempts one TCP handshake with `target`.
///
/// The socket is released on every path: an established stream is dropped
/// right away, and a timed-out connect is dropped together with its future.
pub async fn handshake_probe(target: Target, probe_timeout: Duration) -> ProbeOutcome {
    debug!("Connecting to {target}");
    let start: Instant = Instant::now();

    let connect = TcpStream::connect(target.socket_addr());
    let attempt: Attempt = match timeout(probe_timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Attempt::Connected
        }
        Ok(Err(e)) => Attempt::Failed(e),
        Err(_elapsed) => Attempt::TimedOut,
    };

    let (status, detail) = classify(attempt);
    let elapsed: Duration = start.elapsed();

    if status == ProbeStatus::Open {
        info!("Connected to {target}");
    } else {
        debug!("{target} is {status} after {elapsed:?}");
    }

    ProbeOutcome {
        target,
        status,
        elapsed,
        detail,
    }
}

/// Maps a connect attempt onto a probe status.
///
/// This is the only place that looks at platform socket errors.
pub fn classify(attempt: Attempt) -> (ProbeStatus, Option<String>) {
    match attempt {
        Attempt::Connected => (ProbeStatus::Open, None),
        Attempt::TimedOut => (ProbeStatus::Filtered, None),
        Attempt::Failed(e) => match e.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                (ProbeStatus::Closed, None)
            }
            // The OS gave up on the handshake before our own timer did.
            io::ErrorKind::TimedOut => (ProbeStatus::Filtered, Some(e.to_string())),
            _ => (ProbeStatus::Error, Some(e.to_string())),
        },
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
