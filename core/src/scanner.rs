//! The public scanning surface.
//!
//! A scan runs in three steps, each in its own submodule:
//! 1. [`resolver`] turns the host and port selection into ordered targets.
//! 2. [`scheduler`] probes them through a bounded pool of tasks.
//! 3. [`aggregate`] puts the outcomes back into target order.
//!
//! [`connect_mode`] and [`scan_mode`] only differ in how the port selection
//! is built. Use [`Scanner`] directly to change the concurrency cap, set an
//! overall deadline, stop a scan early or plug in other collaborators.

use std::sync::Arc;
use std::time::{Duration, Instant};

use portcat_common::config::{Config, DEFAULT_SCAN_TIMEOUT};
use portcat_common::error::ScanError;
use portcat_common::network::range::PortSpec;
use portcat_common::report::ScanReport;
use tracing::{Instrument, info, info_span};

use crate::network::tcp::{Prober, TcpProber};

pub mod aggregate;
pub mod resolver;
pub mod scheduler;

use resolver::{HostResolver, SystemResolver};
pub use scheduler::StopSignal;

/// Probes an explicit list of ports on `host`.
///
/// Duplicate ports are probed once; the report follows first-occurrence order.
pub async fn connect_mode(
    host: &str,
    ports: &[u32],
    timeout: Duration,
) -> Result<ScanReport, ScanError> {
    Scanner::new(Config::default().with_timeout(timeout))
        .connect(host, ports)
        .await
}

/// Probes every port of an inclusive `"low-high"` range on `host`.
///
/// Without a timeout, each probe gets [`DEFAULT_SCAN_TIMEOUT`].
pub async fn scan_mode(
    host: &str,
    scan_range: &str,
    timeout: Option<Duration>,
) -> Result<ScanReport, ScanError> {
    let timeout: Duration = timeout.unwrap_or(DEFAULT_SCAN_TIMEOUT);
    Scanner::new(Config::default().with_timeout(timeout))
        .scan_range(host, scan_range)
        .await
}

/// A configured scanner.
///
/// Holds no per-scan state, so one instance can run any number of scans.
pub struct Scanner {
    cfg: Config,
    resolver: Arc<dyn HostResolver>,
    prober: Arc<dyn Prober>,
    stop: Option<StopSignal>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Scanner {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            resolver: Arc::new(SystemResolver),
            prober: Arc::new(TcpProber),
            stop: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Checked by every scan this scanner runs. Once raised it stays raised.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    pub async fn connect(&self, host: &str, ports: &[u32]) -> Result<ScanReport, ScanError> {
        self.scan(host, &PortSpec::list(ports)).await
    }

    pub async fn scan_range(&self, host: &str, scan_range: &str) -> Result<ScanReport, ScanError> {
        let spec: PortSpec = PortSpec::parse_range(scan_range)?;
        self.scan(host, &spec).await
    }

    /// Resolves, probes and aggregates.
    ///
    /// Fails only before probing starts (bad ports, unresolvable host), or on
    /// an internal bookkeeping error. Network trouble on individual targets is
    /// recorded in the report.
    pub async fn scan(&self, host: &str, spec: &PortSpec) -> Result<ScanReport, ScanError> {
        let span = info_span!("scan", host = %host);
        async {
            let targets = resolver::resolve_targets(self.resolver.as_ref(), host, spec).await?;
            info!("Scanning {} target(s) on {host}", targets.len());

            let start: Instant = Instant::now();
            let outcomes =
                scheduler::run(&targets, self.prober.clone(), &self.cfg, self.stop.as_ref()).await;
            let report: ScanReport = aggregate::aggregate(outcomes, &targets)?;

            summarize(host, &report, start.elapsed());
            Ok::<ScanReport, ScanError>(report)
        }
        .instrument(span)
        .await
    }
}

fn summarize(host: &str, report: &ScanReport, total_time: Duration) {
    let open_ports: Vec<u16> = report.open_ports();
    if open_ports.is_empty() {
        info!(
            "No open ports found on {host} ({} probed in {:.2}s)",
            report.len(),
            total_time.as_secs_f64()
        );
    } else {
        info!(
            "Found {} open ports on {host}: {:?} ({:.2}s)",
            open_ports.len(),
            open_ports,
            total_time.as_secs_f64()
        );
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
