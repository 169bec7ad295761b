//! Runs one explicit-port probe and one range scan against the local machine.

mod logging;

use std::time::Duration;

use portcat_common::config::{DEFAULT_HOST, DEFAULT_PORTS};
use portcat_common::report::{ProbeStatus, ScanReport};
use portcat_core::{connect_mode, scan_mode};
use tracing::{info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SCAN_RANGE: &str = "20-1024";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let connected: ScanReport = connect_mode(DEFAULT_HOST, &DEFAULT_PORTS, CONNECT_TIMEOUT).await?;
    log_report(&connected);

    let scanned: ScanReport = scan_mode(DEFAULT_HOST, SCAN_RANGE, None).await?;
    log_report(&scanned);

    Ok(())
}

fn log_report(report: &ScanReport) {
    for outcome in report {
        match outcome.status {
            ProbeStatus::Open => info!("{} open ({:?})", outcome.target, outcome.elapsed),
            ProbeStatus::Error => warn!(
                "{} error: {}",
                outcome.target,
                outcome.detail.as_deref().unwrap_or("unknown")
            ),
            ProbeStatus::Closed | ProbeStatus::Filtered => {}
        }
    }
}
