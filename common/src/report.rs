//! Probe outcomes and the report that collects them.

use std::fmt;
use std::time::Duration;

use crate::network::target::Target;

pub const DEADLINE_EXCEEDED: &str = "scan cancelled: deadline exceeded";
pub const STOPPED_BY_CALLER: &str = "scan cancelled: stopped by caller";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    /// The handshake completed.
    Open,
    /// The peer actively refused the connection.
    Closed,
    /// Nothing came back before the probe timeout.
    Filtered,
    /// Any other failure, including cancellation. See the outcome detail.
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Open => write!(f, "open"),
            ProbeStatus::Closed => write!(f, "closed"),
            ProbeStatus::Filtered => write!(f, "filtered"),
            ProbeStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target: Target,
    pub status: ProbeStatus,
    /// Wall-clock time from the start of the attempt to classification.
    /// Diagnostic only.
    pub elapsed: Duration,
    pub detail: Option<String>,
}

impl ProbeOutcome {
    pub fn new(target: Target, status: ProbeStatus, elapsed: Duration) -> Self {
        Self {
            target,
            status,
            elapsed,
            detail: None,
        }
    }

    pub fn error(target: Target, elapsed: Duration, detail: impl Into<String>) -> Self {
        Self {
            target,
            status: ProbeStatus::Error,
            elapsed,
            detail: Some(detail.into()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ProbeStatus::Open
    }
}

/// One outcome per resolved target, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    outcomes: Vec<ProbeOutcome>,
}

impl ScanReport {
    /// Wraps outcomes that are already in target order.
    pub fn new(outcomes: Vec<ProbeOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeOutcome> {
        self.outcomes.iter()
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<ProbeOutcome> {
        self.outcomes
    }

    /// Open ports in report order. A port open on several addresses appears once per address.
    pub fn open_ports(&self) -> Vec<u16> {
        self.outcomes
            .iter()
            .filter(|o| o.is_open())
            .map(|o| o.target.port)
            .collect()
    }

    pub fn count(&self, status: ProbeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

impl IntoIterator for ScanReport {
    type Item = ProbeOutcome;
    type IntoIter = std::vec::IntoIter<ProbeOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanReport {
    type Item = &'a ProbeOutcome;
    type IntoIter = std::slice::Iter<'a, ProbeOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
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
