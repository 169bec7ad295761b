use std::time::Duration;

use tracing::warn;

/// Per-probe timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-probe timeout applied by range scans when none is given.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on simultaneously open probe sockets.
///
/// Keeps a wide range scan from exhausting file descriptors or ephemeral ports.
pub const DEFAULT_MAX_CONCURRENCY: usize = 256;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORTS: [u32; 2] = [80, 443];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How long a single connect attempt may wait for the handshake.
    pub timeout: Duration,
    /// Maximum number of probes in flight at once.
    pub max_concurrency: usize,
    /// Optional budget for the whole scan.
    ///
    /// Once it elapses, in-flight probes are cancelled and targets that were
    /// never dispatched are reported as errors.
    pub deadline: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            deadline: None,
        }
    }
}

impl Config {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The worker cap actually used by the scheduler. Never zero.
    pub fn concurrency_cap(&self) -> usize {
        if self.max_concurrency == 0 {
            warn!("max_concurrency of 0 is not usable, falling back to 1");
            return 1;
        }
        self.max_concurrency
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
