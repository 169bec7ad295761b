use thiserror::Error;

use crate::network::target::Target;

/// Failures that abort a whole scan.
///
/// Per-target network problems are never reported through this type; they
/// end up as `ERROR` or `FILTERED` outcomes inside the report instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid port range '{spec}': {reason}")]
    InvalidPortSpec { spec: String, reason: String },

    #[error("invalid port {port}: must be between 1 and 65535")]
    InvalidPort { port: u32 },

    #[error("could not resolve '{host}': {reason}")]
    Resolution { host: String, reason: String },

    /// A target was scheduled but no outcome came back for it.
    #[error("report is missing an outcome for {target}")]
    IncompleteReport { target: Target },
}

impl ScanError {
    pub fn invalid_spec(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPortSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub fn resolution(host: &str, reason: impl Into<String>) -> Self {
        Self::Resolution {
            host: host.to_string(),
            reason: reason.into(),
        }
    }
}
