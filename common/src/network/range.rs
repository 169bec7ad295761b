//! # Port Selection
//!
//! A caller picks ports in one of two ways:
//! * An explicit list (e.g. `[5432, 80, 443]`), probed in the given order.
//! * An inclusive numeric range (e.g. `"20-1024"`), probed ascending.
//!
//! Both are validated up front. A bad selection is rejected before any
//! network I/O happens, it is never truncated into something valid.

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::ScanError;

pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = u16::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub low: u16,
    pub high: u16,
}

impl PortRange {
    pub fn new(low: u32, high: u32) -> Result<Self, ScanError> {
        let spec = format!("{low}-{high}");
        Self::checked(low, high, &spec)
    }

    fn checked(low: u32, high: u32, spec: &str) -> Result<Self, ScanError> {
        for bound in [low, high] {
            if !(MIN_PORT..=MAX_PORT).contains(&bound) {
                return Err(ScanError::invalid_spec(
                    spec,
                    format!("bound {bound} is outside {MIN_PORT}-{MAX_PORT}"),
                ));
            }
        }
        if low > high {
            return Err(ScanError::invalid_spec(
                spec,
                "start must be less than or equal to end",
            ));
        }

        Ok(Self {
            low: low as u16,
            high: high as u16,
        })
    }

    pub fn len(&self) -> usize {
        usize::from(self.high - self.low) + 1
    }

    pub fn to_iter(&self) -> impl Iterator<Item = u16> {
        self.low..=self.high
    }
}

impl FromStr for PortRange {
    type Err = ScanError;

    /// Parses `"low-high"`, both ends inclusive. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some((low_str, high_str)) = trimmed.split_once('-') else {
            return Err(ScanError::invalid_spec(s, "expected the form start-end"));
        };

        let low = parse_bound(low_str, s)?;
        let high = parse_bound(high_str, s)?;

        Self::checked(low, high, s)
    }
}

fn parse_bound(bound: &str, original_s: &str) -> Result<u32, ScanError> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Err(ScanError::invalid_spec(original_s, "missing range bound"));
    }
    bound
        .parse::<u32>()
        .map_err(|e| ScanError::invalid_spec(original_s, format!("'{bound}': {e}")))
}

/// The ports a caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    /// Explicit ports, kept in caller order.
    List(Vec<u32>),
    /// Every port from `low` to `high`.
    Range(PortRange),
}

impl PortSpec {
    pub fn list(ports: &[u32]) -> Self {
        Self::List(ports.to_vec())
    }

    pub fn parse_range(s: &str) -> Result<Self, ScanError> {
        Ok(Self::Range(s.parse()?))
    }

    /// Expands the selection into concrete ports.
    ///
    /// Lists keep the first occurrence of each port and drop later duplicates.
    /// Ranges come out ascending.
    pub fn expand(&self) -> Result<Vec<u16>, ScanError> {
        match self {
            PortSpec::List(ports) => {
                let mut seen: HashSet<u16> = HashSet::with_capacity(ports.len());
                let mut expanded: Vec<u16> = Vec::with_capacity(ports.len());
                for &port in ports {
                    let port = validate_port(port)?;
                    if seen.insert(port) {
                        expanded.push(port);
                    }
                }
                Ok(expanded)
            }
            PortSpec::Range(range) => Ok(range.to_iter().collect()),
        }
    }
}

fn validate_port(port: u32) -> Result<u16, ScanError> {
    if (MIN_PORT..=MAX_PORT).contains(&port) {
        Ok(port as u16)
    } else {
        Err(ScanError::InvalidPort { port })
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
