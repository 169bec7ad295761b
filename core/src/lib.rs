//! TCP connect scanning for portcat.
//!
//! The two entry points are [`scanner::connect_mode`] for an explicit port
//! list and [`scanner::scan_mode`] for an inclusive port range. Both return a
//! complete [`ScanReport`](portcat_common::report::ScanReport) or a single
//! fatal [`ScanError`](portcat_common::error::ScanError).

pub mod network;
pub mod scanner;

pub use scanner::{Scanner, StopSignal, connect_mode, scan_mode};
