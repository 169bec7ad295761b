//! Shared data model for portcat.
//!
//! Everything in here is plain data and parsing: no sockets, no runtime.
//! The async machinery lives in `portcat-core`.

pub mod config;
pub mod error;
pub mod network;
pub mod report;
