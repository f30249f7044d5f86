//! Shared utilities for econ-rs
//!
//! Logging setup and application-level configuration used by the
//! binaries of the workspace. The analysis crate itself only emits
//! `tracing` events and never installs a subscriber.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
