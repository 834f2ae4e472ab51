//! Configuration management for tcprecon.
//!
//! Per-run probe settings live in [`crate::scanner::ProbeConfig`]; this module
//! holds the persistent application defaults.

mod settings;

pub use settings::AppSettings;
