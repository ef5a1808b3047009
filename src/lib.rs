//! procstat - system and process statistics from `/proc`.
//!
//! Provides:
//! - `collector` - system-wide statistics, process handles and enumeration
//! - `model` - typed, serializable records returned by the collector
//! - `config` - procfs location, kernel constants and stat field layout
//! - `error` - read, per-process and configuration errors
//! - `fmt` - formatting helpers for the `procstat` binary

pub mod collector;
pub mod config;
pub mod error;
pub mod fmt;
pub mod model;

pub use collector::{Collector, FileSystem, MockFs, Process, ProcessEntry, ProcessIter, RealFs};
pub use config::{CollectorConfig, ProcStatLayout};
pub use error::{ConfigError, ProcessError, ReadError};
