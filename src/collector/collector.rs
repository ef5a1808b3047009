//! Main collector that exposes system and process statistics.
//!
//! The `Collector` struct is the entry point for callers: it owns the
//! [`SystemCollector`] (and with it the cached values) and hands out
//! [`Process`] handles that borrow it.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::collector::procfs::{
    Process, ProcessIter, SystemCollector, list_pids, pid_exists,
};
use crate::collector::traits::{FileSystem, RealFs};
use crate::config::CollectorConfig;
use crate::error::{ConfigError, ReadError};
use crate::model::{
    ConnectionKind, CpuTimes, DiskIo, DiskPartition, DiskUsage, NetConnection, NetIo,
    ProcessAttr, SwapMemory, User, VirtualMemory,
};

/// Collector of system-wide and per-process statistics.
///
/// Generic over the [`FileSystem`] so that tests can run against
/// [`MockFs`](crate::collector::MockFs) scenarios.
#[derive(Debug)]
pub struct Collector<F: FileSystem> {
    system: SystemCollector<F>,
}

impl Default for Collector<RealFs> {
    fn default() -> Self {
        Self::new(RealFs::new())
    }
}

impl<F: FileSystem> Collector<F> {
    /// Creates a collector reading `/proc` with the host's kernel constants.
    pub fn new(fs: F) -> Self {
        Self::with_config(fs, CollectorConfig::default())
    }

    /// Creates a collector with a custom configuration.
    ///
    /// Invalid settings are replaced by their defaults with a warning.
    pub fn with_config(fs: F, mut config: CollectorConfig) -> Self {
        while let Err(e) = config.validate() {
            warn!(error = %e, "invalid collector configuration, using default");
            let defaults = CollectorConfig::default();
            match e {
                ConfigError::ClockTicks(_) => config.clock_ticks = defaults.clock_ticks,
                ConfigError::PageSize => config.page_size = defaults.page_size,
                ConfigError::StatLayout(_) => config.stat_layout = defaults.stat_layout,
            }
        }
        Self {
            system: SystemCollector::new(fs, config),
        }
    }

    /// Creates a collector, failing on an invalid configuration.
    pub fn try_with_config(fs: F, config: CollectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            system: SystemCollector::new(fs, config),
        })
    }

    pub fn config(&self) -> &CollectorConfig {
        self.system.config()
    }

    /// Returns the system-wide collector.
    pub fn system(&self) -> &SystemCollector<F> {
        &self.system
    }

    // ---- system-wide ----

    pub fn cpu_times(&self) -> CpuTimes {
        self.system.cpu_times()
    }

    pub fn cpu_percent(&self, interval: Option<Duration>) -> f64 {
        self.system.cpu_percent(interval)
    }

    pub fn cpu_count(&self, logical: bool) -> usize {
        self.system.cpu_count(logical)
    }

    pub fn virtual_memory(&self) -> VirtualMemory {
        self.system.virtual_memory()
    }

    pub fn swap_memory(&self) -> SwapMemory {
        self.system.swap_memory()
    }

    pub fn disk_usage(&self, path: impl AsRef<Path>) -> DiskUsage {
        self.system.disk_usage(path)
    }

    pub fn disk_partitions(&self, all: bool) -> Vec<DiskPartition> {
        self.system.disk_partitions(all)
    }

    pub fn disk_io_counters(&self) -> DiskIo {
        self.system.disk_io_counters()
    }

    pub fn disk_io_counters_perdisk(&self) -> BTreeMap<String, DiskIo> {
        self.system.disk_io_counters_perdisk()
    }

    pub fn net_io_counters(&self) -> NetIo {
        self.system.net_io_counters()
    }

    pub fn net_io_counters_pernic(&self) -> BTreeMap<String, NetIo> {
        self.system.net_io_counters_pernic()
    }

    pub fn net_connections(&self, kind: ConnectionKind) -> Vec<NetConnection> {
        self.system.net_connections(kind)
    }

    pub fn boot_time(&self) -> f64 {
        self.system.boot_time()
    }

    pub fn users(&self) -> Vec<User> {
        self.system.users()
    }

    // ---- processes ----

    /// Pids currently present, ascending.
    pub fn pids(&self) -> Result<Vec<u32>, ReadError> {
        list_pids(&self.system)
    }

    /// Whether `/proc/<pid>` exists. Always false for pid 0.
    pub fn pid_exists(&self, pid: u32) -> bool {
        pid_exists(&self.system, pid)
    }

    /// Handle to `pid`. Existence is not checked until an accessor runs.
    pub fn process(&self, pid: u32) -> Process<'_, F> {
        Process::new(&self.system, pid)
    }

    /// Iterates over the running processes, resolving `attrs` for each.
    ///
    /// The pid list is taken when this is called; only failure to list the
    /// proc root is an error.
    pub fn process_iter(&self, attrs: &[ProcessAttr]) -> Result<ProcessIter<'_, F>, ReadError> {
        ProcessIter::new(&self.system, attrs)
    }
}
