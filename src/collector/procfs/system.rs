//! System collector for gathering global system metrics from `/proc/`.
//!
//! System-wide stats never fail: an unreadable or malformed source degrades
//! into a zero/empty record and a `warn!`. Boot time, CPU counts and the
//! previous CPU sample are memoized per collector instance.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::collector::procfs::address::{parse_endpoint, parse_remote_endpoint, tcp_status};
use crate::collector::procfs::parser::{
    MemInfo, ParseError, parse_btime, parse_cpu_line, parse_cpuinfo, parse_diskstats, parse_meminfo,
    parse_mounts, parse_net_dev, parse_socket_table, parse_uptime, parse_utmp, parse_vmstat,
};
use crate::collector::reader::ProcReader;
use crate::collector::traits::FileSystem;
use crate::config::CollectorConfig;
use crate::error::ReadError;
use crate::model::{
    ConnectionKind, ConnectionStatus, CpuTimes, DiskIo, DiskPartition, DiskUsage, NetConnection,
    NetIo, SocketType, SwapMemory, User, VirtualMemory,
};

/// Bytes per sector in `/proc/diskstats`, independent of the device.
const SECTOR_SIZE: u64 = 512;

/// Filesystems without backing storage, hidden by `disk_partitions(false)`.
const VIRTUAL_FSTYPES: &[&str] = &[
    "autofs",
    "binfmt_misc",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devpts",
    "devtmpfs",
    "efivarfs",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "nsfs",
    "proc",
    "pstore",
    "rpc_pipefs",
    "securityfs",
    "selinuxfs",
    "sysfs",
    "tmpfs",
    "tracefs",
];

/// Failure of a single system-wide source, logged and then discarded.
#[derive(Debug)]
enum SourceError {
    Read(ReadError),
    Parse(ParseError),
}

impl From<ReadError> for SourceError {
    fn from(e: ReadError) -> Self {
        SourceError::Read(e)
    }
}

impl From<ParseError> for SourceError {
    fn from(e: ParseError) -> Self {
        SourceError::Parse(e)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Read(e) => e.fmt(f),
            SourceError::Parse(e) => e.fmt(f),
        }
    }
}

/// Collects system-wide metrics from `/proc/`.
#[derive(Debug)]
pub struct SystemCollector<F: FileSystem> {
    reader: ProcReader<F>,
    config: CollectorConfig,
    boot_time: OnceLock<f64>,
    logical_cpus: OnceLock<usize>,
    physical_cpus: OnceLock<usize>,
    last_cpu_times: Mutex<Option<CpuTimes>>,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and kernel constants
    pub fn new(fs: F, config: CollectorConfig) -> Self {
        Self {
            reader: ProcReader::new(fs),
            config,
            boot_time: OnceLock::new(),
            logical_cpus: OnceLock::new(),
            physical_cpus: OnceLock::new(),
            last_cpu_times: Mutex::new(None),
        }
    }

    pub fn reader(&self) -> &ProcReader<F> {
        &self.reader
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Path of `name` under the configured proc root.
    pub(crate) fn proc_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.proc_path, name)
    }

    fn read(&self, name: &str) -> Result<String, ReadError> {
        self.reader.read_text(self.proc_file(name))
    }

    /// Aggregate CPU times from the first line of `/proc/stat`.
    pub fn cpu_times(&self) -> CpuTimes {
        match self.read_cpu_times() {
            Ok(times) => times,
            Err(e) => {
                warn!(error = %e, "failed to read cpu times");
                CpuTimes::default()
            }
        }
    }

    fn read_cpu_times(&self) -> Result<CpuTimes, SourceError> {
        let cpu = parse_cpu_line(&self.read("stat")?)?;
        let hz = self.config.clock_ticks;

        Ok(CpuTimes {
            user: cpu.user as f64 / hz,
            system: cpu.system as f64 / hz,
            idle: cpu.idle as f64 / hz,
            interrupt: (cpu.irq + cpu.softirq) as f64 / hz,
            dpc: 0.0,
        })
    }

    /// System-wide CPU utilization as a percentage.
    ///
    /// With an interval, blocks for that long between two samples. Without
    /// one, compares against the sample taken by the previous call; the
    /// first such call returns 0.0.
    pub fn cpu_percent(&self, interval: Option<Duration>) -> f64 {
        let (before, after) = match interval {
            Some(interval) => {
                let before = self.cpu_times();
                std::thread::sleep(interval);
                let after = self.cpu_times();
                self.store_cpu_sample(after);
                (before, after)
            }
            None => {
                let after = self.cpu_times();
                match self.store_cpu_sample(after) {
                    Some(before) => (before, after),
                    None => return 0.0,
                }
            }
        };
        busy_percent(&before, &after)
    }

    /// Replaces the cached CPU sample, returning the previous one.
    fn store_cpu_sample(&self, sample: CpuTimes) -> Option<CpuTimes> {
        self.last_cpu_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(sample)
    }

    /// Number of logical CPUs (`logical = true`) or physical cores.
    ///
    /// Computed once per collector. When `/proc/cpuinfo` is unreadable the
    /// parallelism reported by the standard library is used (and cached).
    pub fn cpu_count(&self, logical: bool) -> usize {
        if logical {
            *self.logical_cpus.get_or_init(|| self.probe_cpu_count(true))
        } else {
            *self.physical_cpus.get_or_init(|| self.probe_cpu_count(false))
        }
    }

    fn probe_cpu_count(&self, logical: bool) -> usize {
        let info = match self.read("cpuinfo") {
            Ok(content) => parse_cpuinfo(&content),
            Err(e) => {
                warn!(error = %e, "failed to read cpuinfo, using fallback cpu count");
                return fallback_cpu_count();
            }
        };
        if info.logical == 0 {
            warn!("no processor entries in cpuinfo, using fallback cpu count");
            return fallback_cpu_count();
        }
        if logical {
            info.logical
        } else {
            info.physical.unwrap_or(info.logical)
        }
    }

    fn read_meminfo(&self) -> Result<MemInfo, SourceError> {
        Ok(parse_meminfo(&self.read("meminfo")?)?)
    }

    /// Physical memory usage from `/proc/meminfo`.
    pub fn virtual_memory(&self) -> VirtualMemory {
        let info = match self.read_meminfo() {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "failed to read meminfo");
                return VirtualMemory::default();
            }
        };

        let total = info.mem_total.saturating_mul(1024);
        let free = info.mem_free.saturating_mul(1024);
        let buffers = info.buffers.saturating_mul(1024);
        let cached = info.cached.saturating_mul(1024);
        let reclaimable = free.saturating_add(buffers).saturating_add(cached);
        let available = info
            .mem_available
            .map(|kb| kb.saturating_mul(1024))
            .unwrap_or(reclaimable)
            .min(total);

        VirtualMemory {
            total,
            available,
            percent: usage_percent(total - available, total),
            used: total.saturating_sub(reclaimable),
            free,
            buffers,
            cached,
        }
    }

    /// Swap usage from `/proc/meminfo` and `/proc/vmstat`.
    pub fn swap_memory(&self) -> SwapMemory {
        let info = match self.read_meminfo() {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "failed to read meminfo");
                return SwapMemory::default();
            }
        };

        let total = info.swap_total.saturating_mul(1024);
        let free = info.swap_free.saturating_mul(1024).min(total);
        let used = total - free;

        let (sin, sout) = match self.read("vmstat") {
            Ok(content) => {
                let vmstat = parse_vmstat(&content).unwrap_or_default();
                (
                    vmstat.pswpin.unwrap_or(0).saturating_mul(self.config.page_size),
                    vmstat.pswpout.unwrap_or(0).saturating_mul(self.config.page_size),
                )
            }
            Err(e) => {
                debug!(error = %e, "vmstat unavailable, swap activity reported as 0");
                (0, 0)
            }
        };

        SwapMemory {
            total,
            used,
            free,
            percent: usage_percent(used, total),
            sin,
            sout,
        }
    }

    /// Space usage of the filesystem holding `path`.
    pub fn disk_usage(&self, path: impl AsRef<Path>) -> DiskUsage {
        let path = path.as_ref();
        let stats = match self.reader.fs_stats(path) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to stat filesystem");
                return DiskUsage::default();
            }
        };

        let total = stats.fragment_size.saturating_mul(stats.blocks);
        let free = stats
            .fragment_size
            .saturating_mul(stats.blocks_available)
            .min(total);
        let used = total - free;

        DiskUsage {
            total,
            used,
            free,
            percent: usage_percent(used, total),
        }
    }

    /// Mounted filesystems; pseudo filesystems only when `all` is set.
    pub fn disk_partitions(&self, all: bool) -> Vec<DiskPartition> {
        let content = match self.read("mounts") {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "failed to read mount table");
                return Vec::new();
            }
        };

        parse_mounts(&content)
            .into_iter()
            .filter(|m| all || !VIRTUAL_FSTYPES.contains(&m.fstype.as_str()))
            .map(|m| DiskPartition {
                device: m.device,
                mountpoint: m.mountpoint,
                fstype: m.fstype,
                opts: m.opts,
            })
            .collect()
    }

    /// I/O counters per whole disk, keyed by device name.
    ///
    /// Loop and RAM devices and partitions are excluded.
    pub fn disk_io_counters_perdisk(&self) -> BTreeMap<String, DiskIo> {
        let content = match self.read("diskstats") {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "failed to read diskstats");
                return BTreeMap::new();
            }
        };

        parse_diskstats(&content)
            .unwrap_or_default()
            .into_iter()
            .filter(|d| !is_virtual_device(&d.device) && !is_partition(&d.device))
            .map(|d| {
                let io = DiskIo {
                    read_count: d.reads,
                    write_count: d.writes,
                    read_bytes: d.read_sectors.saturating_mul(SECTOR_SIZE),
                    write_bytes: d.write_sectors.saturating_mul(SECTOR_SIZE),
                    read_time: d.read_time,
                    write_time: d.write_time,
                };
                (d.device, io)
            })
            .collect()
    }

    /// I/O counters summed over all whole disks.
    pub fn disk_io_counters(&self) -> DiskIo {
        self.disk_io_counters_perdisk()
            .values()
            .fold(DiskIo::default(), |mut acc, io| {
                acc.accumulate(io);
                acc
            })
    }

    /// Network counters per interface.
    pub fn net_io_counters_pernic(&self) -> BTreeMap<String, NetIo> {
        let content = match self.read("net/dev") {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "failed to read net/dev");
                return BTreeMap::new();
            }
        };

        parse_net_dev(&content)
            .unwrap_or_default()
            .into_iter()
            .map(|dev| {
                let io = NetIo {
                    bytes_sent: dev.tx_bytes,
                    bytes_recv: dev.rx_bytes,
                    packets_sent: dev.tx_packets,
                    packets_recv: dev.rx_packets,
                    errin: dev.rx_errs,
                    errout: dev.tx_errs,
                    dropin: dev.rx_drop,
                    dropout: dev.tx_drop,
                };
                (dev.interface, io)
            })
            .collect()
    }

    /// Network counters summed over all interfaces.
    pub fn net_io_counters(&self) -> NetIo {
        self.net_io_counters_pernic()
            .values()
            .fold(NetIo::default(), |mut acc, io| {
                acc.accumulate(io);
                acc
            })
    }

    /// Sockets listed in the kernel's TCP/UDP tables.
    ///
    /// Owning pids are not resolved. Tables missing on this host (e.g. no
    /// IPv6) are skipped.
    pub fn net_connections(&self, kind: ConnectionKind) -> Vec<NetConnection> {
        let mut connections = Vec::new();

        for &(table, family, socket_type) in kind.tables() {
            let path = self.proc_file(&format!("net/{}", table));
            let content = match self.reader.read_text(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %path, error = %e, "socket table unavailable");
                    continue;
                }
            };

            connections.extend(parse_socket_table(&content).into_iter().map(|row| {
                NetConnection {
                    fd: None,
                    family,
                    kind: socket_type,
                    laddr: parse_endpoint(&row.local),
                    raddr: parse_remote_endpoint(&row.remote),
                    status: match socket_type {
                        SocketType::Stream => tcp_status(&row.state),
                        SocketType::Dgram => ConnectionStatus::None,
                    },
                    pid: None,
                }
            }));
        }

        connections
    }

    /// System boot time as seconds since the Unix epoch.
    ///
    /// Only a value read from `btime` is cached; the uptime-based estimate
    /// (and the final 0.0) are recomputed on every call.
    pub fn boot_time(&self) -> f64 {
        if let Some(&btime) = self.boot_time.get() {
            return btime;
        }

        match self.read_btime() {
            Ok(btime) => *self.boot_time.get_or_init(|| btime as f64),
            Err(e) => {
                warn!(error = %e, "failed to read btime, estimating from uptime");
                self.boot_time_from_uptime().unwrap_or(0.0)
            }
        }
    }

    fn read_btime(&self) -> Result<u64, SourceError> {
        Ok(parse_btime(&self.read("stat")?)?)
    }

    fn boot_time_from_uptime(&self) -> Option<f64> {
        let uptime = parse_uptime(&self.read("uptime").ok()?).ok()?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        Some((now.as_secs_f64() - uptime).max(0.0))
    }

    /// Logged-in users from the utmp session file.
    pub fn users(&self) -> Vec<User> {
        let content = match self.reader.read_bytes(&self.config.utmp_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.config.utmp_path, error = %e, "failed to read utmp");
                return Vec::new();
            }
        };

        parse_utmp(&content)
            .into_iter()
            .map(|entry| User {
                name: entry.user,
                terminal: entry.line,
                host: entry.host,
                started: entry.tv_sec as f64 + entry.tv_usec as f64 / 1_000_000.0,
                pid: u32::try_from(entry.pid).ok().filter(|&pid| pid > 0),
            })
            .collect()
    }
}

/// Share of `total` that was not idle between two samples, in [0, 100].
fn busy_percent(before: &CpuTimes, after: &CpuTimes) -> f64 {
    let total = after.total() - before.total();
    if total <= 0.0 {
        return 0.0;
    }
    let idle = after.idle - before.idle;
    ((1.0 - idle / total) * 100.0).clamp(0.0, 100.0)
}

fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
}

fn fallback_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn is_virtual_device(name: &str) -> bool {
    name.starts_with("loop") || name.starts_with("ram")
}

/// Heuristic partition check on a block device name.
///
/// `sda1`, `vdb2`, `xvda1` are partitions; `nvme0n1` and `mmcblk0` are whole
/// disks whose partitions carry a `p<N>` suffix. Other names ending in a
/// digit (`dm-0`, `md127`, `sr0`) are whole devices.
fn is_partition(name: &str) -> bool {
    let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if base.len() == name.len() {
        return false;
    }
    if name.starts_with("nvme") || name.starts_with("mmcblk") {
        return base
            .strip_suffix('p')
            .is_some_and(|disk| disk.ends_with(|c: char| c.is_ascii_digit()));
    }
    ["sd", "hd", "vd", "xvd"].iter().any(|prefix| {
        base.strip_prefix(prefix)
            .is_some_and(|letters| !letters.is_empty() && letters.chars().all(|c| c.is_ascii_lowercase()))
    })
}
