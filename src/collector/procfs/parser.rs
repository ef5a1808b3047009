//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.
//! Values are returned in the kernel's own units (ticks, kB, sectors); the
//! collectors normalize them.

use std::collections::{HashMap, HashSet};

use crate::config::ProcStatLayout;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============ Per-process Parsers ============

/// Parsed data from `/proc/[pid]/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    pub cutime: u64,
    pub cstime: u64,
    pub num_threads: u32,
    pub starttime: u64,
    /// Raw wait status of a zombie, `None` on kernels that do not expose it.
    pub exit_code: Option<i32>,
}

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str, layout: &ProcStatLayout) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    // Find the comm field boundaries (enclosed in parentheses)
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid: u32 = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    // Parse remaining fields (after the closing ')')
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    let needed = layout
        .required()
        .iter()
        .map(|(_, idx)| idx + 1)
        .max()
        .unwrap_or(1);
    if fields.len() < needed {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected {}+, got {}",
            needed,
            fields.len()
        )));
    }

    let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        let raw = fields
            .get(idx)
            .ok_or_else(|| ParseError::new(format!("missing field {}", name)))?;
        // cutime/cstime are signed in the kernel ABI; negative means none.
        raw.parse::<u64>()
            .or_else(|_| raw.parse::<i64>().map(|v| v.max(0) as u64))
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(ProcStat {
        pid,
        comm,
        state: fields
            .first()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| ParseError::new("missing state"))?,
        ppid: parse_field(layout.ppid, "ppid")? as u32,
        utime: parse_field(layout.utime, "utime")?,
        stime: parse_field(layout.stime, "stime")?,
        cutime: parse_field(layout.cutime, "cutime")?,
        cstime: parse_field(layout.cstime, "cstime")?,
        num_threads: parse_field(layout.num_threads, "num_threads")? as u32,
        starttime: parse_field(layout.starttime, "starttime")?,
        exit_code: fields.get(layout.exit_code).and_then(|s| s.parse().ok()),
    })
}

/// Parsed data from `/proc/[pid]/status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStatus {
    pub name: String,
    /// One-letter state code from the `State:` line.
    pub state: Option<char>,
    pub ppid: Option<u32>,
    /// Virtual memory size (kB).
    pub vm_size: u64,
    /// Resident set size (kB).
    pub vm_rss: u64,
    pub threads: Option<u32>,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line. Kernel threads and zombies
/// have no `Vm*` lines; those fields stay 0.
pub fn parse_proc_status(content: &str) -> Result<ProcStatus, ParseError> {
    let mut fields: HashMap<&str, &str> = HashMap::new();

    for line in content.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim(), value.trim());
        }
    }

    if !fields.contains_key("Name") && !fields.contains_key("State") {
        return Err(ParseError::new("not a status file"));
    }

    // Memory fields are in kB format: "12345 kB"
    let parse_kb = |key: &str| -> u64 {
        fields
            .get(key)
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    Ok(ProcStatus {
        name: fields.get("Name").unwrap_or(&"").to_string(),
        state: fields.get("State").and_then(|s| s.chars().next()),
        ppid: fields.get("PPid").and_then(|s| s.parse().ok()),
        vm_size: parse_kb("VmSize"),
        vm_rss: parse_kb("VmRSS"),
        threads: fields.get("Threads").and_then(|s| s.parse().ok()),
    })
}

/// Splits `/proc/[pid]/cmdline` into arguments, dropping empty tokens.
pub fn parse_cmdline(content: &str) -> Vec<String> {
    content
        .split('\0')
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

// ============ System-wide Parsers ============

/// Parsed data from `/proc/meminfo` (all values in kB).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    /// `None` on kernels older than 3.14.
    pub mem_available: Option<u64>,
    pub buffers: u64,
    pub cached: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut values: HashMap<&str, u64> = HashMap::new();

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        if let Some(value) = rest.split_whitespace().next().and_then(|s| s.parse().ok()) {
            values.insert(key.trim(), value);
        }
    }

    let mem_total = *values
        .get("MemTotal")
        .ok_or_else(|| ParseError::new("missing MemTotal in meminfo"))?;
    let get = |key: &str| values.get(key).copied().unwrap_or(0);

    Ok(MemInfo {
        mem_total,
        mem_free: get("MemFree"),
        mem_available: values.get("MemAvailable").copied(),
        buffers: get("Buffers"),
        cached: get("Cached"),
        swap_total: get("SwapTotal"),
        swap_free: get("SwapFree"),
    })
}

/// Aggregate CPU line of `/proc/stat` (ticks).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
}

/// Parses the first line of `/proc/stat`, which must carry the `cpu` label.
///
/// Negative counters (seen on some virtualized hosts) clamp to 0.
pub fn parse_cpu_line(content: &str) -> Result<CpuStat, ParseError> {
    let line = content
        .lines()
        .next()
        .ok_or_else(|| ParseError::new("empty stat"))?;
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.first() != Some(&"cpu") {
        return Err(ParseError::new("first stat line is not the cpu aggregate"));
    }
    if parts.len() < 5 {
        return Err(ParseError::new(format!(
            "not enough cpu fields: expected 4+, got {}",
            parts.len().saturating_sub(1)
        )));
    }

    let get_val = |idx: usize| -> Result<u64, ParseError> {
        match parts.get(idx) {
            None => Ok(0),
            Some(s) => s
                .parse::<i64>()
                .map(|v| v.max(0) as u64)
                .map_err(|_| ParseError::new(format!("invalid cpu field {:?}", s))),
        }
    };

    Ok(CpuStat {
        user: get_val(1)?,
        nice: get_val(2)?,
        system: get_val(3)?,
        idle: get_val(4)?,
        iowait: get_val(5)?,
        irq: get_val(6)?,
        softirq: get_val(7)?,
    })
}

/// Extracts the boot timestamp (`btime`) from `/proc/stat`.
pub fn parse_btime(content: &str) -> Result<u64, ParseError> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("btime "))
        .ok_or_else(|| ParseError::new("missing btime in stat"))?
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid btime"))
}

/// Parses `/proc/uptime`, returning seconds since boot.
pub fn parse_uptime(content: &str) -> Result<f64, ParseError> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?
        .parse()
        .map_err(|_| ParseError::new("invalid uptime"))
}

/// CPU topology from `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfo {
    /// Number of `processor` records.
    pub logical: usize,
    /// Distinct (`physical id`, `core id`) pairs, `None` when the topology
    /// keys are absent (ARM, some virtual machines).
    pub physical: Option<usize>,
}

/// Parses `/proc/cpuinfo` content.
pub fn parse_cpuinfo(content: &str) -> CpuInfo {
    let mut logical = 0;
    let mut cores = HashSet::new();
    let mut physical_id: Option<&str> = None;
    let mut core_id: Option<&str> = None;

    let mut flush = |physical_id: &mut Option<&str>, core_id: &mut Option<&str>| {
        if let (Some(p), Some(c)) = (physical_id.take(), core_id.take()) {
            cores.insert((p.to_string(), c.to_string()));
        }
    };

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            // Blank line separates processor records
            flush(&mut physical_id, &mut core_id);
            continue;
        };
        match key.trim() {
            "processor" => {
                flush(&mut physical_id, &mut core_id);
                logical += 1;
            }
            "physical id" => physical_id = Some(value.trim()),
            "core id" => core_id = Some(value.trim()),
            _ => {}
        }
    }
    flush(&mut physical_id, &mut core_id);

    CpuInfo {
        logical,
        physical: if cores.is_empty() {
            None
        } else {
            Some(cores.len())
        },
    }
}

/// Swap counters from `/proc/vmstat` (pages).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmstatInfo {
    pub pswpin: Option<u64>,
    pub pswpout: Option<u64>,
}

/// Parses `/proc/vmstat` content.
///
/// Format: key value (one per line)
pub fn parse_vmstat(content: &str) -> Result<VmstatInfo, ParseError> {
    let mut info = VmstatInfo::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let value = parts[1].parse().ok();
        match parts[0] {
            "pswpin" => info.pswpin = value,
            "pswpout" => info.pswpout = value,
            _ => {}
        }
    }

    Ok(info)
}

/// One line of `/proc/mounts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub opts: String,
}

/// Parses `/proc/mounts` content, decoding `\NNN` octal escapes.
pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            Some(MountEntry {
                device: unescape_octal(parts.next()?),
                mountpoint: unescape_octal(parts.next()?),
                fstype: parts.next()?.to_string(),
                opts: parts.next()?.to_string(),
            })
        })
        .collect()
}

/// Decodes the `\040`-style escapes the kernel uses for whitespace and
/// backslashes in mount table fields.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let code = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(code) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parsed data from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskStats {
    /// Block device major number.
    pub major: u32,
    /// Block device minor number.
    pub minor: u32,
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of reads completed
    pub reads: u64,
    /// Number of sectors read
    pub read_sectors: u64,
    /// Time spent reading (ms)
    pub read_time: u64,
    /// Number of writes completed
    pub writes: u64,
    /// Number of sectors written
    pub write_sectors: u64,
    /// Time spent writing (ms)
    pub write_time: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskStats>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        disks.push(DiskStats {
            major: parts[0].parse().unwrap_or(0),
            minor: parts[1].parse().unwrap_or(0),
            device: parts[2].to_string(),
            reads: get_val(3),
            read_sectors: get_val(5),
            read_time: get_val(6),
            writes: get_val(7),
            write_sectors: get_val(9),
            write_time: get_val(10),
        });
    }

    Ok(disks)
}

/// Parsed data from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDevStats {
    /// Interface name (eth0, lo, etc.)
    pub interface: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errs: u64,
    pub rx_drop: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errs: u64,
    pub tx_drop: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        // Skip header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        let get_val =
            |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        devices.push(NetDevStats {
            interface: interface.trim().to_string(),
            rx_bytes: get_val(0),
            rx_packets: get_val(1),
            rx_errs: get_val(2),
            rx_drop: get_val(3),
            tx_bytes: get_val(8),
            tx_packets: get_val(9),
            tx_errs: get_val(10),
            tx_drop: get_val(11),
        });
    }

    Ok(devices)
}

/// Raw columns of one `/proc/net/{tcp,udp}[6]` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocketRow {
    pub local: String,
    pub remote: String,
    pub state: String,
}

/// Parses a kernel socket table, skipping the header and short rows.
///
/// Format: `sl local_address rem_address st tx_queue:rx_queue ...`
pub fn parse_socket_table(content: &str) -> Vec<SocketRow> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            Some(SocketRow {
                local: parts[1].to_string(),
                remote: parts[2].to_string(),
                state: parts[3].to_string(),
            })
        })
        .collect()
}

// ============ Session Accounting Parser ============

/// Size of a glibc `struct utmp` on Linux.
pub const UTMP_RECORD_SIZE: usize = 384;
/// `ut_type` of a normal login session.
pub const UTMP_USER_PROCESS: i16 = 7;

/// One login session decoded from a utmp file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtmpEntry {
    pub pid: i32,
    pub line: String,
    pub user: String,
    pub host: String,
    pub tv_sec: i32,
    pub tv_usec: i32,
}

/// Decodes the `USER_PROCESS` records of a utmp file.
///
/// Layout (offsets in bytes): `ut_type` i16 @0, `ut_pid` i32 @4, `ut_line`
/// [32] @8, `ut_id` [4] @40, `ut_user` [32] @44, `ut_host` [256] @76,
/// `ut_exit` @332, `ut_session` i32 @336, `ut_tv` 2×i32 @340. A trailing
/// partial record is ignored.
pub fn parse_utmp(content: &[u8]) -> Vec<UtmpEntry> {
    let i16_at = |rec: &[u8], off: usize| i16::from_ne_bytes([rec[off], rec[off + 1]]);
    let i32_at = |rec: &[u8], off: usize| {
        i32::from_ne_bytes([rec[off], rec[off + 1], rec[off + 2], rec[off + 3]])
    };
    let str_at = |rec: &[u8], off: usize, len: usize| {
        let raw = &rec[off..off + len];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
        String::from_utf8_lossy(&raw[..end]).into_owned()
    };

    content
        .chunks_exact(UTMP_RECORD_SIZE)
        .filter(|rec| i16_at(rec, 0) == UTMP_USER_PROCESS)
        .map(|rec| UtmpEntry {
            pid: i32_at(rec, 4),
            line: str_at(rec, 8, 32),
            user: str_at(rec, 44, 32),
            host: str_at(rec, 76, 256),
            tv_sec: i32_at(rec, 340),
            tv_usec: i32_at(rec, 344),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{BOOT_TIME, MockFs, USER_PROCESS};

    #[test]
    fn test_parse_proc_stat_basic() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content, &ProcStatLayout::default()).unwrap();

        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1233);
        assert_eq!(stat.utime, 100);
        assert_eq!(stat.stime, 50);
        assert_eq!(stat.cutime, 200);
        assert_eq!(stat.cstime, 100);
        assert_eq!(stat.num_threads, 1);
        assert_eq!(stat.starttime, 100000);
        assert_eq!(stat.exit_code, Some(0));
    }

    #[test]
    fn test_parse_proc_stat_with_spaces_in_comm() {
        let content = "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content, &ProcStatLayout::default()).unwrap();

        assert_eq!(stat.pid, 5000);
        assert_eq!(stat.comm, "Web Content");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 4999);
        assert_eq!(stat.num_threads, 20);
    }

    #[test]
    fn test_parse_proc_stat_with_parentheses_in_comm() {
        let content = "5001 (test(1)) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content, &ProcStatLayout::default()).unwrap();

        assert_eq!(stat.pid, 5001);
        assert_eq!(stat.comm, "test(1)");
        assert_eq!(stat.utime, 10);
    }

    #[test]
    fn test_parse_proc_stat_zombie_exit_code() {
        let content = "4000 (defunct) Z 1000 4000 1000 0 -1 4194308 0 0 0 0 0 0 0 0 20 0 1 0 400000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 768";
        let stat = parse_proc_stat(content, &ProcStatLayout::default()).unwrap();

        assert_eq!(stat.state, 'Z');
        assert_eq!(stat.exit_code, Some(768));
    }

    #[test]
    fn test_parse_proc_stat_old_kernel_has_no_exit_code() {
        // 43 fields after comm, as printed by 3.2-era kernels
        let content = "77 (old) S 1 77 77 0 -1 4194304 0 0 0 0 3 4 -1 -2 20 0 1 0 900 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content, &ProcStatLayout::default()).unwrap();

        assert_eq!(stat.exit_code, None);
        assert_eq!(stat.cutime, 0);
        assert_eq!(stat.cstime, 0);
        assert_eq!(stat.starttime, 900);
    }

    #[test]
    fn test_parse_proc_stat_custom_layout() {
        let layout = ProcStatLayout {
            utime: 12,
            stime: 11,
            ..ProcStatLayout::default()
        };
        let content = "1 (init) S 0 1 1 0 -1 0 0 0 0 0 7 9 0 0 20 0 1 0 5 0 0";
        let stat = parse_proc_stat(content, &layout).unwrap();
        assert_eq!(stat.utime, 9);
        assert_eq!(stat.stime, 7);
    }

    #[test]
    fn test_parse_proc_stat_malformed() {
        let layout = ProcStatLayout::default();
        assert!(parse_proc_stat("", &layout).is_err());
        assert!(parse_proc_stat("12 bash S 1", &layout).is_err());
        assert!(parse_proc_stat("12 (bash) S 1 2 3", &layout).is_err());
        assert!(parse_proc_stat("x (bash) S 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19", &layout).is_err());
    }

    #[test]
    fn test_parse_proc_status() {
        let content = "\
Name:\tbash
State:\tS (sleeping)
Pid:\t1234
PPid:\t1233
Uid:\t1000\t1000\t1000\t1000
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
Threads:\t3
voluntary_ctxt_switches:\t500
";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.name, "bash");
        assert_eq!(status.state, Some('S'));
        assert_eq!(status.ppid, Some(1233));
        assert_eq!(status.vm_size, 25000);
        assert_eq!(status.vm_rss, 8000);
        assert_eq!(status.threads, Some(3));
    }

    #[test]
    fn test_parse_proc_status_kernel_thread() {
        let content = "Name:\tkthreadd\nState:\tS (sleeping)\nPid:\t2\nPPid:\t0\nThreads:\t1\n";
        let status = parse_proc_status(content).unwrap();
        assert_eq!(status.vm_rss, 0);
        assert_eq!(status.vm_size, 0);
        assert_eq!(status.ppid, Some(0));

        assert!(parse_proc_status("garbage").is_err());
    }

    #[test]
    fn test_parse_cmdline() {
        assert_eq!(parse_cmdline("/bin/bash\0--login\0"), vec!["/bin/bash", "--login"]);
        assert_eq!(parse_cmdline("a\0\0b"), vec!["a", "b"]);
        assert!(parse_cmdline("").is_empty());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:       100000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
HugePages_Total:       0
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(info.mem_free, 8192000);
        assert_eq!(info.mem_available, Some(12000000));
        assert_eq!(info.buffers, 512000);
        assert_eq!(info.cached, 2048000);
        assert_eq!(info.swap_total, 4096000);
        assert_eq!(info.swap_free, 4096000);
    }

    #[test]
    fn test_parse_meminfo_old_kernel_and_garbage() {
        let info = parse_meminfo("MemTotal: 1000 kB\nMemFree: 200 kB\n").unwrap();
        assert_eq!(info.mem_available, None);
        assert_eq!(info.buffers, 0);

        assert!(parse_meminfo("not meminfo at all").is_err());
    }

    #[test]
    fn test_parse_cpu_line() {
        let cpu = parse_cpu_line("cpu 100 0 300 400 0 0 0 0 0 0\ncpu0 1 2 3 4\n").unwrap();
        assert_eq!(cpu.user, 100);
        assert_eq!(cpu.system, 300);
        assert_eq!(cpu.idle, 400);

        // Old kernels print only four counters
        let cpu = parse_cpu_line("cpu  1 2 3 4\n").unwrap();
        assert_eq!(cpu.idle, 4);
        assert_eq!(cpu.irq, 0);

        let cpu = parse_cpu_line("cpu  10 0 -5 40 0 1 2\n").unwrap();
        assert_eq!(cpu.system, 0);
        assert_eq!(cpu.softirq, 2);
    }

    #[test]
    fn test_parse_cpu_line_rejects_other_labels() {
        assert!(parse_cpu_line("").is_err());
        assert!(parse_cpu_line("cpu0 1 2 3 4\n").is_err());
        assert!(parse_cpu_line("intr 1 2 3 4\n").is_err());
        assert!(parse_cpu_line("cpu 1 2\n").is_err());
        assert!(parse_cpu_line("cpu a b c d\n").is_err());
    }

    #[test]
    fn test_parse_btime_and_uptime() {
        let stat = "cpu 1 2 3 4\nctxt 10\nbtime 1700000000\nprocesses 3\n";
        assert_eq!(parse_btime(stat).unwrap(), 1700000000);
        assert!(parse_btime("cpu 1 2 3 4\n").is_err());

        assert_eq!(parse_uptime("12345.67 98765.43\n").unwrap(), 12345.67);
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn test_parse_cpuinfo_topology() {
        let fs = MockFs::typical_system();
        let content = String::from_utf8(
            crate::collector::traits::FileSystem::read(&fs, std::path::Path::new("/proc/cpuinfo"))
                .unwrap(),
        )
        .unwrap();

        let info = parse_cpuinfo(&content);
        assert_eq!(info.logical, 4);
        assert_eq!(info.physical, Some(2));
    }

    #[test]
    fn test_parse_cpuinfo_without_topology() {
        let content = "processor\t: 0\nBogoMIPS\t: 50.00\n\nprocessor\t: 1\nBogoMIPS\t: 50.00\n";
        let info = parse_cpuinfo(content);
        assert_eq!(info.logical, 2);
        assert_eq!(info.physical, None);

        assert_eq!(parse_cpuinfo(""), CpuInfo::default());
    }

    #[test]
    fn test_parse_vmstat() {
        let info = parse_vmstat("pgpgin 1\npswpin 100\npswpout 200\n").unwrap();
        assert_eq!(info.pswpin, Some(100));
        assert_eq!(info.pswpout, Some(200));

        let info = parse_vmstat("pgpgin 1\n").unwrap();
        assert_eq!(info.pswpin, None);
    }

    #[test]
    fn test_parse_mounts_with_escapes() {
        let content = "\
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sdb1 /media/usb\\040drive vfat rw 0 0
//srv/share /mnt/a\\134b cifs ro 0 0
truncated
";
        let mounts = parse_mounts(content);
        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[0].device, "/dev/sda1");
        assert_eq!(mounts[0].fstype, "ext4");
        assert_eq!(mounts[0].opts, "rw,relatime");
        assert_eq!(mounts[1].mountpoint, "/media/usb drive");
        assert_eq!(mounts[2].mountpoint, "/mnt/a\\b");
    }

    #[test]
    fn test_unescape_octal_edge_cases() {
        assert_eq!(unescape_octal("plain"), "plain");
        assert_eq!(unescape_octal("tab\\011"), "tab\t");
        assert_eq!(unescape_octal("short\\04"), "short\\04");
        assert_eq!(unescape_octal("bad\\089"), "bad\\089");
        assert_eq!(unescape_octal("\\"), "\\");
    }

    #[test]
    fn test_parse_diskstats() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
   short line
";
        let disks = parse_diskstats(content).unwrap();

        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].major, 8);
        assert_eq!(disks[0].device, "sda");
        assert_eq!(disks[0].reads, 1234);
        assert_eq!(disks[0].read_sectors, 56789);
        assert_eq!(disks[0].read_time, 100);
        assert_eq!(disks[0].writes, 5678);
        assert_eq!(disks[0].write_sectors, 98765);
        assert_eq!(disks[0].write_time, 200);
        assert_eq!(disks[1].minor, 1);
        assert_eq!(disks[2].device, "nvme0n1");
    }

    #[test]
    fn test_parse_net_dev() {
        let content = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 12345678     9876    0    0    0     0          0         0 12345678     9876    0    0    0     0       0          0
  eth0:987654321   654321    5   10    0     0          0       100 123456789   456789    2    5    0     0       0          0
";
        let devices = parse_net_dev(content).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].interface, "lo");
        assert_eq!(devices[1].interface, "eth0");
        assert_eq!(devices[1].rx_bytes, 987654321);
        assert_eq!(devices[1].rx_packets, 654321);
        assert_eq!(devices[1].rx_errs, 5);
        assert_eq!(devices[1].rx_drop, 10);
        assert_eq!(devices[1].tx_bytes, 123456789);
        assert_eq!(devices[1].tx_packets, 456789);
        assert_eq!(devices[1].tx_errs, 2);
        assert_eq!(devices[1].tx_drop, 5);
    }

    #[test]
    fn test_parse_socket_table() {
        let content = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345
   1: 0100007F:1F91
   2: 0F02000A:C350 2E10A8C0:01BB 01 00000000:00000000
";
        let rows = parse_socket_table(content);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].local, "0100007F:1F90");
        assert_eq!(rows[0].remote, "00000000:0000");
        assert_eq!(rows[0].state, "0A");
        assert_eq!(rows[1].state, "01");

        assert!(parse_socket_table("").is_empty());
    }

    #[test]
    fn test_parse_utmp() {
        let mut content = MockFs::utmp_record(BOOT_TIME, 0, "~", "reboot", "6.1.0", 1_700_000_000, 0);
        content.extend(MockFs::utmp_record(
            USER_PROCESS,
            999,
            "pts/0",
            "user",
            "192.168.16.1",
            1_700_000_500,
            250_000,
        ));
        // Trailing partial record
        content.extend([0u8; 100]);

        let entries = parse_utmp(&content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user, "user");
        assert_eq!(entries[0].line, "pts/0");
        assert_eq!(entries[0].host, "192.168.16.1");
        assert_eq!(entries[0].pid, 999);
        assert_eq!(entries[0].tv_sec, 1_700_000_500);
        assert_eq!(entries[0].tv_usec, 250_000);

        assert!(parse_utmp(&[]).is_empty());
    }
}
