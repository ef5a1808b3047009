//! System-wide records.
//!
//! Every record is an immutable snapshot decoded from one or two procfs
//! files. Byte quantities are normalized to bytes and times to seconds
//! unless a field says otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate CPU time counters, in seconds since boot.
///
/// Source: first (`cpu`) line of `/proc/stat`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct CpuTimes {
    /// Time spent in user mode.
    pub user: f64,
    /// Time spent in kernel mode.
    pub system: f64,
    /// Time spent idle.
    pub idle: f64,
    /// Time spent servicing hardware and software interrupts (irq + softirq).
    pub interrupt: f64,
    /// Deferred procedure calls. Procfs has no equivalent; always 0.
    pub dpc: f64,
}

impl CpuTimes {
    /// Sum of all fields.
    pub fn total(&self) -> f64 {
        self.user + self.system + self.idle + self.interrupt + self.dpc
    }
}

/// Physical memory usage.
///
/// Source: `/proc/meminfo`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct VirtualMemory {
    /// Total usable RAM (bytes). Source: `MemTotal`
    pub total: u64,
    /// Memory available for new allocations without swapping (bytes).
    /// Source: `MemAvailable`, estimated from free + buffers + cached on
    /// kernels that lack it.
    pub available: u64,
    /// Percentage of `total` not available.
    pub percent: f64,
    /// total - free - buffers - cached (bytes).
    pub used: u64,
    /// Completely unused memory (bytes). Source: `MemFree`
    pub free: u64,
    /// Source: `Buffers`
    pub buffers: u64,
    /// Source: `Cached`
    pub cached: u64,
}

/// Swap usage.
///
/// Source: `/proc/meminfo` (`SwapTotal`, `SwapFree`), `/proc/vmstat`
/// (`pswpin`, `pswpout`)
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
    /// Bytes swapped in since boot, 0 when unavailable.
    pub sin: u64,
    /// Bytes swapped out since boot, 0 when unavailable.
    pub sout: u64,
}

/// Space usage of one mounted filesystem.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    /// Space available to unprivileged users.
    pub free: u64,
    pub percent: f64,
}

/// One entry of the mount table.
///
/// Source: `/proc/mounts`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DiskPartition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub opts: String,
}

/// Cumulative block device I/O counters.
///
/// Source: `/proc/diskstats`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DiskIo {
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    /// Time spent reading (ms).
    pub read_time: u64,
    /// Time spent writing (ms).
    pub write_time: u64,
}

impl DiskIo {
    /// Adds `other` field by field, saturating at `u64::MAX`.
    pub(crate) fn accumulate(&mut self, other: &DiskIo) {
        self.read_count = self.read_count.saturating_add(other.read_count);
        self.write_count = self.write_count.saturating_add(other.write_count);
        self.read_bytes = self.read_bytes.saturating_add(other.read_bytes);
        self.write_bytes = self.write_bytes.saturating_add(other.write_bytes);
        self.read_time = self.read_time.saturating_add(other.read_time);
        self.write_time = self.write_time.saturating_add(other.write_time);
    }
}

/// Cumulative network interface counters.
///
/// Source: `/proc/net/dev`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct NetIo {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

impl NetIo {
    /// Adds `other` field by field, saturating at `u64::MAX`.
    pub(crate) fn accumulate(&mut self, other: &NetIo) {
        self.bytes_sent = self.bytes_sent.saturating_add(other.bytes_sent);
        self.bytes_recv = self.bytes_recv.saturating_add(other.bytes_recv);
        self.packets_sent = self.packets_sent.saturating_add(other.packets_sent);
        self.packets_recv = self.packets_recv.saturating_add(other.packets_recv);
        self.errin = self.errin.saturating_add(other.errin);
        self.errout = self.errout.saturating_add(other.errout);
        self.dropin = self.dropin.saturating_add(other.dropin);
        self.dropout = self.dropout.saturating_add(other.dropout);
    }
}

/// Socket endpoint.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub struct Address {
    pub ip: String,
    pub port: u16,
}

impl Address {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Fallback endpoint for undecodable input.
    pub fn unspecified() -> Self {
        Self::new("0.0.0.0", 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.contains(':') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

/// Address family of a socket.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    #[serde(rename = "AF_INET")]
    Inet,
    #[serde(rename = "AF_INET6")]
    Inet6,
}

/// Socket type.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum SocketType {
    #[serde(rename = "SOCK_STREAM")]
    Stream,
    #[serde(rename = "SOCK_DGRAM")]
    Dgram,
}

/// TCP connection state.
///
/// UDP sockets have no state and always report [`ConnectionStatus::None`].
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Established,
    SynSent,
    SynRecv,
    #[serde(rename = "FIN_WAIT1")]
    FinWait1,
    #[serde(rename = "FIN_WAIT2")]
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    NewSynRecv,
    None,
    Unknown,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Established => "ESTABLISHED",
            ConnectionStatus::SynSent => "SYN_SENT",
            ConnectionStatus::SynRecv => "SYN_RECV",
            ConnectionStatus::FinWait1 => "FIN_WAIT1",
            ConnectionStatus::FinWait2 => "FIN_WAIT2",
            ConnectionStatus::TimeWait => "TIME_WAIT",
            ConnectionStatus::Close => "CLOSE",
            ConnectionStatus::CloseWait => "CLOSE_WAIT",
            ConnectionStatus::LastAck => "LAST_ACK",
            ConnectionStatus::Listen => "LISTEN",
            ConnectionStatus::Closing => "CLOSING",
            ConnectionStatus::NewSynRecv => "NEW_SYN_RECV",
            ConnectionStatus::None => "NONE",
            ConnectionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a kernel socket table.
///
/// Source: `/proc/net/{tcp,tcp6,udp,udp6}`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct NetConnection {
    /// Owning file descriptor. Never resolved.
    pub fd: Option<i32>,
    pub family: Family,
    #[serde(rename = "type")]
    pub kind: SocketType,
    pub laddr: Address,
    /// `None` when the remote endpoint is all zeroes (unconnected socket).
    pub raddr: Option<Address>,
    pub status: ConnectionStatus,
    /// Owning process. Never resolved.
    pub pid: Option<u32>,
}

/// Socket tables selected by [`net_connections`](crate::Collector::net_connections).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConnectionKind {
    /// TCP and UDP over IPv4 and IPv6.
    #[default]
    Inet,
    Inet4,
    Inet6,
    Tcp,
    Tcp4,
    Tcp6,
    Udp,
    Udp4,
    Udp6,
}

impl ConnectionKind {
    /// Table names under `<proc>/net/` covered by this kind, with the
    /// family and socket type of their rows.
    pub(crate) fn tables(&self) -> &'static [(&'static str, Family, SocketType)] {
        const TCP4: (&str, Family, SocketType) = ("tcp", Family::Inet, SocketType::Stream);
        const TCP6: (&str, Family, SocketType) = ("tcp6", Family::Inet6, SocketType::Stream);
        const UDP4: (&str, Family, SocketType) = ("udp", Family::Inet, SocketType::Dgram);
        const UDP6: (&str, Family, SocketType) = ("udp6", Family::Inet6, SocketType::Dgram);

        match self {
            ConnectionKind::Inet => &[TCP4, TCP6, UDP4, UDP6],
            ConnectionKind::Inet4 => &[TCP4, UDP4],
            ConnectionKind::Inet6 => &[TCP6, UDP6],
            ConnectionKind::Tcp => &[TCP4, TCP6],
            ConnectionKind::Tcp4 => &[TCP4],
            ConnectionKind::Tcp6 => &[TCP6],
            ConnectionKind::Udp => &[UDP4, UDP6],
            ConnectionKind::Udp4 => &[UDP4],
            ConnectionKind::Udp6 => &[UDP6],
        }
    }
}

impl FromStr for ConnectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inet" => Ok(ConnectionKind::Inet),
            "inet4" => Ok(ConnectionKind::Inet4),
            "inet6" => Ok(ConnectionKind::Inet6),
            "tcp" => Ok(ConnectionKind::Tcp),
            "tcp4" => Ok(ConnectionKind::Tcp4),
            "tcp6" => Ok(ConnectionKind::Tcp6),
            "udp" => Ok(ConnectionKind::Udp),
            "udp4" => Ok(ConnectionKind::Udp4),
            "udp6" => Ok(ConnectionKind::Udp6),
            other => Err(format!("unknown connection kind: {}", other)),
        }
    }
}

/// A logged-in user session.
///
/// Source: utmp session accounting file
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct User {
    pub name: String,
    pub terminal: String,
    pub host: String,
    /// Login time as seconds since the Unix epoch.
    pub started: f64,
    pub pid: Option<u32>,
}
