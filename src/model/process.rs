//! Per-process records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scheduler state of a process.
///
/// Source: `State:` line of `/proc/[pid]/status`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    TracingStop,
    Zombie,
    Dead,
    WakeKill,
    /// Never produced by [`ProcessStatus::from_code`]; kept so that
    /// serialized `"waking"` values still deserialize.
    Waking,
    Idle,
    /// `W`, paging on old kernels.
    Paging,
    Parked,
    Unknown,
}

impl ProcessStatus {
    /// Maps the kernel's one-letter state code.
    pub fn from_code(code: char) -> Self {
        match code {
            'R' => ProcessStatus::Running,
            'S' => ProcessStatus::Sleeping,
            'D' => ProcessStatus::DiskSleep,
            'T' => ProcessStatus::Stopped,
            't' => ProcessStatus::TracingStop,
            'Z' => ProcessStatus::Zombie,
            'X' | 'x' => ProcessStatus::Dead,
            'K' => ProcessStatus::WakeKill,
            'W' => ProcessStatus::Paging,
            'I' => ProcessStatus::Idle,
            'P' => ProcessStatus::Parked,
            _ => ProcessStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::DiskSleep => "disk-sleep",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::TracingStop => "tracing-stop",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::WakeKill => "wake-kill",
            ProcessStatus::Waking => "waking",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Paging => "paging",
            ProcessStatus::Parked => "parked",
            ProcessStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory usage of a process, in bytes.
///
/// Source: `/proc/[pid]/status` (`VmRSS`, `VmSize`)
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcessMemoryInfo {
    /// Resident set size.
    pub rss: u64,
    /// Virtual memory size.
    pub vms: u64,
}

/// CPU time consumed by a process, in seconds.
///
/// Source: `/proc/[pid]/stat` (utime, stime, cutime, cstime)
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct ProcessCpuTimes {
    pub user: f64,
    pub system: f64,
    /// Time of waited-for children in user mode.
    pub children_user: f64,
    /// Time of waited-for children in kernel mode.
    pub children_system: f64,
}

/// A regular file held open by a process.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct OpenFile {
    pub path: String,
    pub fd: i32,
}

/// Attribute that [`process_iter`](crate::Collector::process_iter) can
/// resolve eagerly.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProcessAttr {
    Pid,
    Name,
    Exe,
    Cmdline,
    Status,
    Ppid,
    CreateTime,
    MemoryInfo,
    CpuTimes,
    NumThreads,
}

impl ProcessAttr {
    pub const ALL: [ProcessAttr; 10] = [
        ProcessAttr::Pid,
        ProcessAttr::Name,
        ProcessAttr::Exe,
        ProcessAttr::Cmdline,
        ProcessAttr::Status,
        ProcessAttr::Ppid,
        ProcessAttr::CreateTime,
        ProcessAttr::MemoryInfo,
        ProcessAttr::CpuTimes,
        ProcessAttr::NumThreads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessAttr::Pid => "pid",
            ProcessAttr::Name => "name",
            ProcessAttr::Exe => "exe",
            ProcessAttr::Cmdline => "cmdline",
            ProcessAttr::Status => "status",
            ProcessAttr::Ppid => "ppid",
            ProcessAttr::CreateTime => "create_time",
            ProcessAttr::MemoryInfo => "memory_info",
            ProcessAttr::CpuTimes => "cpu_times",
            ProcessAttr::NumThreads => "num_threads",
        }
    }
}

impl fmt::Display for ProcessAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessAttr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessAttr::ALL
            .into_iter()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| format!("unknown process attribute: {}", s))
    }
}

/// Resolved value of one [`ProcessAttr`].
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Pid(u32),
    Name(String),
    Exe(String),
    Cmdline(Vec<String>),
    Status(ProcessStatus),
    Ppid(u32),
    CreateTime(f64),
    MemoryInfo(ProcessMemoryInfo),
    CpuTimes(ProcessCpuTimes),
    NumThreads(u32),
}

/// Attributes resolved for one process during bulk enumeration.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct ProcessAttrs {
    values: BTreeMap<ProcessAttr, AttrValue>,
}

impl ProcessAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, value: AttrValue) {
        let attr = match &value {
            AttrValue::Pid(_) => ProcessAttr::Pid,
            AttrValue::Name(_) => ProcessAttr::Name,
            AttrValue::Exe(_) => ProcessAttr::Exe,
            AttrValue::Cmdline(_) => ProcessAttr::Cmdline,
            AttrValue::Status(_) => ProcessAttr::Status,
            AttrValue::Ppid(_) => ProcessAttr::Ppid,
            AttrValue::CreateTime(_) => ProcessAttr::CreateTime,
            AttrValue::MemoryInfo(_) => ProcessAttr::MemoryInfo,
            AttrValue::CpuTimes(_) => ProcessAttr::CpuTimes,
            AttrValue::NumThreads(_) => ProcessAttr::NumThreads,
        };
        self.values.insert(attr, value);
    }

    pub fn get(&self, attr: ProcessAttr) -> Option<&AttrValue> {
        self.values.get(&attr)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProcessAttr, &AttrValue)> {
        self.values.iter()
    }

    pub fn name(&self) -> Option<&str> {
        match self.get(ProcessAttr::Name) {
            Some(AttrValue::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn memory_info(&self) -> Option<ProcessMemoryInfo> {
        match self.get(ProcessAttr::MemoryInfo) {
            Some(AttrValue::MemoryInfo(info)) => Some(*info),
            _ => None,
        }
    }

    pub fn cpu_times(&self) -> Option<ProcessCpuTimes> {
        match self.get(ProcessAttr::CpuTimes) {
            Some(AttrValue::CpuTimes(times)) => Some(*times),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_status_codes() {
        assert_eq!(ProcessStatus::from_code('R'), ProcessStatus::Running);
        assert_eq!(ProcessStatus::from_code('D'), ProcessStatus::DiskSleep);
        assert_eq!(ProcessStatus::from_code('t'), ProcessStatus::TracingStop);
        assert_eq!(ProcessStatus::from_code('Z'), ProcessStatus::Zombie);
        assert_eq!(ProcessStatus::from_code('I'), ProcessStatus::Idle);
        assert_eq!(ProcessStatus::from_code('W'), ProcessStatus::Paging);
        assert_eq!(ProcessStatus::from_code('W').as_str(), "paging");
        assert_eq!(ProcessStatus::from_code('?'), ProcessStatus::Unknown);
        assert_eq!(ProcessStatus::DiskSleep.to_string(), "disk-sleep");
        assert_eq!(
            serde_json::to_string(&ProcessStatus::TracingStop).unwrap(),
            "\"tracing-stop\""
        );
    }

    #[test]
    fn test_process_attr_round_trip_names() {
        for attr in ProcessAttr::ALL {
            assert_eq!(attr.as_str().parse::<ProcessAttr>(), Ok(attr));
        }
        assert!("username".parse::<ProcessAttr>().is_err());
    }

    #[test]
    fn test_process_attrs_map() {
        let mut attrs = ProcessAttrs::new();
        assert!(attrs.is_empty());

        attrs.insert(AttrValue::Name("bash".to_string()));
        attrs.insert(AttrValue::Pid(1000));
        attrs.insert(AttrValue::Name("zsh".to_string()));

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.name(), Some("zsh"));
        assert_eq!(attrs.get(ProcessAttr::Pid), Some(&AttrValue::Pid(1000)));
        assert_eq!(attrs.memory_info(), None);

        // Ordered by attribute, serialized as a flat object
        let keys: Vec<ProcessAttr> = attrs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![ProcessAttr::Pid, ProcessAttr::Name]);
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"pid":1000,"name":"zsh"}"#);
    }
}
