//! Error taxonomy shared by the reader, the per-process accessors and the
//! configuration layer.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Classified failure of a single pseudo-filesystem read.
#[derive(Debug)]
pub enum ReadError {
    /// The path does not exist (or the owning process exited mid-read).
    NotFound(PathBuf),
    /// The caller lacks permission to read the path.
    Forbidden(PathBuf),
    /// Any other I/O failure.
    Io { path: PathBuf, source: io::Error },
}

impl ReadError {
    /// Classifies an I/O error raised while accessing `path`.
    ///
    /// `ESRCH` is folded into `NotFound`: the kernel returns it when a
    /// `/proc/[pid]` file is read after the process has been reaped.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        if err.raw_os_error() == Some(libc::ESRCH) {
            return ReadError::NotFound(path.to_path_buf());
        }
        match err.kind() {
            io::ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ReadError::Forbidden(path.to_path_buf()),
            _ => ReadError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Path the failed read targeted.
    pub fn path(&self) -> &Path {
        match self {
            ReadError::NotFound(path) | ReadError::Forbidden(path) => path,
            ReadError::Io { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ReadError::Forbidden(_))
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::NotFound(path) => write!(f, "{} not found", path.display()),
            ReadError::Forbidden(path) => write!(f, "permission denied: {}", path.display()),
            ReadError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error returned by [`Process`](crate::Process) accessors.
#[derive(Debug)]
pub enum ProcessError {
    /// The process does not exist (anymore).
    NoSuchProcess { pid: u32 },
    /// The process exists but its state cannot be read or signalled.
    AccessDenied { pid: u32 },
    /// `wait()` reached its deadline while the process was still alive.
    TimeoutExpired { pid: u32, timeout: Duration },
    /// Unclassified I/O failure.
    Io { pid: u32, source: io::Error },
}

impl ProcessError {
    /// Attaches `pid` to a reader failure.
    pub fn from_read(pid: u32, err: ReadError) -> Self {
        match err {
            ReadError::NotFound(_) => ProcessError::NoSuchProcess { pid },
            ReadError::Forbidden(_) => ProcessError::AccessDenied { pid },
            ReadError::Io { source, .. } => ProcessError::Io { pid, source },
        }
    }

    /// Maps an OS error from a syscall targeting `pid` (e.g. `kill(2)`).
    pub fn from_os(pid: u32, err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::ESRCH) => ProcessError::NoSuchProcess { pid },
            Some(libc::EPERM) => ProcessError::AccessDenied { pid },
            _ => ProcessError::Io { pid, source: err },
        }
    }

    pub fn pid(&self) -> u32 {
        match self {
            ProcessError::NoSuchProcess { pid }
            | ProcessError::AccessDenied { pid }
            | ProcessError::TimeoutExpired { pid, .. }
            | ProcessError::Io { pid, .. } => *pid,
        }
    }

    /// True for failures that bulk enumeration treats as "skip this item".
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ProcessError::NoSuchProcess { .. } | ProcessError::AccessDenied { .. }
        )
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::NoSuchProcess { pid } => write!(f, "process {} not found", pid),
            ProcessError::AccessDenied { pid } => write!(f, "access denied to process {}", pid),
            ProcessError::TimeoutExpired { pid, timeout } => write!(
                f,
                "process {} did not terminate within {:.3} seconds",
                pid,
                timeout.as_secs_f64()
            ),
            ProcessError::Io { pid, source } => write!(f, "process {}: I/O error: {}", pid, source),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Invalid [`CollectorConfig`](crate::CollectorConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Clock ticks per second must be a positive, finite number.
    ClockTicks(f64),
    /// Page size must be non-zero.
    PageSize,
    /// The per-process stat layout does not decode the reference sample.
    StatLayout(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ClockTicks(v) => write!(f, "invalid clock ticks per second: {}", v),
            ConfigError::PageSize => write!(f, "page size must be non-zero"),
            ConfigError::StatLayout(msg) => write!(f, "invalid stat layout: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
