//! Handle to a single process.
//!
//! A [`Process`] stores nothing but its pid and, when it could be read at
//! construction, the process start time. Every accessor re-reads
//! `/proc/[pid]/`, so a handle outlives the process it names: once the
//! entry is gone, accessors fail with [`ProcessError::NoSuchProcess`].

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::procfs::parser::{
    ProcStat, ProcStatus, parse_cmdline, parse_proc_stat, parse_proc_status,
};
use crate::collector::procfs::registry::list_pids;
use crate::collector::procfs::system::SystemCollector;
use crate::collector::traits::FileSystem;
use crate::error::{ProcessError, ReadError};
use crate::model::{OpenFile, ProcessCpuTimes, ProcessMemoryInfo, ProcessStatus};

/// Upper bound on the sleep between two checks in [`Process::wait`].
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lazily-resolved handle to the process with a given pid.
pub struct Process<'a, F: FileSystem> {
    system: &'a SystemCollector<F>,
    pid: u32,
    /// Start time in clock ticks, used to detect pid reuse.
    start_ticks: Option<u64>,
}

impl<F: FileSystem> Clone for Process<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: FileSystem> Copy for Process<'_, F> {}

impl<F: FileSystem> fmt::Debug for Process<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("start_ticks", &self.start_ticks)
            .finish()
    }
}

impl<F: FileSystem> PartialEq for Process<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid && self.start_ticks == other.start_ticks
    }
}

impl<'a, F: FileSystem> Process<'a, F> {
    /// Creates a handle without checking that `pid` exists.
    pub fn new(system: &'a SystemCollector<F>, pid: u32) -> Self {
        let mut process = Self {
            system,
            pid,
            start_ticks: None,
        };
        process.start_ticks = process.stat().ok().map(|stat| stat.starttime);
        process
    }

    fn from_stat(system: &'a SystemCollector<F>, stat: &ProcStat) -> Self {
        Self {
            system,
            pid: stat.pid,
            start_ticks: Some(stat.starttime),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    fn path(&self, name: &str) -> String {
        self.system.proc_file(&format!("{}/{}", self.pid, name))
    }

    fn dir_exists(&self) -> bool {
        self.system
            .reader()
            .exists(self.system.proc_file(&self.pid.to_string()))
    }

    fn read(&self, name: &str) -> Result<String, ProcessError> {
        self.system
            .reader()
            .read_text(self.path(name))
            .map_err(|e| ProcessError::from_read(self.pid, e))
    }

    fn stat(&self) -> Result<ProcStat, ProcessError> {
        let content = self.read("stat")?;
        parse_proc_stat(&content, &self.system.config().stat_layout).map_err(|e| {
            debug!(pid = self.pid, error = %e, "malformed stat");
            ProcessError::NoSuchProcess { pid: self.pid }
        })
    }

    fn status_file(&self) -> Result<ProcStatus, ProcessError> {
        let content = self.read("status")?;
        parse_proc_status(&content).map_err(|e| {
            debug!(pid = self.pid, error = %e, "malformed status");
            ProcessError::NoSuchProcess { pid: self.pid }
        })
    }

    /// Command name, as in `/proc/[pid]/comm`.
    pub fn name(&self) -> Result<String, ProcessError> {
        match self.system.reader().read_text(self.path("comm")) {
            Ok(comm) => Ok(comm.trim_end_matches('\n').to_string()),
            Err(ReadError::Forbidden(_)) => Err(ProcessError::AccessDenied { pid: self.pid }),
            Err(e) if self.dir_exists() => {
                debug!(pid = self.pid, error = %e, "comm unreadable, using stat");
                Ok(self.stat()?.comm)
            }
            Err(e) => Err(ProcessError::from_read(self.pid, e)),
        }
    }

    /// Path of the executable.
    ///
    /// Falls back to the first command line argument when the `exe` link
    /// cannot be resolved (other users' processes, kernel threads, zombies).
    pub fn exe(&self) -> Result<String, ProcessError> {
        match self.system.reader().read_link(self.path("exe")) {
            Ok(target) => Ok(target.to_string_lossy().into_owned()),
            Err(_) if !self.dir_exists() => Err(ProcessError::NoSuchProcess { pid: self.pid }),
            Err(_) => match self.cmdline() {
                Ok(args) => Ok(args.into_iter().next().unwrap_or_default()),
                Err(e @ ProcessError::NoSuchProcess { .. }) => Err(e),
                Err(_) => Ok(String::new()),
            },
        }
    }

    /// Command line arguments. Empty for kernel threads and zombies.
    pub fn cmdline(&self) -> Result<Vec<String>, ProcessError> {
        Ok(parse_cmdline(&self.read("cmdline")?))
    }

    pub fn status(&self) -> Result<ProcessStatus, ProcessError> {
        let state = match self.status_file()?.state {
            Some(state) => state,
            None => self.stat()?.state,
        };
        Ok(ProcessStatus::from_code(state))
    }

    /// Parent pid; 0 for the init process and kernel-spawned roots.
    pub fn ppid(&self) -> Result<u32, ProcessError> {
        match self.status_file()?.ppid {
            Some(ppid) => Ok(ppid),
            None => Ok(self.stat()?.ppid),
        }
    }

    /// Start time as seconds since the Unix epoch.
    pub fn create_time(&self) -> Result<f64, ProcessError> {
        let stat = self.stat()?;
        Ok(self.system.boot_time() + stat.starttime as f64 / self.system.config().clock_ticks)
    }

    pub fn memory_info(&self) -> Result<ProcessMemoryInfo, ProcessError> {
        let status = self.status_file()?;
        match (status.vm_rss.checked_mul(1024), status.vm_size.checked_mul(1024)) {
            (Some(rss), Some(vms)) => Ok(ProcessMemoryInfo { rss, vms }),
            _ => {
                debug!(pid = self.pid, "memory size in status out of range");
                Err(ProcessError::NoSuchProcess { pid: self.pid })
            }
        }
    }

    pub fn cpu_times(&self) -> Result<ProcessCpuTimes, ProcessError> {
        let stat = self.stat()?;
        let hz = self.system.config().clock_ticks;
        Ok(ProcessCpuTimes {
            user: stat.utime as f64 / hz,
            system: stat.stime as f64 / hz,
            children_user: stat.cutime as f64 / hz,
            children_system: stat.cstime as f64 / hz,
        })
    }

    pub fn num_threads(&self) -> Result<u32, ProcessError> {
        match self.status_file()?.threads {
            Some(threads) => Ok(threads),
            None => Ok(self.stat()?.num_threads),
        }
    }

    /// Regular files the process holds open, ordered by descriptor.
    ///
    /// Descriptors that close while the table is scanned are skipped.
    pub fn open_files(&self) -> Result<Vec<OpenFile>, ProcessError> {
        let reader = self.system.reader();
        let entries = reader
            .list_dir(self.path("fd"))
            .map_err(|e| ProcessError::from_read(self.pid, e))?;

        let mut files: Vec<OpenFile> = entries
            .iter()
            .filter_map(|entry| {
                let fd = entry.file_name()?.to_str()?.parse::<i32>().ok()?;
                let target = reader.read_link(entry).ok()?;
                let path = target.to_str()?;
                if !path.starts_with('/') || path.starts_with("/dev/") {
                    return None;
                }
                Some(OpenFile {
                    path: path.to_string(),
                    fd,
                })
            })
            .collect();
        files.sort_by_key(|f| f.fd);
        Ok(files)
    }

    /// Processes whose parent is this one; with `recursive`, all descendants.
    ///
    /// Scans every pid on each call. Results are ordered by pid.
    pub fn children(&self, recursive: bool) -> Result<Vec<Process<'a, F>>, ProcessError> {
        let pids = list_pids(self.system).map_err(|e| ProcessError::from_read(self.pid, e))?;

        let mut by_parent: BTreeMap<u32, Vec<Process<'a, F>>> = BTreeMap::new();
        for pid in pids {
            if pid == self.pid {
                continue;
            }
            let candidate = Process {
                system: self.system,
                pid,
                start_ticks: None,
            };
            if let Ok(stat) = candidate.stat() {
                by_parent
                    .entry(stat.ppid)
                    .or_default()
                    .push(Process::from_stat(self.system, &stat));
            }
        }

        if !recursive {
            return Ok(by_parent.remove(&self.pid).unwrap_or_default());
        }

        let mut found = Vec::new();
        let mut seen = HashSet::from([self.pid]);
        let mut queue = VecDeque::from([self.pid]);
        while let Some(parent) = queue.pop_front() {
            for child in by_parent.remove(&parent).unwrap_or_default() {
                if seen.insert(child.pid) {
                    queue.push_back(child.pid);
                    found.push(child);
                }
            }
        }
        found.sort_by_key(|p| p.pid);
        Ok(found)
    }

    /// The parent process, `None` when the parent pid is 0.
    pub fn parent(&self) -> Result<Option<Process<'a, F>>, ProcessError> {
        let ppid = self.ppid()?;
        if ppid == 0 {
            return Ok(None);
        }
        Ok(Some(Process::new(self.system, ppid)))
    }

    /// Whether the process still exists and is the one this handle was
    /// created for (not a new process that reused the pid).
    pub fn is_running(&self) -> bool {
        match self.stat() {
            Ok(stat) => self.start_ticks.is_none_or(|ticks| ticks == stat.starttime),
            Err(ProcessError::AccessDenied { .. }) => true,
            Err(_) => false,
        }
    }

    /// Sends `signal` to the process.
    pub fn send_signal(&self, signal: i32) -> Result<(), ProcessError> {
        // pid 0 and pids beyond pid_t would address process groups
        let Ok(pid) = libc::pid_t::try_from(self.pid) else {
            return Err(ProcessError::NoSuchProcess { pid: self.pid });
        };
        if pid == 0 || !self.is_running() {
            return Err(ProcessError::NoSuchProcess { pid: self.pid });
        }

        // SAFETY: kill(2) has no memory-safety preconditions.
        if unsafe { libc::kill(pid, signal) } != 0 {
            return Err(ProcessError::from_os(self.pid, std::io::Error::last_os_error()));
        }
        debug!(pid = self.pid, signal, "signal sent");
        Ok(())
    }

    /// Sends `SIGTERM`.
    pub fn terminate(&self) -> Result<(), ProcessError> {
        self.send_signal(libc::SIGTERM)
    }

    /// Sends `SIGKILL`.
    pub fn kill(&self) -> Result<(), ProcessError> {
        self.send_signal(libc::SIGKILL)
    }

    /// Blocks until the process exits.
    ///
    /// Returns the exit code (negated signal number when killed by a signal)
    /// if the process is left as a zombie that exposes it, otherwise `None`.
    /// With a timeout, fails with `TimeoutExpired` once it elapses.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Option<i32>, ProcessError> {
        // A deadline past what `Instant` can represent means no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            match self.stat() {
                Ok(stat) if self.start_ticks.is_some_and(|t| t != stat.starttime) => {
                    return Ok(None);
                }
                Ok(stat) if matches!(stat.state, 'Z' | 'X' | 'x') => {
                    return Ok(stat.exit_code.map(decode_wait_status));
                }
                Ok(_) | Err(ProcessError::AccessDenied { .. }) => {}
                Err(ProcessError::NoSuchProcess { .. }) => return Ok(None),
                Err(e) => return Err(e),
            }

            let mut pause = WAIT_POLL_INTERVAL;
            if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ProcessError::TimeoutExpired {
                        pid: self.pid,
                        timeout,
                    });
                }
                pause = pause.min(deadline - now);
            }
            std::thread::sleep(pause);
        }
    }
}

/// Decodes a `waitpid(2)` status word.
fn decode_wait_status(status: i32) -> i32 {
    let signal = status & 0x7f;
    if signal == 0 {
        (status >> 8) & 0xff
    } else {
        -signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::config::CollectorConfig;

    fn mock_system(fs: MockFs) -> SystemCollector<MockFs> {
        SystemCollector::new(fs, CollectorConfig::default().with_clock_ticks(100.0))
    }

    #[test]
    fn test_basic_accessors() {
        let system = mock_system(MockFs::typical_system());
        let bash = Process::new(&system, 1000);

        assert_eq!(bash.pid(), 1000);
        assert_eq!(bash.name().unwrap(), "bash");
        assert_eq!(bash.exe().unwrap(), "/usr/bin/bash");
        assert_eq!(bash.cmdline().unwrap(), vec!["/bin/bash", "--login"]);
        assert_eq!(bash.status().unwrap(), ProcessStatus::Sleeping);
        assert_eq!(bash.ppid().unwrap(), 999);
        assert_eq!(bash.num_threads().unwrap(), 1);

        let cat = Process::new(&system, 1001);
        assert_eq!(cat.status().unwrap(), ProcessStatus::Running);
    }

    #[test]
    fn test_create_time() {
        let system = mock_system(MockFs::typical_system());
        let bash = Process::new(&system, 1000);
        // btime 1700000000 + starttime 100000 ticks / 100 Hz
        assert_eq!(bash.create_time().unwrap(), 1_700_001_000.0);
    }

    #[test]
    fn test_memory_info() {
        let system = mock_system(MockFs::typical_system());
        let info = Process::new(&system, 1000).memory_info().unwrap();
        assert_eq!(info.rss, 8000 * 1024);
        assert_eq!(info.vms, 25000 * 1024);

        // Zombies have no Vm* lines
        let system = mock_system(MockFs::with_zombie_process());
        let info = Process::new(&system, 4000).memory_info().unwrap();
        assert_eq!(info, ProcessMemoryInfo::default());
    }

    #[test]
    fn test_memory_info_out_of_range() {
        let fs = MockFs::typical_system();
        fs.add_file(
            "/proc/1000/status",
            "Name:\tbash\nState:\tS (sleeping)\nPPid:\t1\nVmSize:\t25000 kB\nVmRSS:\t18446744073709551615 kB\n",
        );
        let system = mock_system(fs);
        assert!(matches!(
            Process::new(&system, 1000).memory_info(),
            Err(ProcessError::NoSuchProcess { pid: 1000 })
        ));
    }

    #[test]
    fn test_cpu_times() {
        let system = mock_system(MockFs::typical_system());
        let times = Process::new(&system, 1).cpu_times().unwrap();
        assert_eq!(times.user, 10.0);
        assert_eq!(times.system, 5.0);
        assert_eq!(times.children_user, 20.0);
        assert_eq!(times.children_system, 10.0);
    }

    #[test]
    fn test_removed_process_is_no_such_process() {
        let fs = MockFs::typical_system();
        let system = mock_system(fs.clone());
        let cat = Process::new(&system, 1001);

        fs.remove("/proc/1001");

        assert!(matches!(cat.name(), Err(ProcessError::NoSuchProcess { pid: 1001 })));
        assert!(matches!(cat.exe(), Err(ProcessError::NoSuchProcess { .. })));
        assert!(matches!(cat.cmdline(), Err(ProcessError::NoSuchProcess { .. })));
        assert!(matches!(cat.status(), Err(ProcessError::NoSuchProcess { .. })));
        assert!(matches!(cat.memory_info(), Err(ProcessError::NoSuchProcess { .. })));
        assert!(matches!(cat.open_files(), Err(ProcessError::NoSuchProcess { .. })));
        assert!(!cat.is_running());
    }

    #[test]
    fn test_never_existing_pid() {
        let system = mock_system(MockFs::typical_system());
        let ghost = Process::new(&system, 424242);
        assert!(matches!(ghost.name(), Err(ProcessError::NoSuchProcess { pid: 424242 })));
        assert!(matches!(ghost.create_time(), Err(ProcessError::NoSuchProcess { .. })));
        assert_eq!(ghost.wait(None).unwrap(), None);
    }

    #[test]
    fn test_name_falls_back_to_stat() {
        let fs = MockFs::with_special_names();
        fs.remove("/proc/5000/comm");
        let system = mock_system(fs);
        assert_eq!(Process::new(&system, 5000).name().unwrap(), "Web Content");
    }

    #[test]
    fn test_name_access_denied() {
        let fs = MockFs::typical_system();
        fs.deny("/proc/1001/comm");
        let system = mock_system(fs);
        assert!(matches!(
            Process::new(&system, 1001).name(),
            Err(ProcessError::AccessDenied { pid: 1001 })
        ));
    }

    #[test]
    fn test_exe_falls_back_to_cmdline() {
        let system = mock_system(MockFs::with_zombie_process());
        // exe of init is root-only
        assert_eq!(Process::new(&system, 1).exe().unwrap(), "/sbin/init");
        // zombie: no exe link and empty cmdline
        assert_eq!(Process::new(&system, 4000).exe().unwrap(), "");
    }

    #[test]
    fn test_malformed_stat_is_no_such_process() {
        let fs = MockFs::typical_system();
        fs.add_file("/proc/1000/stat", "garbage");
        let system = mock_system(fs);
        let bash = Process::new(&system, 1000);
        assert!(matches!(bash.cpu_times(), Err(ProcessError::NoSuchProcess { .. })));
        // status-based accessors are unaffected
        assert_eq!(bash.ppid().unwrap(), 999);
    }

    #[test]
    fn test_open_files() {
        let system = mock_system(MockFs::typical_system());

        let files = Process::new(&system, 1001).open_files().unwrap();
        assert_eq!(
            files,
            vec![
                OpenFile {
                    path: "/home/user/file.txt".to_string(),
                    fd: 3
                },
                OpenFile {
                    path: "/tmp/cat.lock".to_string(),
                    fd: 5
                },
            ]
        );

        let files = Process::new(&system, 1000).open_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].fd, 255);

        assert!(matches!(
            Process::new(&system, 1).open_files(),
            Err(ProcessError::AccessDenied { pid: 1 })
        ));
    }

    #[test]
    fn test_children() {
        let fs = MockFs::with_zombie_process();
        fs.add_process(
            1002,
            "1002 (grep) S 1001 1000 1000 34816 1001 4194304 10 0 0 0 1 1 0 0 20 0 1 0 100200 4000000 300 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\tgrep\nState:\tS (sleeping)\nPPid:\t1001\n",
            "grep\0x\0",
            "grep\n",
        );
        let system = mock_system(fs);
        let bash = Process::new(&system, 1000);

        let direct: Vec<u32> = bash.children(false).unwrap().iter().map(|p| p.pid()).collect();
        assert_eq!(direct, vec![1001, 4000]);

        let all: Vec<u32> = bash.children(true).unwrap().iter().map(|p| p.pid()).collect();
        assert_eq!(all, vec![1001, 1002, 4000]);

        assert!(Process::new(&system, 1002).children(true).unwrap().is_empty());
    }

    #[test]
    fn test_parent() {
        let system = mock_system(MockFs::typical_system());

        let parent = Process::new(&system, 1001).parent().unwrap().unwrap();
        assert_eq!(parent.pid(), 1000);
        assert_eq!(parent.name().unwrap(), "bash");

        assert!(Process::new(&system, 1).parent().unwrap().is_none());
    }

    #[test]
    fn test_is_running_detects_pid_reuse() {
        let fs = MockFs::typical_system();
        let system = mock_system(fs.clone());
        let cat = Process::new(&system, 1001);
        assert!(cat.is_running());

        // Same pid, different start time
        fs.add_file(
            "/proc/1001/stat",
            "1001 (vim) S 1000 1001 1000 34816 1001 4194304 100 0 0 0 5 2 0 0 20 0 1 0 999999 5000000 500 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
        );
        assert!(!cat.is_running());
        assert!(Process::new(&system, 1001).is_running());

        // The pid-reuse guard refuses to signal the new process
        assert!(matches!(cat.terminate(), Err(ProcessError::NoSuchProcess { pid: 1001 })));
        assert_eq!(cat.wait(Some(Duration::from_secs(1))).unwrap(), None);
    }

    #[test]
    fn test_is_running_when_stat_forbidden() {
        let fs = MockFs::typical_system();
        let system = mock_system(fs.clone());
        let init = Process::new(&system, 1);
        fs.deny("/proc/1/stat");
        assert!(init.is_running());
    }

    #[test]
    fn test_wait_on_zombie_returns_exit_code() {
        let system = mock_system(MockFs::with_zombie_process());
        let zombie = Process::new(&system, 4000);
        assert_eq!(zombie.status().unwrap(), ProcessStatus::Zombie);
        assert_eq!(zombie.wait(Some(Duration::ZERO)).unwrap(), Some(3));
    }

    #[test]
    fn test_wait_with_unrepresentable_timeout() {
        let system = mock_system(MockFs::with_zombie_process());
        let zombie = Process::new(&system, 4000);
        assert_eq!(zombie.wait(Some(Duration::MAX)).unwrap(), Some(3));
    }

    #[test]
    fn test_wait_timeout() {
        let system = mock_system(MockFs::typical_system());
        let bash = Process::new(&system, 1000);

        let started = Instant::now();
        let err = bash.wait(Some(Duration::from_millis(30))).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::TimeoutExpired { pid: 1000, timeout } if timeout == Duration::from_millis(30)
        ));
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_wait_returns_when_process_disappears() {
        let fs = MockFs::typical_system();
        let system = mock_system(fs.clone());
        let cat = Process::new(&system, 1001);

        std::thread::scope(|s| {
            s.spawn(|| {
                std::thread::sleep(Duration::from_millis(30));
                fs.remove("/proc/1001");
            });
            assert_eq!(cat.wait(Some(Duration::from_secs(10))).unwrap(), None);
        });
    }

    #[test]
    fn test_signal_to_pid_zero_is_refused() {
        let system = mock_system(MockFs::typical_system());
        assert!(matches!(
            Process::new(&system, 0).kill(),
            Err(ProcessError::NoSuchProcess { pid: 0 })
        ));
    }

    #[test]
    fn test_decode_wait_status() {
        assert_eq!(decode_wait_status(0), 0);
        assert_eq!(decode_wait_status(3 << 8), 3);
        assert_eq!(decode_wait_status(libc::SIGTERM), -libc::SIGTERM);
        assert_eq!(decode_wait_status(libc::SIGKILL | 0x80), -libc::SIGKILL);
    }

    #[cfg(target_os = "linux")]
    mod real {
        use super::*;
        use crate::collector::traits::RealFs;
        use std::process::Command;

        fn real_system() -> SystemCollector<RealFs> {
            SystemCollector::new(RealFs::new(), CollectorConfig::default())
        }

        #[test]
        fn test_self_process() {
            let system = real_system();
            let me = Process::new(&system, std::process::id());
            assert!(me.is_running());
            assert!(!me.name().unwrap().is_empty());
            assert!(me.create_time().unwrap() > 0.0);
            assert!(me.num_threads().unwrap() >= 1);
        }

        #[test]
        fn test_terminate_and_wait() {
            let mut child = Command::new("sleep").arg("30").spawn().unwrap();
            let system = real_system();
            let process = Process::new(&system, child.id());

            assert!(process.is_running());
            assert!(matches!(
                process.wait(Some(Duration::from_millis(50))),
                Err(ProcessError::TimeoutExpired { .. })
            ));

            process.terminate().unwrap();
            let code = process.wait(Some(Duration::from_secs(10))).unwrap();
            assert_eq!(code.unwrap_or(-libc::SIGTERM), -libc::SIGTERM);

            child.wait().unwrap();
            assert!(!process.is_running());
        }

        #[test]
        fn test_kill() {
            let mut child = Command::new("sleep").arg("30").spawn().unwrap();
            let system = real_system();
            let process = Process::new(&system, child.id());

            process.kill().unwrap();
            let code = process.wait(Some(Duration::from_secs(10))).unwrap();
            assert_eq!(code.unwrap_or(-libc::SIGKILL), -libc::SIGKILL);
            child.wait().unwrap();
        }
    }
}
