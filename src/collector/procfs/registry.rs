//! Process enumeration.

use std::fmt;

use tracing::{debug, warn};

use crate::collector::procfs::process::Process;
use crate::collector::procfs::system::SystemCollector;
use crate::collector::traits::FileSystem;
use crate::error::{ProcessError, ReadError};
use crate::model::{AttrValue, ProcessAttr, ProcessAttrs};

/// Lists numeric entries of the proc root, sorted ascending.
pub(crate) fn list_pids<F: FileSystem>(system: &SystemCollector<F>) -> Result<Vec<u32>, ReadError> {
    let entries = system.reader().list_dir(&system.config().proc_path)?;
    let mut pids: Vec<u32> = entries
        .iter()
        .filter_map(|entry| entry.file_name()?.to_str()?.parse().ok())
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

pub(crate) fn pid_exists<F: FileSystem>(system: &SystemCollector<F>, pid: u32) -> bool {
    pid != 0 && system.reader().exists(system.proc_file(&pid.to_string()))
}

/// A process yielded by [`ProcessIter`] with its pre-fetched attributes.
pub struct ProcessEntry<'a, F: FileSystem> {
    pub process: Process<'a, F>,
    pub attrs: ProcessAttrs,
}

impl<F: FileSystem> fmt::Debug for ProcessEntry<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessEntry")
            .field("process", &self.process)
            .field("attrs", &self.attrs)
            .finish()
    }
}

/// Iterator over the processes that existed when it was created.
///
/// Processes that exit or deny access to a requested attribute while the
/// iterator advances are skipped.
pub struct ProcessIter<'a, F: FileSystem> {
    system: &'a SystemCollector<F>,
    pids: std::vec::IntoIter<u32>,
    attrs: Vec<ProcessAttr>,
}

impl<F: FileSystem> fmt::Debug for ProcessIter<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessIter")
            .field("remaining", &self.pids.len())
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<'a, F: FileSystem> ProcessIter<'a, F> {
    pub(crate) fn new(system: &'a SystemCollector<F>, attrs: &[ProcessAttr]) -> Result<Self, ReadError> {
        let pids = list_pids(system)?;
        let mut attrs = attrs.to_vec();
        attrs.sort_unstable();
        attrs.dedup();
        Ok(Self {
            system,
            pids: pids.into_iter(),
            attrs,
        })
    }

    fn resolve(&self, process: &Process<'a, F>) -> Result<ProcessAttrs, ProcessError> {
        let mut values = ProcessAttrs::new();
        for attr in &self.attrs {
            values.insert(resolve_attr(process, *attr)?);
        }
        Ok(values)
    }
}

impl<'a, F: FileSystem> Iterator for ProcessIter<'a, F> {
    type Item = ProcessEntry<'a, F>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(pid) = self.pids.next() {
            if !pid_exists(self.system, pid) {
                debug!(pid, "process exited during enumeration");
                continue;
            }

            let process = Process::new(self.system, pid);
            match self.resolve(&process) {
                Ok(attrs) => return Some(ProcessEntry { process, attrs }),
                Err(e) if e.is_skippable() => {
                    debug!(pid, error = %e, "skipping process");
                }
                Err(e) => {
                    warn!(pid, error = %e, "skipping process");
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.pids.len()))
    }
}

fn resolve_attr<F: FileSystem>(
    process: &Process<'_, F>,
    attr: ProcessAttr,
) -> Result<AttrValue, ProcessError> {
    Ok(match attr {
        ProcessAttr::Pid => AttrValue::Pid(process.pid()),
        ProcessAttr::Name => AttrValue::Name(process.name()?),
        ProcessAttr::Exe => AttrValue::Exe(process.exe()?),
        ProcessAttr::Cmdline => AttrValue::Cmdline(process.cmdline()?),
        ProcessAttr::Status => AttrValue::Status(process.status()?),
        ProcessAttr::Ppid => AttrValue::Ppid(process.ppid()?),
        ProcessAttr::CreateTime => AttrValue::CreateTime(process.create_time()?),
        ProcessAttr::MemoryInfo => AttrValue::MemoryInfo(process.memory_info()?),
        ProcessAttr::CpuTimes => AttrValue::CpuTimes(process.cpu_times()?),
        ProcessAttr::NumThreads => AttrValue::NumThreads(process.num_threads()?),
    })
}
