//! Typed records returned by the collectors.

mod process;
mod system;

pub use process::{
    AttrValue, OpenFile, ProcessAttr, ProcessAttrs, ProcessCpuTimes, ProcessMemoryInfo,
    ProcessStatus,
};
pub use system::{
    Address, ConnectionKind, ConnectionStatus, CpuTimes, DiskIo, DiskPartition, DiskUsage,
    Family, NetConnection, NetIo, SocketType, SwapMemory, User, VirtualMemory,
};
