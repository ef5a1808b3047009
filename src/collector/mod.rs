//! System and process statistics for Linux-like `/proc` filesystems.
//!
//! Every statistic is read on demand from the procfs tree; nothing is
//! sampled in the background. All filesystem access goes through the
//! [`FileSystem`] trait so the same collectors run against the real `/proc`
//! and against in-memory fixtures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  Process handles    │   │     SystemCollector         │  │
//! │  │  - /proc/[pid]/*    │──▶│  - /proc/stat, meminfo      │  │
//! │  │  ProcessIter        │   │  - mounts, diskstats, net/* │  │
//! │  └──────────┬──────────┘   │  - cached boot time, CPUs   │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  ProcReader │──▶ parser, address      │
//! │                     └──────┬──────┘                         │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procstat::collector::Collector;
//!
//! let collector = Collector::default();
//! println!("{:.1}% memory used", collector.virtual_memory().percent);
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procstat::collector::{Collector, MockFs};
//! use procstat::model::ProcessAttr;
//!
//! let collector = Collector::new(MockFs::typical_system());
//! let names: Vec<String> = collector
//!     .process_iter(&[ProcessAttr::Name])
//!     .unwrap()
//!     .filter_map(|entry| entry.attrs.name().map(str::to_string))
//!     .collect();
//! assert_eq!(names, ["systemd", "bash", "cat"]);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod reader;
pub mod traits;

pub use collector::Collector;
pub use mock::MockFs;
pub use procfs::{Process, ProcessEntry, ProcessIter, SystemCollector};
pub use reader::ProcReader;
pub use traits::{FileSystem, FsStats, RealFs};
