//! Collectors for the Linux `/proc` filesystem.
//!
//! Parsers and address decoding are pure functions over file contents;
//! [`SystemCollector`] and [`Process`] combine them with a [`ProcReader`]
//! to produce records.
//!
//! [`ProcReader`]: crate::collector::reader::ProcReader

pub mod address;
pub mod parser;
pub mod process;
mod registry;
pub mod system;

pub use parser::ParseError;
pub use process::Process;
pub use registry::{ProcessEntry, ProcessIter};
pub use system::SystemCollector;

pub(crate) use registry::{list_pids, pid_exists};
