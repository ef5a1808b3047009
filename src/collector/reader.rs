//! Raw file reader on top of [`FileSystem`].
//!
//! Every pseudo-filesystem access goes through [`ProcReader`], which reads a
//! file in one pass and classifies failures into [`ReadError`].

use std::path::{Path, PathBuf};

use crate::collector::traits::{FileSystem, FsStats};
use crate::error::ReadError;

/// Reads and classifies pseudo-filesystem entries.
#[derive(Debug, Clone)]
pub struct ProcReader<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> ProcReader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Returns the underlying filesystem.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Reads `path` as text.
    ///
    /// Invalid UTF-8 (binary or corrupted content) is decoded lossily so that
    /// it degrades into a parse failure downstream instead of a read error.
    pub fn read_text(&self, path: impl AsRef<Path>) -> Result<String, ReadError> {
        let bytes = self.read_bytes(path)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }

    /// Reads `path` as raw bytes.
    pub fn read_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, ReadError> {
        let path = path.as_ref();
        self.fs
            .read(path)
            .map_err(|e| ReadError::from_io(path, e))
    }

    /// Resolves the target of the symlink at `path`.
    pub fn read_link(&self, path: impl AsRef<Path>) -> Result<PathBuf, ReadError> {
        let path = path.as_ref();
        self.fs
            .read_link(path)
            .map_err(|e| ReadError::from_io(path, e))
    }

    /// Lists the entries of the directory at `path`.
    pub fn list_dir(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>, ReadError> {
        let path = path.as_ref();
        self.fs
            .read_dir(path)
            .map_err(|e| ReadError::from_io(path, e))
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.fs.exists(path.as_ref())
    }

    /// Block statistics of the filesystem holding `path`.
    pub fn fs_stats(&self, path: impl AsRef<Path>) -> Result<FsStats, ReadError> {
        let path = path.as_ref();
        self.fs
            .statvfs(path)
            .map_err(|e| ReadError::from_io(path, e))
    }
}
