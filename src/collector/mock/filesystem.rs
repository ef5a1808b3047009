//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! `MockFs` simulates a filesystem in memory. Clones share the same tree, so
//! a test can remove a process directory while a collector holding another
//! clone is in the middle of an enumeration.

use crate::collector::traits::{FileSystem, FsStats};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tree {
    /// Map from path to file contents.
    files: HashMap<PathBuf, Vec<u8>>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to link target.
    symlinks: HashMap<PathBuf, PathBuf>,
    /// Paths (and everything below them) that fail with `PermissionDenied`.
    denied: HashSet<PathBuf>,
    /// statvfs results keyed by mount point.
    fs_stats: HashMap<PathBuf, FsStats>,
}

impl Tree {
    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.iter().any(|d| path.starts_with(d)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        Ok(())
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found: {:?}", what, path))
}

/// In-memory filesystem for testing.
///
/// Stores files, directories and symlinks in memory, allowing tests to
/// simulate various `/proc` states (including vanished processes and
/// permission failures) without Linux access.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    tree: Arc<RwLock<Tree>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds (or replaces) a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.tree_mut();
        tree.add_parents(&path);
        tree.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.tree_mut();
        tree.add_parents(&path);
        tree.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.tree_mut();
        tree.add_parents(&path);
        tree.symlinks.insert(path, target.as_ref().to_path_buf());
    }

    /// Makes every access to `path` (and below it) fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.tree_mut().denied.insert(path.as_ref().to_path_buf());
    }

    /// Registers statvfs results for the filesystem mounted at `path`.
    pub fn set_fs_stats(&self, path: impl AsRef<Path>, stats: FsStats) {
        self.tree_mut()
            .fs_stats
            .insert(path.as_ref().to_path_buf(), stats);
    }

    /// Removes `path` and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.tree_mut();
        tree.files.retain(|p, _| !p.starts_with(path));
        tree.directories.retain(|p| !p.starts_with(path));
        tree.symlinks.retain(|p, _| !p.starts_with(path));
    }

    /// Adds a process with its typical `/proc/[pid]/` files.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `status` - Content of `/proc/[pid]/status`
    /// * `cmdline` - Content of `/proc/[pid]/cmdline`
    /// * `comm` - Content of `/proc/[pid]/comm`
    pub fn add_process(&self, pid: u32, stat: &str, status: &str, cmdline: &str, comm: &str) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_dir(base.join("fd"));
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("status"), status);
        self.add_file(base.join("cmdline"), cmdline);
        self.add_file(base.join("comm"), comm);
    }

    /// Loads a mock filesystem from a directory snapshot mounted at `mount`.
    ///
    /// Useful for regression tests against captured `/proc` trees. Symlinks
    /// are recorded as symlinks, not followed.
    pub fn from_snapshot(dir: &Path, mount: &Path) -> io::Result<Self> {
        let fs = Self::new();
        load_directory_recursive(&fs, dir, mount)?;
        Ok(fs)
    }
}

fn load_directory_recursive(fs: &MockFs, real_path: &Path, virtual_path: &Path) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let real_child = entry.path();
        let virtual_child = virtual_path.join(entry.file_name());

        if file_type.is_symlink() {
            fs.add_symlink(&virtual_child, std::fs::read_link(&real_child)?);
        } else if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            fs.add_file(&virtual_child, std::fs::read(&real_child)?);
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let tree = self.tree();
        if !tree.files.contains_key(path) {
            return Err(not_found("file", path));
        }
        tree.check_access(path)?;
        Ok(tree.files[path].clone())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.tree();
        tree.files.contains_key(path)
            || tree.directories.contains(path)
            || tree.symlinks.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let tree = self.tree();
        if !tree.directories.contains(path) {
            return Err(not_found("directory", path));
        }
        tree.check_access(path)?;

        let is_child = |p: &Path| p.parent().is_some_and(|parent| parent == path) && p != path;

        let mut entries = HashSet::new();
        entries.extend(tree.files.keys().filter(|p| is_child(p)).cloned());
        entries.extend(tree.directories.iter().filter(|p| is_child(p)).cloned());
        entries.extend(tree.symlinks.keys().filter(|p| is_child(p)).cloned());

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let tree = self.tree();
        let Some(target) = tree.symlinks.get(path) else {
            if tree.files.contains_key(path) || tree.directories.contains(path) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a symlink: {:?}", path),
                ));
            }
            return Err(not_found("symlink", path));
        };
        tree.check_access(path)?;
        Ok(target.clone())
    }

    fn statvfs(&self, path: &Path) -> io::Result<FsStats> {
        let tree = self.tree();
        // Longest registered mount point that contains `path`.
        tree.fs_stats
            .iter()
            .filter(|(mount, _)| path.starts_with(mount))
            .max_by_key(|(mount, _)| mount.as_os_str().len())
            .map(|(_, stats)| *stats)
            .ok_or_else(|| not_found("filesystem", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");

        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read(Path::new("/proc/meminfo")).unwrap();
        assert_eq!(content, b"MemTotal: 16384 kB\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let fs = MockFs::new();
        fs.add_file("/proc/1/stat", "stat content");
        fs.add_file("/proc/1/status", "status content");
        fs.add_file("/proc/2/stat", "stat content 2");
        fs.add_symlink("/proc/self", "/proc/1");

        let proc_entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(proc_entries.len(), 3); // /proc/1, /proc/2 and /proc/self

        let proc1_entries = fs.read_dir(Path::new("/proc/1")).unwrap();
        assert_eq!(proc1_entries.len(), 2); // stat and status
    }

    #[test]
    fn test_mock_fs_add_process() {
        let fs = MockFs::new();
        fs.add_process(
            1234,
            "1234 (bash) S 1233 1234 1234 0 -1 4194304 100 0 0 0 10 5 0 0 20 0 1 0 12345 12345678 100 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\tbash\nPid:\t1234\nPPid:\t1233\n",
            "/bin/bash\0--login\0",
            "bash\n",
        );

        assert!(fs.exists(Path::new("/proc/1234")));
        assert!(fs.exists(Path::new("/proc/1234/stat")));
        assert!(fs.exists(Path::new("/proc/1234/status")));
        assert!(fs.exists(Path::new("/proc/1234/cmdline")));
        assert!(fs.exists(Path::new("/proc/1234/comm")));
        assert!(fs.read_dir(Path::new("/proc/1234/fd")).unwrap().is_empty());
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read(Path::new("/nonexistent"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_fs_remove_is_shared_between_clones() {
        let fs = MockFs::new();
        fs.add_file("/proc/2/stat", "2 (x) S 1");
        let other = fs.clone();

        fs.remove("/proc/2");

        assert!(!other.exists(Path::new("/proc/2")));
        assert!(!other.exists(Path::new("/proc/2/stat")));
        assert!(other.exists(Path::new("/proc")));
    }

    #[test]
    fn test_mock_fs_deny() {
        let fs = MockFs::new();
        fs.add_file("/proc/1/fd/3", "");
        fs.deny("/proc/1/fd");

        let err = fs.read_dir(Path::new("/proc/1/fd")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        let err = fs.read(Path::new("/proc/1/fd/3")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_mock_fs_statvfs_longest_mount() {
        let fs = MockFs::new();
        let root = FsStats {
            fragment_size: 4096,
            blocks: 100,
            blocks_free: 50,
            blocks_available: 40,
        };
        let home = FsStats {
            blocks: 1000,
            ..root
        };
        fs.set_fs_stats("/", root);
        fs.set_fs_stats("/home", home);

        assert_eq!(fs.statvfs(Path::new("/home/user")).unwrap(), home);
        assert_eq!(fs.statvfs(Path::new("/var")).unwrap(), root);
    }

    #[test]
    fn test_mock_fs_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("42/fd")).unwrap();
        std::fs::write(dir.path().join("42/comm"), "sleep\n").unwrap();
        std::os::unix::fs::symlink("/usr/bin/sleep", dir.path().join("42/exe")).unwrap();

        let fs = MockFs::from_snapshot(dir.path(), Path::new("/proc")).unwrap();

        assert_eq!(fs.read(Path::new("/proc/42/comm")).unwrap(), b"sleep\n");
        assert_eq!(
            fs.read_link(Path::new("/proc/42/exe")).unwrap(),
            PathBuf::from("/usr/bin/sleep")
        );
        assert!(fs.exists(Path::new("/proc/42/fd")));
    }
}
