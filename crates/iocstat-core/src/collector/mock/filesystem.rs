//! In-memory mock filesystem for testing engines without real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Files can be added, replaced and removed between polls to simulate
/// counters moving, subsystems disappearing, or permissions changing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Paths that exist but fail to read with `PermissionDenied`.
    unreadable: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.unreadable.remove(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Removes a file, as if the kernel module providing it was unloaded.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.remove(path);
        self.unreadable.remove(path);
    }

    /// Marks a path as present but unreadable.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.remove(&path);
        self.unreadable.insert(path);
    }

    /// Populates `<proc>/self/fd` with `count` descriptor entries.
    pub fn add_fds(&mut self, proc_path: &str, count: usize) {
        let dir = PathBuf::from(format!("{}/self/fd", proc_path));
        self.add_dir(&dir);
        for fd in 0..count {
            self.add_file(dir.join(fd.to_string()), "");
        }
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.unreadable.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/net/netstat", "TcpExt: TcpTimeouts\n");

        assert!(fs.exists(Path::new("/proc/net/netstat")));
        assert!(fs.exists(Path::new("/proc/net")));

        let content = fs.read_to_string(Path::new("/proc/net/netstat")).unwrap();
        assert_eq!(content, "TcpExt: TcpTimeouts\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_fds("/proc", 3);

        let entries = fs.read_dir(Path::new("/proc/self/fd")).unwrap();
        assert_eq!(entries.len(), 3);

        let self_entries = fs.read_dir(Path::new("/proc/self")).unwrap();
        assert_eq!(self_entries.len(), 1);
    }

    #[test]
    fn test_mock_fs_remove_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/net/rpc/nfs", "net 0 0 0 0\nrpc 1 2 3\n");
        fs.remove_file("/proc/net/rpc/nfs");

        assert!(!fs.exists(Path::new("/proc/net/rpc/nfs")));
        let err = fs
            .read_to_string(Path::new("/proc/net/rpc/nfs"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_fs_deny() {
        let mut fs = MockFs::new();
        fs.deny("/proc/net/netstat");

        assert!(fs.exists(Path::new("/proc/net/netstat")));
        let err = fs
            .read_to_string(Path::new("/proc/net/netstat"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        fs.add_file("/proc/net/netstat", "IpExt: InNoRoutes\n");
        assert!(fs.read_to_string(Path::new("/proc/net/netstat")).is_ok());
    }
}
