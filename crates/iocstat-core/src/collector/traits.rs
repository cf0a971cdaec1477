//! Filesystem access seam for the procfs engines.
//!
//! Every engine reads its kernel files through `FileSystem`, so the same code
//! runs against the live `/proc` tree and against in-memory fixtures.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the few filesystem operations the engines need.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// procfs files report a size of zero, so implementations must read until
    /// EOF rather than trusting metadata.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netstat");
        std::fs::write(&path, "TcpExt: TcpTimeouts\nTcpExt: 7\n").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(&path).unwrap();
        assert!(content.starts_with("TcpExt: "));
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mounts");
        std::fs::write(&path, "").unwrap();

        let fs = RealFs::new();
        assert!(fs.exists(&path));
        assert!(!fs.exists(&dir.path().join("missing")));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0"), "").unwrap();
        std::fs::write(dir.path().join("1"), "").unwrap();

        let fs = RealFs::new();
        let entries = fs.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_real_fs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let err = fs.read_to_string(&dir.path().join("nfs")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
