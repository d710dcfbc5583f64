//! Best-effort reads from the bcache sysfs tree.
//!
//! Every read degrades to an empty result when a node is missing or
//! unreadable. `NodeRead` keeps the reason around so callers can still log
//! the difference between the two.

use std::io;
use std::path::Path;

use tracing::debug;

use super::parser::parse_first_line;
use crate::collector::traits::FileSystem;

/// Outcome of reading one sysfs node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRead<T> {
    /// The node exists and was read.
    Present(T),
    /// The node does not exist.
    Absent,
    /// The node exists but could not be read.
    Unreadable(io::ErrorKind),
}

impl<T> NodeRead<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NodeRead<U> {
        match self {
            NodeRead::Present(value) => NodeRead::Present(f(value)),
            NodeRead::Absent => NodeRead::Absent,
            NodeRead::Unreadable(kind) => NodeRead::Unreadable(kind),
        }
    }

    /// Returns the value, or `T::default()` for absent and unreadable nodes.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            NodeRead::Present(value) => value,
            _ => T::default(),
        }
    }

    fn from_io(path: &Path, result: io::Result<T>) -> Self {
        match result {
            Ok(value) => NodeRead::Present(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => NodeRead::Absent,
            Err(e) => {
                debug!("Unreadable sysfs node {}: {}", path.display(), e);
                NodeRead::Unreadable(e.kind())
            }
        }
    }
}

/// Reads values and listings from sysfs through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct SysfsReader<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> SysfsReader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Returns every line of the file at `path`.
    pub fn read_lines(&self, path: &Path) -> NodeRead<Vec<String>> {
        NodeRead::from_io(path, self.fs.read_to_string(path))
            .map(|content| content.lines().map(str::to_string).collect())
    }

    /// Returns the first line of the file at `path`, trailing whitespace removed.
    pub fn read_first_line(&self, path: &Path) -> NodeRead<String> {
        self.read_lines(path).map(|lines| {
            lines
                .first()
                .map(|line| parse_first_line(line).to_string())
                .unwrap_or_default()
        })
    }

    /// Returns the names of the entries of the directory at `path`.
    ///
    /// Missing paths and non-directories yield an empty list.
    pub fn list_children(&self, path: &Path) -> Vec<String> {
        let Ok(entries) = self.fs.read_dir(path) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| entry.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    /// Returns the final path component of the symlink target at `path`.
    pub fn resolve_symlink(&self, path: &Path) -> Option<String> {
        match self.fs.read_link(path) {
            Ok(target) => target
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Err(e) => {
                debug!("Cannot resolve link {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn reader() -> SysfsReader<MockFs> {
        let mut fs = MockFs::new();
        fs.add_file("/sys/fs/bcache/abc/bdev0/dirty_data", "512k\nignored\n");
        fs.add_file("/sys/fs/bcache/abc/bdev0/label", "");
        fs.add_file("/sys/fs/bcache/abc/bdev0/secret", "1\n");
        fs.deny_read("/sys/fs/bcache/abc/bdev0/secret");
        fs.add_symlink(
            "/sys/fs/bcache/abc/bdev0/dev",
            "../../../devices/virtual/block/sdb",
        );
        SysfsReader::new(fs)
    }

    #[test]
    fn test_read_lines() {
        let r = reader();
        let lines = r.read_lines(Path::new("/sys/fs/bcache/abc/bdev0/dirty_data"));
        assert_eq!(
            lines,
            NodeRead::Present(vec!["512k".to_string(), "ignored".to_string()])
        );
    }

    #[test]
    fn test_read_lines_absent_and_unreadable() {
        let r = reader();
        let absent = r.read_lines(Path::new("/sys/fs/bcache/abc/bdev0/missing"));
        assert_eq!(absent, NodeRead::Absent);
        assert!(absent.unwrap_or_default().is_empty());

        let denied = r.read_lines(Path::new("/sys/fs/bcache/abc/bdev0/secret"));
        assert_eq!(
            denied,
            NodeRead::Unreadable(io::ErrorKind::PermissionDenied)
        );
        assert!(denied.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_read_first_line() {
        let r = reader();
        assert_eq!(
            r.read_first_line(Path::new("/sys/fs/bcache/abc/bdev0/dirty_data")),
            NodeRead::Present("512k".to_string())
        );
        assert_eq!(
            r.read_first_line(Path::new("/sys/fs/bcache/abc/bdev0/label")),
            NodeRead::Present(String::new())
        );
        assert_eq!(
            r.read_first_line(Path::new("/nope")).unwrap_or_default(),
            ""
        );
    }

    #[test]
    fn test_list_children() {
        let r = reader();
        let mut children = r.list_children(Path::new("/sys/fs/bcache/abc/bdev0"));
        children.sort();
        assert_eq!(children, vec!["dev", "dirty_data", "label", "secret"]);

        assert!(r.list_children(Path::new("/sys/fs/missing")).is_empty());
        assert!(
            r.list_children(Path::new("/sys/fs/bcache/abc/bdev0/dirty_data"))
                .is_empty()
        );
    }

    #[test]
    fn test_resolve_symlink() {
        let r = reader();
        assert_eq!(
            r.resolve_symlink(Path::new("/sys/fs/bcache/abc/bdev0/dev")),
            Some("sdb".to_string())
        );
        assert_eq!(
            r.resolve_symlink(Path::new("/sys/fs/bcache/abc/bdev0/dirty_data")),
            None
        );
    }
}
