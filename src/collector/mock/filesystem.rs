//! In-memory mock filesystem for testing collectors without real `/sys`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without bcache.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files, directories and symlinks in memory. Symlinks are only
/// resolved by `read_link`; other operations treat them as plain entries.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to link target.
    symlinks: HashMap<PathBuf, PathBuf>,
    /// Paths that exist but fail to read with `PermissionDenied`.
    unreadable: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
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

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    ///
    /// The target is stored verbatim and does not need to exist.
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.symlinks.insert(path, target.as_ref().to_path_buf());
    }

    /// Marks an existing file as unreadable (reads fail with `PermissionDenied`).
    pub fn deny_read(&mut self, path: impl AsRef<Path>) {
        self.unreadable.insert(path.as_ref().to_path_buf());
    }

    /// Adds one backing device entry with every file the kernel exposes for it.
    ///
    /// # Arguments
    /// * `set_dir` - Cache set directory, e.g. `/sys/fs/bcache/<uuid>`
    /// * `entry` - Entry name, e.g. `bdev0`
    /// * `device` - Block device the `dev` link resolves to, e.g. `bcache0`
    /// * `dirty_data` - Content of `dirty_data`
    ///
    /// Every `stats_<window>` counter starts at `0`; override single files
    /// with `add_file` afterwards.
    pub fn add_backing_device(
        &mut self,
        set_dir: impl AsRef<Path>,
        entry: &str,
        device: &str,
        dirty_data: &str,
    ) {
        let base = set_dir.as_ref().join(entry);
        self.add_dir(&base);
        self.add_symlink(
            base.join("dev"),
            format!("../../../devices/virtual/block/{}", device),
        );
        self.add_file(base.join("dirty_data"), format!("{}\n", dirty_data));
        for window in ["five_minute", "hour", "day", "total"] {
            let stats = base.join(format!("stats_{}", window));
            for counter in [
                "cache_hits",
                "cache_misses",
                "cache_bypass_hits",
                "cache_bypass_misses",
                "cache_miss_collisions",
                "cache_readaheads",
            ] {
                self.add_file(stats.join(counter), "0\n");
            }
            self.add_file(stats.join("bypassed"), "0\n");
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

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Find all files, links and directories that are direct children
        let children = self
            .files
            .keys()
            .chain(self.symlinks.keys())
            .chain(self.directories.iter());
        for child in children {
            if child != path && child.parent().is_some_and(|parent| parent == path) {
                entries.insert(child.clone());
            }
        }

        // Sorted so fixtures produce a deterministic listing order.
        let mut entries: Vec<PathBuf> = entries.into_iter().collect();
        entries.sort();
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.symlinks.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {:?}", path),
            )
        })
    }
}
