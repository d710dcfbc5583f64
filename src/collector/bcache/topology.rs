//! Discovery of cache sets and their backing devices.

use std::path::PathBuf;

use tracing::{debug, info};

use super::sysfs::SysfsReader;
use crate::collector::traits::FileSystem;

/// Kernel-assigned UUID of one cache set.
pub type CacheSetId = String;

/// Short name of a block device, e.g. `bcache0`.
pub type DeviceName = String;

/// Name prefix of backing device entries inside a cache set directory.
pub const BACKING_ENTRY_PREFIX: &str = "bdev";

/// View of the bcache sysfs tree rooted at a fixed path.
#[derive(Debug, Clone)]
pub struct BcacheTree<F: FileSystem> {
    reader: SysfsReader<F>,
    root: PathBuf,
}

impl<F: FileSystem> BcacheTree<F> {
    /// Creates a tree view.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `root` - Path to the bcache sysfs root (usually "/sys/fs/bcache")
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            reader: SysfsReader::new(fs),
            root: root.into(),
        }
    }

    pub fn reader(&self) -> &SysfsReader<F> {
        &self.reader
    }

    /// Path to the directory of one backing entry.
    pub fn entry_path(&self, set: &str, entry: &str) -> PathBuf {
        self.root.join(set).join(entry)
    }

    /// Lists active cache sets.
    ///
    /// An absent root means bcache is not loaded, which is a valid idle state.
    /// Plain files under the root (`register`, ...) are skipped.
    pub fn list_cache_sets(&self) -> Vec<CacheSetId> {
        if !self.reader.is_dir(&self.root) {
            info!("bcache subsystem not active ({})", self.root.display());
            return Vec::new();
        }

        self.reader
            .list_children(&self.root)
            .into_iter()
            .filter(|name| self.reader.is_dir(&self.root.join(name)))
            .collect()
    }

    /// Lists backing device entries (`bdev*`) of a cache set, in listing order.
    pub fn list_backing_entries(&self, set: &str) -> Vec<String> {
        self.reader
            .list_children(&self.root.join(set))
            .into_iter()
            .filter(|name| name.starts_with(BACKING_ENTRY_PREFIX))
            .collect()
    }

    /// Resolves one backing entry to its block device name via the `dev` link.
    pub fn resolve_device_name(&self, set: &str, entry: &str) -> Option<DeviceName> {
        self.reader
            .resolve_symlink(&self.entry_path(set, entry).join("dev"))
    }

    /// Resolves every backing entry of a cache set.
    ///
    /// Entries whose `dev` link cannot be resolved are skipped. The order
    /// follows the directory listing and is only meaningful for display.
    pub fn map_to_devices(&self, set: &str) -> Vec<DeviceName> {
        self.list_backing_entries(set)
            .iter()
            .filter_map(|entry| {
                let device = self.resolve_device_name(set, entry);
                if device.is_none() {
                    debug!("Skipping {}/{}: no device link", set, entry);
                }
                device
            })
            .collect()
    }
}
