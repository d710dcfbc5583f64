//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/sys/fs/bcache` states
//! for testing various cache configurations.

use super::filesystem::MockFs;

/// Root used by every scenario.
pub const SCENARIO_ROOT: &str = "/sys/fs/bcache";

impl MockFs {
    /// Adds the control files the kernel always exposes at the bcache root.
    fn add_bcache_root(&mut self) {
        self.add_file(format!("{}/register", SCENARIO_ROOT), "");
        self.add_file(format!("{}/register_quiet", SCENARIO_ROOT), "");
        self.add_file(format!("{}/pendings_cleanup", SCENARIO_ROOT), "");
    }

    /// Adds the cache-set level files that are not backing device entries.
    fn add_cache_set_files(&mut self, uuid: &str) {
        let set = format!("{}/{}", SCENARIO_ROOT, uuid);
        self.add_file(format!("{}/cache_available_percent", set), "97\n");
        self.add_file(format!("{}/block_size", set), "512\n");
        self.add_file(format!("{}/bucket_size", set), "512.0k\n");
        self.add_symlink(
            format!("{}/cache0", set),
            "../../../devices/pci0000:00/nvme0n1/bcache",
        );
    }

    /// One cache set `abc-uuid` with backing entry `bdev0` resolving to `sdb`.
    ///
    /// `dirty_data` is `512k`; the five-minute window has 10 hits and no misses.
    pub fn bcache_single_device() -> Self {
        let mut fs = Self::new();
        fs.add_bcache_root();
        fs.add_cache_set_files("abc-uuid");

        let set = format!("{}/abc-uuid", SCENARIO_ROOT);
        fs.add_backing_device(&set, "bdev0", "sdb", "512k");
        fs.add_file(
            format!("{}/bdev0/stats_five_minute/cache_hits", set),
            "10\n",
        );
        fs.add_file(
            format!("{}/bdev0/stats_five_minute/cache_misses", set),
            "0\n",
        );
        fs
    }

    /// One cache set `two-uuid` with two backing entries.
    ///
    /// `bdev0 -> bcache0` carries `1k` dirty, 3 hits and 1 miss in every window.
    /// `bdev1 -> bcache1` carries `2k` dirty and only misses.
    pub fn bcache_two_backing_devices() -> Self {
        let mut fs = Self::new();
        fs.add_bcache_root();
        fs.add_cache_set_files("two-uuid");

        let set = format!("{}/two-uuid", SCENARIO_ROOT);
        fs.add_backing_device(&set, "bdev0", "bcache0", "1k");
        fs.add_backing_device(&set, "bdev1", "bcache1", "2k");
        for window in ["five_minute", "hour", "day", "total"] {
            fs.add_file(format!("{}/bdev0/stats_{}/cache_hits", set, window), "3\n");
            fs.add_file(
                format!("{}/bdev0/stats_{}/cache_misses", set, window),
                "1\n",
            );
            fs.add_file(format!("{}/bdev1/stats_{}/cache_hits", set, window), "0\n");
            fs.add_file(
                format!("{}/bdev1/stats_{}/cache_misses", set, window),
                "50\n",
            );
        }
        fs.add_file(
            format!("{}/bdev0/stats_five_minute/cache_readaheads", set),
            "7\n",
        );
        fs.add_file(
            format!("{}/bdev1/stats_five_minute/cache_readaheads", set),
            "99\n",
        );
        fs
    }

    /// A cache set with only a cache device attached and no backing entries.
    pub fn bcache_cache_only() -> Self {
        let mut fs = Self::new();
        fs.add_bcache_root();
        fs.add_cache_set_files("lonely-uuid");
        fs
    }

    /// A busy writeback cache with distinct counters in every window.
    pub fn bcache_busy_device() -> Self {
        let mut fs = Self::new();
        fs.add_bcache_root();
        fs.add_cache_set_files("busy-uuid");

        let set = format!("{}/busy-uuid", SCENARIO_ROOT);
        fs.add_backing_device(&set, "bdev0", "bcache0", "1.5G");

        let windows = [
            ("five_minute", "900", "100"),
            ("hour", "9000", "3000"),
            ("day", "80000", "20000"),
            ("total", "1000000", "0"),
        ];
        for (window, hits, misses) in windows {
            let stats = format!("{}/bdev0/stats_{}", set, window);
            fs.add_file(format!("{}/cache_hits", stats), format!("{}\n", hits));
            fs.add_file(format!("{}/cache_misses", stats), format!("{}\n", misses));
        }

        let stats = format!("{}/bdev0/stats_five_minute", set);
        fs.add_file(format!("{}/cache_bypass_hits", stats), "12\n");
        fs.add_file(format!("{}/cache_bypass_misses", stats), "34\n");
        fs.add_file(format!("{}/cache_miss_collisions", stats), "2\n");
        fs.add_file(format!("{}/cache_readaheads", stats), "5\n");
        fs.add_file(format!("{}/bypassed", stats), "20.5M\n");
        fs
    }
}
