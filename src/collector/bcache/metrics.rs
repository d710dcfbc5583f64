//! Derived bcache metrics for one cache set.
//!
//! Only `dirty_data` aggregates over every backing entry. Hit ratios,
//! request outcomes and bypassed bytes are read from the first backing
//! entry alone, which assumes one backing device per cache set.

use std::path::{Path, PathBuf};

use super::parser::{ParseError, parse_byte_size, parse_counter, parse_float};
use super::sample::{
    FAMILY_BYTES, FAMILY_CACHE_RATIO, FAMILY_DIRTY_DATA, FAMILY_REQUESTS, MetricValue,
};
use super::sysfs::NodeRead;
use super::topology::BcacheTree;
use crate::collector::traits::FileSystem;

/// Aggregation window of the kernel's request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    FiveMinute,
    Hour,
    Day,
    Total,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::FiveMinute,
        TimeWindow::Hour,
        TimeWindow::Day,
        TimeWindow::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::FiveMinute => "five_minute",
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Total => "total",
        }
    }

    /// Name of the statistics directory, e.g. `stats_five_minute`.
    pub fn stats_dir(&self) -> String {
        format!("stats_{}", self.as_str())
    }
}

/// Outcome of a request as counted by bcache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    BypassHits,
    BypassMisses,
    Hits,
    MissCollisions,
    Misses,
    Readaheads,
}

impl RequestOutcome {
    pub const ALL: [RequestOutcome; 6] = [
        RequestOutcome::BypassHits,
        RequestOutcome::BypassMisses,
        RequestOutcome::Hits,
        RequestOutcome::MissCollisions,
        RequestOutcome::Misses,
        RequestOutcome::Readaheads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::BypassHits => "bypass_hits",
            RequestOutcome::BypassMisses => "bypass_misses",
            RequestOutcome::Hits => "hits",
            RequestOutcome::MissCollisions => "miss_collisions",
            RequestOutcome::Misses => "misses",
            RequestOutcome::Readaheads => "readaheads",
        }
    }

    /// Name of the counter file, e.g. `cache_bypass_hits`.
    pub fn file_name(&self) -> String {
        format!("cache_{}", self.as_str())
    }
}

/// Error type for metric computation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// A sysfs node held a token that is not a valid number.
    Malformed { path: PathBuf, error: ParseError },
}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::Malformed { path, error } => write!(
                f,
                "malformed value in {}: {}",
                path.display(),
                error.message
            ),
        }
    }
}

impl std::error::Error for MetricError {}

/// One computed metric of a cache set, before it is tagged with a device.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub family: &'static str,
    pub sub_metric: &'static str,
    pub value: Result<MetricValue, MetricError>,
}

/// Computes metrics of cache sets from a [`BcacheTree`].
pub struct MetricComputer<'a, F: FileSystem> {
    tree: &'a BcacheTree<F>,
}

impl<'a, F: FileSystem> MetricComputer<'a, F> {
    pub fn new(tree: &'a BcacheTree<F>) -> Self {
        Self { tree }
    }

    /// Reads a token and parses it; absent, unreadable and empty nodes count as zero.
    fn read_number<T: Default>(
        &self,
        path: &Path,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, MetricError> {
        let token = match self.tree.reader().read_first_line(path) {
            NodeRead::Present(token) if !token.is_empty() => token,
            _ => return Ok(T::default()),
        };
        parse(&token).map_err(|error| MetricError::Malformed {
            path: path.to_path_buf(),
            error,
        })
    }

    fn first_entry(&self, set: &str) -> Option<PathBuf> {
        self.tree
            .list_backing_entries(set)
            .first()
            .map(|entry| self.tree.entry_path(set, entry))
    }

    /// Dirty bytes summed over every backing entry of the set.
    pub fn dirty_data(&self, set: &str) -> Result<u64, MetricError> {
        let mut total: u64 = 0;
        for entry in self.tree.list_backing_entries(set) {
            let path = self.tree.entry_path(set, &entry).join("dirty_data");
            total = total.saturating_add(self.read_number(&path, parse_byte_size)?);
        }
        Ok(total)
    }

    /// Hit ratio in percent for `window`, from the first backing entry.
    ///
    /// No traffic at all counts as a perfect 100. A set without backing
    /// entries yields 0.
    pub fn cache_hit_ratio(&self, set: &str, window: TimeWindow) -> Result<f64, MetricError> {
        let Some(entry) = self.first_entry(set) else {
            return Ok(0.0);
        };
        let stats = entry.join(window.stats_dir());
        let hits = self.read_number(&stats.join("cache_hits"), parse_float)?;
        let misses = self.read_number(&stats.join("cache_misses"), parse_float)?;

        let total = hits + misses;
        if total == 0.0 {
            return Ok(100.0);
        }
        Ok(100.0 * hits / total)
    }

    /// Five-minute counter for `outcome`, from the first backing entry.
    pub fn cache_result_count(
        &self,
        set: &str,
        outcome: RequestOutcome,
    ) -> Result<u64, MetricError> {
        let Some(entry) = self.first_entry(set) else {
            return Ok(0);
        };
        let path = entry
            .join(TimeWindow::FiveMinute.stats_dir())
            .join(outcome.file_name());
        self.read_number(&path, parse_counter)
    }

    /// Bytes that bypassed the cache in the last five minutes, from the first backing entry.
    pub fn bypassed_bytes(&self, set: &str) -> Result<u64, MetricError> {
        let Some(entry) = self.first_entry(set) else {
            return Ok(0);
        };
        let path = entry
            .join(TimeWindow::FiveMinute.stats_dir())
            .join("bypassed");
        self.read_number(&path, parse_byte_size)
    }

    /// Computes every metric of a cache set in emission order.
    ///
    /// Order: dirty data, one ratio per window, one counter per outcome,
    /// bypassed bytes.
    pub fn compute_all(&self, set: &str) -> Vec<MetricReading> {
        let mut readings =
            Vec::with_capacity(2 + TimeWindow::ALL.len() + RequestOutcome::ALL.len());

        readings.push(MetricReading {
            family: FAMILY_DIRTY_DATA,
            sub_metric: "dirty_data",
            value: self.dirty_data(set).map(MetricValue::Bytes),
        });

        for window in TimeWindow::ALL {
            readings.push(MetricReading {
                family: FAMILY_CACHE_RATIO,
                sub_metric: window.as_str(),
                value: self.cache_hit_ratio(set, window).map(MetricValue::Percent),
            });
        }

        for outcome in RequestOutcome::ALL {
            readings.push(MetricReading {
                family: FAMILY_REQUESTS,
                sub_metric: outcome.as_str(),
                value: self
                    .cache_result_count(set, outcome)
                    .map(MetricValue::Count),
            });
        }

        readings.push(MetricReading {
            family: FAMILY_BYTES,
            sub_metric: "bypassed",
            value: self.bypassed_bytes(set).map(MetricValue::Bytes),
        });

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, SCENARIO_ROOT};

    fn tree(fs: MockFs) -> BcacheTree<MockFs> {
        BcacheTree::new(fs, SCENARIO_ROOT)
    }

    #[test]
    fn test_dirty_data_single() {
        let t = tree(MockFs::bcache_single_device());
        let m = MetricComputer::new(&t);
        assert_eq!(m.dirty_data("abc-uuid").unwrap(), 524_288);
    }

    #[test]
    fn test_dirty_data_sums_entries() {
        let t = tree(MockFs::bcache_two_backing_devices());
        let m = MetricComputer::new(&t);
        assert_eq!(m.dirty_data("two-uuid").unwrap(), 3072);
    }

    #[test]
    fn test_ratio_uses_first_entry_only() {
        let t = tree(MockFs::bcache_two_backing_devices());
        let m = MetricComputer::new(&t);
        for window in TimeWindow::ALL {
            assert_eq!(m.cache_hit_ratio("two-uuid", window).unwrap(), 75.0);
        }
        assert_eq!(
            m.cache_result_count("two-uuid", RequestOutcome::Readaheads)
                .unwrap(),
            7
        );
    }

    #[test]
    fn test_ratio_no_traffic_is_100() {
        let t = tree(MockFs::bcache_single_device());
        let m = MetricComputer::new(&t);
        assert_eq!(
            m.cache_hit_ratio("abc-uuid", TimeWindow::FiveMinute)
                .unwrap(),
            100.0
        );
        // Every counter in the hour window is "0" as well
        assert_eq!(
            m.cache_hit_ratio("abc-uuid", TimeWindow::Hour).unwrap(),
            100.0
        );
    }

    #[test]
    fn test_busy_device() {
        let t = tree(MockFs::bcache_busy_device());
        let m = MetricComputer::new(&t);
        assert_eq!(m.dirty_data("busy-uuid").unwrap(), 1_610_612_736);
        assert_eq!(
            m.cache_hit_ratio("busy-uuid", TimeWindow::FiveMinute)
                .unwrap(),
            90.0
        );
        assert_eq!(
            m.cache_hit_ratio("busy-uuid", TimeWindow::Hour).unwrap(),
            75.0
        );
        assert_eq!(
            m.cache_hit_ratio("busy-uuid", TimeWindow::Day).unwrap(),
            80.0
        );
        assert_eq!(
            m.cache_hit_ratio("busy-uuid", TimeWindow::Total).unwrap(),
            100.0
        );
        assert_eq!(
            m.cache_result_count("busy-uuid", RequestOutcome::BypassMisses)
                .unwrap(),
            34
        );
        assert_eq!(m.bypassed_bytes("busy-uuid").unwrap(), 21_495_808);
    }

    #[test]
    fn test_no_backing_entries() {
        let t = tree(MockFs::bcache_cache_only());
        let m = MetricComputer::new(&t);
        assert_eq!(m.dirty_data("lonely-uuid").unwrap(), 0);
        for outcome in RequestOutcome::ALL {
            assert_eq!(m.cache_result_count("lonely-uuid", outcome).unwrap(), 0);
        }
        assert_eq!(m.bypassed_bytes("lonely-uuid").unwrap(), 0);
        assert_eq!(
            m.cache_hit_ratio("lonely-uuid", TimeWindow::Total).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_missing_files_count_as_zero() {
        let mut fs = MockFs::new();
        fs.add_symlink(format!("{}/bare/bdev0/dev", SCENARIO_ROOT), "../sdc");
        let t = tree(fs);
        let m = MetricComputer::new(&t);
        assert_eq!(m.dirty_data("bare").unwrap(), 0);
        assert_eq!(m.bypassed_bytes("bare").unwrap(), 0);
        assert_eq!(m.cache_hit_ratio("bare", TimeWindow::Day).unwrap(), 100.0);
    }

    #[test]
    fn test_malformed_token() {
        let mut fs = MockFs::bcache_single_device();
        let path = format!("{}/abc-uuid/bdev0/stats_five_minute/cache_hits", SCENARIO_ROOT);
        fs.add_file(&path, "garbage\n");
        let t = tree(fs);
        let m = MetricComputer::new(&t);

        let err = m
            .cache_hit_ratio("abc-uuid", TimeWindow::FiveMinute)
            .unwrap_err();
        let MetricError::Malformed { path: bad, .. } = &err;
        assert_eq!(bad, &PathBuf::from(&path));
        assert!(err.to_string().contains("garbage"));

        // Other windows are unaffected
        assert_eq!(
            m.cache_hit_ratio("abc-uuid", TimeWindow::Day).unwrap(),
            100.0
        );
    }

    #[test]
    fn test_compute_all_order() {
        let t = tree(MockFs::bcache_single_device());
        let m = MetricComputer::new(&t);
        let readings = m.compute_all("abc-uuid");
        let names: Vec<(&str, &str)> = readings
            .iter()
            .map(|r| (r.family, r.sub_metric))
            .collect();
        assert_eq!(
            names,
            vec![
                ("df_complex", "dirty_data"),
                ("cache_ratio", "five_minute"),
                ("cache_ratio", "hour"),
                ("cache_ratio", "day"),
                ("cache_ratio", "total"),
                ("requests", "bypass_hits"),
                ("requests", "bypass_misses"),
                ("requests", "hits"),
                ("requests", "miss_collisions"),
                ("requests", "misses"),
                ("requests", "readaheads"),
                ("bytes", "bypassed"),
            ]
        );
        assert!(readings.iter().all(|r| r.value.is_ok()));
    }
}
