//! One full sampling pass over the bcache sysfs tree.
//!
//! The `BcacheCollector` enumerates cache sets, resolves their backing
//! devices, computes metrics and hands every sample to a [`MetricSink`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::collector::bcache::{BcacheTree, MetricComputer, MetricSample};
use crate::collector::traits::FileSystem;
use crate::config::Config;
use crate::sink::MetricSink;

/// Summary of one collection cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Cache sets found under the root.
    pub cache_sets: usize,
    /// Backing devices resolved across all cache sets.
    pub devices: usize,
    /// Samples handed to the sink.
    pub samples: usize,
    /// Metrics skipped because a value could not be parsed.
    pub failed_metrics: usize,
    /// Samples the sink refused.
    pub sink_errors: usize,
    /// Wall time of the cycle.
    pub elapsed: Duration,
}

/// Collector of bcache metrics.
pub struct BcacheCollector<F: FileSystem> {
    tree: BcacheTree<F>,
    config: Config,
}

impl<F: FileSystem> BcacheCollector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `root` - Path to the bcache sysfs root (usually "/sys/fs/bcache")
    /// * `config` - Options fixed for the lifetime of the collector
    pub fn new(fs: F, root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            tree: BcacheTree::new(fs, root),
            config: config.clone(),
        }
    }

    /// Runs one collection cycle.
    ///
    /// Nothing in the cycle is fatal: missing nodes read as zero, a malformed
    /// value drops that one sample with a warning and sink errors are counted.
    pub fn collect_cycle(&self, sink: &mut dyn MetricSink) -> CycleReport {
        let start = Instant::now();
        let mut report = CycleReport::default();

        let sets = self.tree.list_cache_sets();
        report.cache_sets = sets.len();
        debug!("Found {} cache sets", sets.len());

        let computer = MetricComputer::new(&self.tree);
        for set in &sets {
            let devices = self.tree.map_to_devices(set);
            if devices.is_empty() {
                debug!("Cache set {} has no backing devices", set);
                continue;
            }
            report.devices += devices.len();

            // TODO: also report cache_available_percent of the cache device.
            let readings = computer.compute_all(set);
            for device in &devices {
                for reading in &readings {
                    let value = match &reading.value {
                        Ok(value) => *value,
                        Err(e) => {
                            warn!(
                                "Skipping {}.{}.{}: {}",
                                device, reading.family, reading.sub_metric, e
                            );
                            report.failed_metrics += 1;
                            continue;
                        }
                    };

                    let sample = MetricSample::new(
                        device.as_str(),
                        reading.family,
                        reading.sub_metric,
                        value,
                    );
                    if let Some(message) = verbose_message(&self.config, &sample) {
                        info!("{}", message);
                    }
                    match sink.emit(&sample) {
                        Ok(()) => report.samples += 1,
                        Err(e) => {
                            warn!("Failed to emit {}: {}", sample, e);
                            report.sink_errors += 1;
                        }
                    }
                }
            }
        }

        if let Err(e) = sink.flush() {
            warn!("Failed to flush sink: {}", e);
            report.sink_errors += 1;
        }

        report.elapsed = start.elapsed();
        report
    }
}

/// Line logged for every emitted sample when `verbose` is set.
fn verbose_message(config: &Config, sample: &MetricSample) -> Option<String> {
    config
        .verbose
        .then(|| format!("bcache plugin [verbose]: Sending value: {}", sample))
}
