//! bcache metrics collector for Linux.
//!
//! This module reads cache statistics from the Linux sysfs tree
//! (`/sys/fs/bcache`), with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BcacheCollector                        │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │     BcacheTree      │   │      MetricComputer         │  │
//! │  │  - cache sets       │   │  - dirty_data               │  │
//! │  │  - bdev* -> device  │   │  - cache_ratio per window   │  │
//! │  └──────────┬──────────┘   │  - requests, bypassed       │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                     ┌──────▼──────┐                         │
//! │                     │ SysfsReader │                         │
//! │                     └──────┬──────┘                         │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!              ┌───────────────┼───────────────┐
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use bcachestat::collector::{BcacheCollector, DEFAULT_SYSFS_PATH, RealFs};
//! use bcachestat::config::Config;
//!
//! let collector = BcacheCollector::new(RealFs::new(), DEFAULT_SYSFS_PATH, &Config::default());
//! let mut samples = Vec::new();
//! collector.collect_cycle(&mut samples);
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use bcachestat::collector::{BcacheCollector, MetricSample, MockFs};
//! use bcachestat::collector::mock::SCENARIO_ROOT;
//! use bcachestat::config::Config;
//!
//! let fs = MockFs::bcache_single_device();
//! let collector = BcacheCollector::new(fs, SCENARIO_ROOT, &Config::default());
//! let mut samples: Vec<MetricSample> = Vec::new();
//! let report = collector.collect_cycle(&mut samples);
//! assert_eq!(report.samples, 12);
//! ```

pub mod bcache;
#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod traits;

/// Default bcache sysfs root.
pub const DEFAULT_SYSFS_PATH: &str = "/sys/fs/bcache";

pub use bcache::{
    FAMILY_BYTES, FAMILY_CACHE_RATIO, FAMILY_DIRTY_DATA, FAMILY_REQUESTS, MetricSample, MetricValue,
    RequestOutcome, TimeWindow,
};
pub use collector::{BcacheCollector, CycleReport};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
