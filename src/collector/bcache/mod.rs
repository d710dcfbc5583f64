//! Readers and derivations for the Linux bcache sysfs tree.
//!
//! Expected layout below the root (usually `/sys/fs/bcache`):
//!
//! ```text
//! <cache-set-uuid>/
//!     bdev<N>/
//!         dev -> ../../../devices/.../<device>
//!         dirty_data
//!         stats_{five_minute,hour,day,total}/
//!             cache_hits  cache_misses  bypassed  cache_<outcome>
//! ```

pub mod metrics;
pub mod parser;
pub mod sample;
pub mod sysfs;
pub mod topology;

pub use metrics::{MetricComputer, MetricError, MetricReading, RequestOutcome, TimeWindow};
pub use parser::{ParseError, parse_byte_size, parse_counter, parse_first_line};
pub use sample::{
    FAMILY_BYTES, FAMILY_CACHE_RATIO, FAMILY_DIRTY_DATA, FAMILY_REQUESTS, MetricSample, MetricValue,
};
pub use sysfs::{NodeRead, SysfsReader};
pub use topology::{BACKING_ENTRY_PREFIX, BcacheTree, CacheSetId, DeviceName};
