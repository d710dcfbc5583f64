//! bcachestat - bcache statistics collector library.
//!
//! This library provides the core functionality used by:
//! - `bcachestatd` - daemon that samples `/sys/fs/bcache` on an interval
//!
//! Modules:
//! - `collector` - sysfs reading, value parsing and metric derivation
//! - `config` - collector options
//! - `sink` - destinations for collected samples

pub mod collector;
pub mod config;
pub mod sink;
