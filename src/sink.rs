//! Destinations for collected samples.
//!
//! The collector only ever calls [`MetricSink::emit`]. What happens with a
//! sample afterwards (storage, transport, alerting) belongs to the host.

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;

use crate::collector::MetricSample;

/// Plugin name reported to the host.
pub const PLUGIN_NAME: &str = "bcache";

/// Receiver of metric samples.
pub trait MetricSink {
    /// Forwards one sample to the host's metric pipeline.
    fn emit(&mut self, sample: &MetricSample) -> io::Result<()>;

    /// Called once after the last sample of a cycle.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: &MetricSample) -> io::Result<()> {
        self.push(sample.clone());
        Ok(())
    }
}

/// Writes samples in the collectd exec plugin text protocol.
///
/// ```text
/// PUTVAL "db1/bcache-bcache0/df_complex-dirty_data" interval=10 N:524288
/// ```
pub struct PutvalSink<W: Write> {
    writer: W,
    hostname: String,
    interval_secs: u64,
}

impl<W: Write> PutvalSink<W> {
    pub fn new(writer: W, hostname: impl Into<String>, interval_secs: u64) -> Self {
        Self {
            writer,
            hostname: hostname.into(),
            interval_secs,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricSink for PutvalSink<W> {
    fn emit(&mut self, sample: &MetricSample) -> io::Result<()> {
        writeln!(
            self.writer,
            "PUTVAL \"{}/{}-{}/{}-{}\" interval={} N:{}",
            self.hostname,
            PLUGIN_NAME,
            sample.device,
            sample.family,
            sample.sub_metric,
            self.interval_secs,
            sample.value
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    host: &'a str,
    plugin: &'static str,
    plugin_instance: &'a str,
    #[serde(rename = "type")]
    family: &'static str,
    type_instance: &'static str,
    value: f64,
}

/// Writes one JSON object per sample and line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    hostname: String,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, hostname: impl Into<String>) -> Self {
        Self {
            writer,
            hostname: hostname.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricSink for JsonLinesSink<W> {
    fn emit(&mut self, sample: &MetricSample) -> io::Result<()> {
        let record = JsonRecord {
            timestamp: Utc::now().to_rfc3339(),
            host: &self.hostname,
            plugin: PLUGIN_NAME,
            plugin_instance: &sample.device,
            family: sample.family,
            type_instance: sample.sub_metric,
            value: sample.value.as_f64(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
