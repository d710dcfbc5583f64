//! Metric samples handed to sinks.

use serde::Serialize;

use super::topology::DeviceName;

/// Metric family of the dirty data gauge.
pub const FAMILY_DIRTY_DATA: &str = "df_complex";
/// Metric family of hit ratios, one sub-metric per time window.
pub const FAMILY_CACHE_RATIO: &str = "cache_ratio";
/// Metric family of request outcome counters.
pub const FAMILY_REQUESTS: &str = "requests";
/// Metric family of byte volumes.
pub const FAMILY_BYTES: &str = "bytes";

/// Typed value of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Bytes(u64),
    Count(u64),
    Percent(f64),
}

impl MetricValue {
    /// Plain numeric view for sinks that only carry one number type.
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Bytes(v) | MetricValue::Count(v) => v as f64,
            MetricValue::Percent(v) => v,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Bytes(v) | MetricValue::Count(v) => write!(f, "{}", v),
            MetricValue::Percent(v) => write!(f, "{}", v),
        }
    }
}

/// One `(device, family, sub_metric, value)` tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub device: DeviceName,
    pub family: &'static str,
    pub sub_metric: &'static str,
    pub value: MetricValue,
}

impl MetricSample {
    pub fn new(
        device: impl Into<DeviceName>,
        family: &'static str,
        sub_metric: &'static str,
        value: MetricValue,
    ) -> Self {
        Self {
            device: device.into(),
            family,
            sub_metric,
            value,
        }
    }
}

impl std::fmt::Display for MetricSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}={}",
            self.device, self.family, self.sub_metric, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let sample = MetricSample::new(
            "sdb",
            FAMILY_CACHE_RATIO,
            "hour",
            MetricValue::Percent(75.0),
        );
        assert_eq!(sample.to_string(), "sdb.cache_ratio.hour=75");

        let sample = MetricSample::new(
            "sdb",
            FAMILY_DIRTY_DATA,
            "dirty_data",
            MetricValue::Bytes(524_288),
        );
        assert_eq!(sample.to_string(), "sdb.df_complex.dirty_data=524288");
    }

    #[test]
    fn test_serialize() {
        let sample = MetricSample::new("sdb", FAMILY_REQUESTS, "hits", MetricValue::Count(6));
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["device"], "sdb");
        assert_eq!(json["family"], "requests");
        assert_eq!(json["sub_metric"], "hits");
        assert_eq!(json["value"]["kind"], "count");
        assert_eq!(json["value"]["value"], 6);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(MetricValue::Count(6).as_f64(), 6.0);
        assert_eq!(MetricValue::Percent(12.5).as_f64(), 12.5);
    }
}
