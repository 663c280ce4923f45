//! Metrics data model produced by a scrape.
//!
//! A scrape returns a fresh `Vec<Metric>`; nothing in here is retained by the
//! scraper once it has been handed to the caller.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Point in time as nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Converts whole seconds since the epoch (as reported for boot time).
    pub const fn from_unix_seconds(seconds: u64) -> Self {
        Self(seconds.saturating_mul(NANOS_PER_SECOND))
    }

    pub fn now() -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        Self(u64::try_from(nanos).unwrap_or(0))
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub const fn as_unix_seconds(self) -> u64 {
        self.0 / NANOS_PER_SECOND
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0) {
            Ok(nanos) => write!(f, "{}", chrono::DateTime::from_timestamp_nanos(nanos).to_rfc3339()),
            Err(_) => write!(f, "{}ns", self.0),
        }
    }
}

/// Labels attached to a single data point. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key=value` unless `key` is already present.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Integer-valued data point.
///
/// `start_timestamp` is only set for cumulative counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberDataPoint {
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<Timestamp>,
    pub timestamp: Timestamp,
    pub value: i64,
}

impl NumberDataPoint {
    pub fn new(timestamp: Timestamp, value: i64) -> Self {
        Self {
            attributes: Attributes::new(),
            start_timestamp: None,
            timestamp,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationTemporality {
    Cumulative,
    Delta,
}

/// Semantic type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DataType {
    Gauge,
    Sum {
        monotonic: bool,
        temporality: AggregationTemporality,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub data_type: DataType,
    pub data_points: Vec<NumberDataPoint>,
}

impl Metric {
    /// Returns the first point whose attributes contain every given pair.
    pub fn find_point(&self, labels: &[(&str, &str)]) -> Option<&NumberDataPoint> {
        self.data_points.iter().find(|dp| {
            labels
                .iter()
                .all(|(k, v)| dp.attributes.get(k) == Some(*v))
        })
    }
}
