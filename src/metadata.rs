//! Names, units and label vocabulary of the paging metrics.

use serde::{Deserialize, Serialize};

use crate::model::{AggregationTemporality, DataType, Metric};

/// Static description of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub data_type: DataType,
}

impl MetricInfo {
    /// Creates an empty metric carrying this descriptor.
    pub fn init(&self, capacity: usize) -> Metric {
        Metric {
            name: self.name,
            description: self.description,
            unit: self.unit,
            data_type: self.data_type,
            data_points: Vec::with_capacity(capacity),
        }
    }
}

pub const SYSTEM_PAGING_USAGE: MetricInfo = MetricInfo {
    name: "system.paging.usage",
    description: "Swap (unix) or pagefile (windows) usage.",
    unit: "By",
    data_type: DataType::Sum {
        monotonic: false,
        temporality: AggregationTemporality::Cumulative,
    },
};

pub const SYSTEM_PAGING_OPERATIONS: MetricInfo = MetricInfo {
    name: "system.paging.operations",
    description: "The number of paging operations.",
    unit: "{operations}",
    data_type: DataType::Sum {
        monotonic: true,
        temporality: AggregationTemporality::Cumulative,
    },
};

pub const SYSTEM_PAGING_FAULTS: MetricInfo = MetricInfo {
    name: "system.paging.faults",
    description: "The number of page faults.",
    unit: "{faults}",
    data_type: DataType::Sum {
        monotonic: true,
        temporality: AggregationTemporality::Cumulative,
    },
};

/// Attribute keys.
pub mod labels {
    pub const DEVICE: &str = "device";
    pub const STATE: &str = "state";
    pub const DIRECTION: &str = "direction";
    pub const TYPE: &str = "type";
}

/// Value of the `state` attribute on paging usage points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Used,
    Free,
    Cached,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Used => "used",
            State::Free => "free",
            State::Cached => "cached",
        }
    }
}

/// Value of the `direction` attribute on paging operation points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    PageIn,
    PageOut,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::PageIn => "page_in",
            Direction::PageOut => "page_out",
        }
    }
}

/// Value of the `type` attribute on operation and fault points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingType {
    Major,
    Minor,
}

impl PagingType {
    pub fn as_str(self) -> &'static str {
        match self {
            PagingType::Major => "major",
            PagingType::Minor => "minor",
        }
    }
}

/// Enable flag for a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-metric settings. Every metric is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSettings {
    #[serde(default, rename = "system.paging.usage", alias = "system_paging_usage")]
    pub system_paging_usage: MetricSettings,
    #[serde(
        default,
        rename = "system.paging.operations",
        alias = "system_paging_operations"
    )]
    pub system_paging_operations: MetricSettings,
    #[serde(default, rename = "system.paging.faults", alias = "system_paging_faults")]
    pub system_paging_faults: MetricSettings,
}

impl MetricsSettings {
    pub fn any_enabled(&self) -> bool {
        self.system_paging_usage.enabled
            || self.system_paging_operations.enabled
            || self.system_paging_faults.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_settings_default_all_enabled() {
        let settings = MetricsSettings::default();
        assert!(settings.system_paging_usage.enabled);
        assert!(settings.system_paging_operations.enabled);
        assert!(settings.system_paging_faults.enabled);
        assert!(settings.any_enabled());
    }

    #[test]
    fn test_metrics_settings_partial_yaml() {
        let yaml = "system.paging.faults:\n  enabled: false\n";
        let settings: MetricsSettings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.system_paging_usage.enabled);
        assert!(settings.system_paging_operations.enabled);
        assert!(!settings.system_paging_faults.enabled);
    }

    #[test]
    fn test_usage_is_non_monotonic_sum() {
        assert_eq!(
            SYSTEM_PAGING_USAGE.data_type,
            DataType::Sum {
                monotonic: false,
                temporality: AggregationTemporality::Cumulative
            }
        );
    }
}
