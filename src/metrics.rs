//! Prometheus metrics definitions for herakles-paging-exporter.
//!
//! Every `/metrics` request runs one scrape and copies the produced data
//! points into the vectors below. Groups that failed in that scrape are left
//! empty so stale values are never served.

use herakles_paging_exporter::metadata::{
    labels, SYSTEM_PAGING_FAULTS, SYSTEM_PAGING_OPERATIONS, SYSTEM_PAGING_USAGE,
};
use herakles_paging_exporter::{Metric, NumberDataPoint, ScrapeOutcome};
use prometheus::{Gauge, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};
use tracing::debug;

/// Collection of Prometheus metrics exposed by the exporter.
#[derive(Clone)]
pub struct PagingMetrics {
    // ========== Paging Metrics ==========
    pub system_paging_usage_bytes: IntGaugeVec, // labels: device, state
    pub system_paging_operations_total: IntCounterVec, // labels: type, direction
    pub system_paging_faults_total: IntCounterVec, // labels: type
    pub system_boot_time_seconds: Gauge,

    // ========== Exporter Metrics ==========
    pub scrape_duration_seconds: Gauge,
    pub scrape_success: Gauge,
    pub scrape_errored_points: Gauge,
    pub scrapes_total: IntCounter,
    pub scrape_failures_total: IntCounterVec, // labels: group
}

impl PagingMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let system_paging_usage_bytes = IntGaugeVec::new(
            Opts::new(
                "herakles_system_paging_usage_bytes",
                "Swap device usage in bytes by state (used/free/cached)",
            ),
            &[labels::DEVICE, labels::STATE],
        )?;
        let system_paging_operations_total = IntCounterVec::new(
            Opts::new(
                "herakles_system_paging_operations_total",
                "Paging operations since boot by type (major/minor) and direction",
            ),
            &[labels::TYPE, labels::DIRECTION],
        )?;
        let system_paging_faults_total = IntCounterVec::new(
            Opts::new(
                "herakles_system_paging_faults_total",
                "Page faults since boot by type (major/minor)",
            ),
            &[labels::TYPE],
        )?;
        let system_boot_time_seconds = Gauge::new(
            "herakles_system_boot_time_seconds",
            "Host boot time used as start time of all paging counters",
        )?;

        let scrape_duration_seconds = Gauge::new(
            "herakles_paging_exporter_scrape_duration_seconds",
            "Time spent on the last paging scrape",
        )?;
        let scrape_success = Gauge::new(
            "herakles_paging_exporter_scrape_success",
            "Whether the last scrape completed without partial failures (1) or not (0)",
        )?;
        let scrape_errored_points = Gauge::new(
            "herakles_paging_exporter_scrape_errored_points",
            "Data points the last scrape could not produce",
        )?;
        let scrapes_total = IntCounter::new(
            "herakles_paging_exporter_scrapes_total",
            "Number of paging scrapes performed",
        )?;
        let scrape_failures_total = IntCounterVec::new(
            Opts::new(
                "herakles_paging_exporter_scrape_failures_total",
                "Number of failed sub-scrapes by metric group",
            ),
            &["group"],
        )?;

        registry.register(Box::new(system_paging_usage_bytes.clone()))?;
        registry.register(Box::new(system_paging_operations_total.clone()))?;
        registry.register(Box::new(system_paging_faults_total.clone()))?;
        registry.register(Box::new(system_boot_time_seconds.clone()))?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;
        registry.register(Box::new(scrape_success.clone()))?;
        registry.register(Box::new(scrape_errored_points.clone()))?;
        registry.register(Box::new(scrapes_total.clone()))?;
        registry.register(Box::new(scrape_failures_total.clone()))?;

        Ok(Self {
            system_paging_usage_bytes,
            system_paging_operations_total,
            system_paging_faults_total,
            system_boot_time_seconds,
            scrape_duration_seconds,
            scrape_success,
            scrape_errored_points,
            scrapes_total,
            scrape_failures_total,
        })
    }

    /// Replaces the paging series with the result of one scrape.
    pub fn record(&self, outcome: &ScrapeOutcome, duration_seconds: f64) {
        // Failed groups must disappear instead of keeping the previous values.
        self.system_paging_usage_bytes.reset();
        self.system_paging_operations_total.reset();
        self.system_paging_faults_total.reset();

        for metric in &outcome.metrics {
            self.record_metric(metric);
        }

        self.scrapes_total.inc();
        self.scrape_duration_seconds.set(duration_seconds);

        match &outcome.error {
            Ok(()) => {
                self.scrape_success.set(1.0);
                self.scrape_errored_points.set(0.0);
            }
            Err(e) => {
                self.scrape_success.set(0.0);
                self.scrape_errored_points.set(e.failed() as f64);
                for partial in e.errors() {
                    self.scrape_failures_total
                        .with_label_values(&[partial.group])
                        .inc();
                }
            }
        }
    }

    fn record_metric(&self, metric: &Metric) {
        if metric.name == SYSTEM_PAGING_USAGE.name {
            for dp in &metric.data_points {
                self.system_paging_usage_bytes
                    .with_label_values(&[label(dp, labels::DEVICE), label(dp, labels::STATE)])
                    .set(dp.value);
            }
        } else if metric.name == SYSTEM_PAGING_OPERATIONS.name {
            for dp in &metric.data_points {
                // For counters reporting cumulative kernel values, use reset + inc_by pattern
                let counter = self
                    .system_paging_operations_total
                    .with_label_values(&[label(dp, labels::TYPE), label(dp, labels::DIRECTION)]);
                counter.reset();
                counter.inc_by(counter_value(dp));
            }
        } else if metric.name == SYSTEM_PAGING_FAULTS.name {
            for dp in &metric.data_points {
                let counter = self
                    .system_paging_faults_total
                    .with_label_values(&[label(dp, labels::TYPE)]);
                counter.reset();
                counter.inc_by(counter_value(dp));
            }
        } else {
            debug!("Ignoring unknown metric {}", metric.name);
        }
    }
}

fn label<'a>(dp: &'a NumberDataPoint, key: &str) -> &'a str {
    dp.attributes.get(key).unwrap_or("")
}

fn counter_value(dp: &NumberDataPoint) -> u64 {
    u64::try_from(dp.value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use herakles_paging_exporter::providers::ProviderError;
    use herakles_paging_exporter::scraper::{
        build_page_faults_metric, build_paging_operations_metric, build_paging_usage_metric,
        PAGING_OPERATIONS_FAULTS_GROUP,
    };
    use herakles_paging_exporter::{PageFileStats, ScrapeErrors, SwapStats, Timestamp};
    use prometheus::{Encoder, TextEncoder};

    fn encode(registry: &Registry) -> String {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn swap() -> SwapStats {
        SwapStats {
            sin: 1,
            sout: 2,
            pg_in: 3,
            pg_out: 4,
            pg_fault: 10,
            pg_maj_fault: 4,
        }
    }

    #[test]
    fn test_record_full_scrape() {
        let registry = Registry::new();
        let metrics = PagingMetrics::new(&registry).unwrap();
        let now = Timestamp::from_unix_seconds(2);
        let start = Timestamp::from_unix_seconds(1);

        let outcome = ScrapeOutcome {
            metrics: vec![
                build_paging_usage_metric(
                    now,
                    &[PageFileStats {
                        device_name: "/dev/sda1".into(),
                        used_bytes: 100,
                        free_bytes: 50,
                        cached_bytes: None,
                    }],
                ),
                build_paging_operations_metric(start, now, &swap()),
                build_page_faults_metric(start, now, &swap()),
            ],
            error: Ok(()),
        };
        metrics.record(&outcome, 0.01);

        let text = encode(&registry);
        assert!(text.contains(
            "herakles_system_paging_usage_bytes{device=\"/dev/sda1\",state=\"used\"} 100"
        ));
        assert!(text.contains(
            "herakles_system_paging_operations_total{direction=\"page_out\",type=\"minor\"} 4"
        ));
        assert!(text.contains("herakles_system_paging_faults_total{type=\"minor\"} 6"));
        assert!(text.contains("herakles_paging_exporter_scrape_success 1"));
    }

    #[test]
    fn test_record_failed_group_clears_previous_series() {
        let registry = Registry::new();
        let metrics = PagingMetrics::new(&registry).unwrap();
        let now = Timestamp::from_unix_seconds(2);
        let start = Timestamp::from_unix_seconds(1);

        let first = ScrapeOutcome {
            metrics: vec![build_page_faults_metric(start, now, &swap())],
            error: Ok(()),
        };
        metrics.record(&first, 0.01);
        assert!(encode(&registry).contains("herakles_system_paging_faults_total"));

        let mut errors = ScrapeErrors::new();
        errors.add_partial(
            PAGING_OPERATIONS_FAULTS_GROUP,
            2,
            ProviderError::Unavailable("vmstat gone".into()),
        );
        let second = ScrapeOutcome {
            metrics: Vec::new(),
            error: errors.combine(),
        };
        metrics.record(&second, 0.01);

        let text = encode(&registry);
        assert!(!text.contains("herakles_system_paging_faults_total{"));
        assert!(text.contains("herakles_paging_exporter_scrape_success 0"));
        assert!(text.contains("herakles_paging_exporter_scrape_errored_points 2"));
        assert!(text.contains(
            "herakles_paging_exporter_scrape_failures_total{group=\"system.paging.operations+faults\"} 1"
        ));
    }
}
