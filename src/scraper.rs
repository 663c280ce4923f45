//! Paging scraper: turns page-file and swap statistics into metrics.
//!
//! `start` anchors every cumulative counter at host boot time. Each call to
//! `scrape` then runs two independent sub-scrapes:
//!
//! 1. paging usage, fed by the page-file source
//! 2. paging operations and page faults, both fed by the swap source
//!
//! A failing source only drops its own group; the failure is recorded in the
//! aggregate error returned next to whatever metrics were built.

use tracing::{debug, info, instrument, warn};

use crate::metadata::{
    labels, Direction, MetricsSettings, PagingType, State, SYSTEM_PAGING_FAULTS,
    SYSTEM_PAGING_OPERATIONS, SYSTEM_PAGING_USAGE,
};
use crate::model::{Metric, NumberDataPoint, Timestamp};
use crate::providers::{
    BootTimeSource, PageFileSource, PageFileStats, ProviderError, SwapSource, SwapStats,
};
use crate::scrape_error::{ScrapeError, ScrapeErrors};

/// Failure weight of the paging usage group.
pub const PAGING_USAGE_METRICS_LEN: usize = 1;

/// Failure weight of the operations + faults group.
pub const PAGING_METRICS_LEN: usize = 2;

/// Group reported when the page-file source fails.
pub const PAGING_USAGE_GROUP: &str = "system.paging.usage";

/// Group reported when the swap source fails; both of its metrics are lost.
pub const PAGING_OPERATIONS_FAULTS_GROUP: &str = "system.paging.operations+faults";

/// Error returned by [`PagingScraper::start`].
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error(transparent)]
    BootTime(ProviderError),
}

/// Error returned by [`PagingScraper::scrape`] before any source was called.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeStateError {
    #[error("scraper has not been started")]
    NotStarted,
}

/// Result of one scrape cycle.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// Metrics of every group that succeeded, in scrape order.
    pub metrics: Vec<Metric>,
    /// Combined partial failures, `Ok` when every group succeeded.
    pub error: Result<(), ScrapeError>,
}

impl ScrapeOutcome {
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn data_point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.data_points.len()).sum()
    }
}

/// Scraper for paging metrics.
pub struct PagingScraper<B, P, S> {
    settings: MetricsSettings,
    start_time: Option<Timestamp>,
    boot_time: B,
    page_files: P,
    swap: S,
}

impl<B, P, S> PagingScraper<B, P, S>
where
    B: BootTimeSource,
    P: PageFileSource,
    S: SwapSource,
{
    pub fn new(settings: MetricsSettings, boot_time: B, page_files: P, swap: S) -> Self {
        Self {
            settings,
            start_time: None,
            boot_time,
            page_files,
            swap,
        }
    }

    /// Reads boot time once and keeps it as start time of all cumulative points.
    ///
    /// Calling it again after a successful start keeps the original anchor.
    pub fn start(&mut self) -> Result<(), StartError> {
        if let Some(start_time) = self.start_time {
            debug!("Scraper already started at {}", start_time);
            return Ok(());
        }

        let boot_time = self.boot_time.boot_time().map_err(StartError::BootTime)?;
        let start_time = Timestamp::from_unix_seconds(boot_time);
        self.start_time = Some(start_time);

        info!("Paging scraper started, counters anchored at boot time {}", start_time);
        Ok(())
    }

    /// Reference start time, `None` until [`start`](Self::start) succeeded.
    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn settings(&self) -> &MetricsSettings {
        &self.settings
    }

    /// Runs one scrape cycle.
    #[instrument(skip(self))]
    pub fn scrape(&self) -> Result<ScrapeOutcome, ScrapeStateError> {
        let start_time = self.start_time.ok_or(ScrapeStateError::NotStarted)?;

        let mut metrics = Vec::with_capacity(PAGING_USAGE_METRICS_LEN + PAGING_METRICS_LEN);
        let mut errors = ScrapeErrors::new();

        if let Err(e) = self.scrape_and_append_paging_usage_metric(&mut metrics) {
            let failed = self.usage_metrics_len();
            warn!("Paging usage scrape failed ({} lost): {}", failed, e);
            errors.add_partial(PAGING_USAGE_GROUP, failed, e);
        }

        if let Err(e) = self.scrape_and_append_paging_metrics(start_time, &mut metrics) {
            let failed = self.paging_metrics_len();
            warn!("Paging operations/faults scrape failed ({} lost): {}", failed, e);
            errors.add_partial(PAGING_OPERATIONS_FAULTS_GROUP, failed, e);
        }

        debug!(
            "Scrape produced {} metrics, {} partial failures",
            metrics.len(),
            errors.len()
        );

        Ok(ScrapeOutcome {
            metrics,
            error: errors.combine(),
        })
    }

    fn usage_metrics_len(&self) -> usize {
        usize::from(self.settings.system_paging_usage.enabled) * PAGING_USAGE_METRICS_LEN
    }

    fn paging_metrics_len(&self) -> usize {
        usize::from(self.settings.system_paging_operations.enabled)
            + usize::from(self.settings.system_paging_faults.enabled)
    }

    fn scrape_and_append_paging_usage_metric(
        &self,
        metrics: &mut Vec<Metric>,
    ) -> Result<(), ProviderError> {
        if !self.settings.system_paging_usage.enabled {
            return Ok(());
        }

        let now = Timestamp::now();
        let page_files = self.page_files.page_file_stats()?;
        debug!("Page file source reported {} devices", page_files.len());

        metrics.push(build_paging_usage_metric(now, &page_files));
        Ok(())
    }

    fn scrape_and_append_paging_metrics(
        &self,
        start_time: Timestamp,
        metrics: &mut Vec<Metric>,
    ) -> Result<(), ProviderError> {
        let operations = self.settings.system_paging_operations.enabled;
        let faults = self.settings.system_paging_faults.enabled;
        if !operations && !faults {
            return Ok(());
        }

        let now = Timestamp::now();
        let swap = self.swap.swap_stats()?;

        if operations {
            metrics.push(build_paging_operations_metric(start_time, now, &swap));
        }
        if faults {
            metrics.push(build_page_faults_metric(start_time, now, &swap));
        }
        Ok(())
    }
}

/// Converts a raw counter to the signed point value, saturating at `i64::MAX`.
fn to_value(raw: u64) -> i64 {
    i64::try_from(raw).unwrap_or(i64::MAX)
}

/// Builds `system.paging.usage`: used and free per device, cached when reported.
///
/// This is a snapshot, so points carry no start timestamp.
pub fn build_paging_usage_metric(now: Timestamp, page_files: &[PageFileStats]) -> Metric {
    let mut metric = SYSTEM_PAGING_USAGE.init(page_files.len() * 3);

    for page_file in page_files {
        metric.data_points.push(usage_data_point(
            now,
            &page_file.device_name,
            State::Used,
            page_file.used_bytes,
        ));
        metric.data_points.push(usage_data_point(
            now,
            &page_file.device_name,
            State::Free,
            page_file.free_bytes,
        ));
        if let Some(cached) = page_file.cached_bytes {
            metric
                .data_points
                .push(usage_data_point(now, &page_file.device_name, State::Cached, cached));
        }
    }

    metric
}

fn usage_data_point(now: Timestamp, device: &str, state: State, value: u64) -> NumberDataPoint {
    let mut dp = NumberDataPoint::new(now, to_value(value));
    if !device.is_empty() {
        dp.attributes.insert(labels::DEVICE, device);
    }
    dp.attributes.insert(labels::STATE, state.as_str());
    dp
}

/// Builds `system.paging.operations`: major/minor × page_in/page_out.
///
/// Swap traffic (`sin`/`sout`) counts as major, page cache traffic
/// (`pg_in`/`pg_out`) as minor.
pub fn build_paging_operations_metric(
    start_time: Timestamp,
    now: Timestamp,
    swap: &SwapStats,
) -> Metric {
    let mut metric = SYSTEM_PAGING_OPERATIONS.init(4);

    let points = [
        (PagingType::Major, Direction::PageIn, swap.sin),
        (PagingType::Major, Direction::PageOut, swap.sout),
        (PagingType::Minor, Direction::PageIn, swap.pg_in),
        (PagingType::Minor, Direction::PageOut, swap.pg_out),
    ];

    for (paging_type, direction, value) in points {
        let mut dp = cumulative_data_point(start_time, now, value);
        dp.attributes.insert(labels::TYPE, paging_type.as_str());
        dp.attributes.insert(labels::DIRECTION, direction.as_str());
        metric.data_points.push(dp);
    }

    metric
}

/// Builds `system.paging.faults`.
///
/// The swap source only reports total and major faults, so minor faults are
/// derived as `pg_fault - pg_maj_fault`.
pub fn build_page_faults_metric(start_time: Timestamp, now: Timestamp, swap: &SwapStats) -> Metric {
    let mut metric = SYSTEM_PAGING_FAULTS.init(2);

    let minor_faults = swap.pg_fault.saturating_sub(swap.pg_maj_fault);

    for (paging_type, value) in [
        (PagingType::Major, swap.pg_maj_fault),
        (PagingType::Minor, minor_faults),
    ] {
        let mut dp = cumulative_data_point(start_time, now, value);
        dp.attributes.insert(labels::TYPE, paging_type.as_str());
        metric.data_points.push(dp);
    }

    metric
}

fn cumulative_data_point(start_time: Timestamp, now: Timestamp, value: u64) -> NumberDataPoint {
    let mut dp = NumberDataPoint::new(now, to_value(value));
    dp.start_timestamp = Some(start_time);
    dp
}
