//! Integration tests for the paging scraper.
//!
//! These tests drive `PagingScraper` through injected sources and verify the
//! produced metrics and the aggregate error for every success/failure mix.

use herakles_paging_exporter::metadata::labels;
use herakles_paging_exporter::scraper::{
    PAGING_METRICS_LEN, PAGING_OPERATIONS_FAULTS_GROUP, PAGING_USAGE_GROUP,
    PAGING_USAGE_METRICS_LEN,
};
use herakles_paging_exporter::{
    DataType, MetricsSettings, PageFileStats, PagingScraper, ProviderError, ScrapeError,
    StartError, SwapStats, Timestamp,
};
use std::cell::Cell;

const BOOT_TIME: u64 = 1_700_000_000;

type BootFn = Box<dyn Fn() -> Result<u64, ProviderError>>;
type PageFileFn = Box<dyn Fn() -> Result<Vec<PageFileStats>, ProviderError>>;
type SwapFn = Box<dyn Fn() -> Result<SwapStats, ProviderError>>;

fn boot_ok() -> BootFn {
    Box::new(|| Ok(BOOT_TIME))
}

fn page_files_ok(stats: Vec<PageFileStats>) -> PageFileFn {
    Box::new(move || Ok(stats.clone()))
}

fn page_files_err() -> PageFileFn {
    Box::new(|| Err(ProviderError::Unavailable("page files unavailable".into())))
}

fn swap_ok() -> SwapFn {
    Box::new(|| Ok(example_swap()))
}

fn swap_err() -> SwapFn {
    Box::new(|| Err(ProviderError::Unavailable("swap stats unavailable".into())))
}

fn example_swap() -> SwapStats {
    SwapStats {
        sin: 1,
        sout: 2,
        pg_in: 3,
        pg_out: 4,
        pg_fault: 10,
        pg_maj_fault: 4,
    }
}

fn device(name: &str, used: u64, free: u64, cached: Option<u64>) -> PageFileStats {
    PageFileStats {
        device_name: name.to_string(),
        used_bytes: used,
        free_bytes: free,
        cached_bytes: cached,
    }
}

/// Helper to build and start a scraper with default settings.
fn started(
    page_files: PageFileFn,
    swap: SwapFn,
) -> PagingScraper<BootFn, PageFileFn, SwapFn> {
    let mut scraper = PagingScraper::new(MetricsSettings::default(), boot_ok(), page_files, swap);
    scraper.start().expect("start should succeed");
    scraper
}

#[test]
fn test_example_scrape() {
    let scraper = started(
        page_files_ok(vec![device("/dev/sda1", 100, 50, None)]),
        swap_ok(),
    );

    let outcome = scraper.scrape().unwrap();
    assert!(outcome.error.is_ok());
    assert_eq!(outcome.metrics.len(), 3);

    let names: Vec<&str> = outcome.metrics.iter().map(|m| m.name).collect();
    assert_eq!(
        names,
        vec![
            "system.paging.usage",
            "system.paging.operations",
            "system.paging.faults"
        ]
    );

    let usage = outcome.metric("system.paging.usage").unwrap();
    assert_eq!(usage.data_points.len(), 2);
    let used = usage.find_point(&[("state", "used")]).unwrap();
    assert_eq!(used.value, 100);
    assert_eq!(used.attributes.get(labels::DEVICE), Some("/dev/sda1"));
    let free = usage.find_point(&[("state", "free")]).unwrap();
    assert_eq!(free.value, 50);
    assert_eq!(free.attributes.get(labels::DEVICE), Some("/dev/sda1"));

    let ops = outcome.metric("system.paging.operations").unwrap();
    assert_eq!(ops.data_points.len(), 4);
    let value = |t: &str, d: &str| {
        ops.find_point(&[("type", t), ("direction", d)])
            .unwrap()
            .value
    };
    assert_eq!(value("major", "page_in"), 1);
    assert_eq!(value("major", "page_out"), 2);
    assert_eq!(value("minor", "page_in"), 3);
    assert_eq!(value("minor", "page_out"), 4);

    let faults = outcome.metric("system.paging.faults").unwrap();
    assert_eq!(faults.data_points.len(), 2);
    assert_eq!(faults.find_point(&[("type", "major")]).unwrap().value, 4);
    assert_eq!(faults.find_point(&[("type", "minor")]).unwrap().value, 6);
}

#[test]
fn test_usage_point_count_is_two_per_device_plus_cached() {
    let devices = vec![
        device("/dev/sda2", 10, 20, Some(5)),
        device("/swapfile", 1, 2, None),
        device("/dev/zram0", 3, 4, Some(0)),
        device("", 7, 8, None),
    ];
    let d = devices.len();
    let c = devices.iter().filter(|p| p.cached_bytes.is_some()).count();

    let scraper = started(page_files_ok(devices), swap_ok());
    let outcome = scraper.scrape().unwrap();

    let usage = outcome.metric("system.paging.usage").unwrap();
    assert_eq!(usage.data_points.len(), 2 * d + c);

    let cached: Vec<_> = usage
        .data_points
        .iter()
        .filter(|dp| dp.attributes.get(labels::STATE) == Some("cached"))
        .collect();
    assert_eq!(cached.len(), c);

    // Unnamed device carries no device label at all
    let unnamed = usage
        .data_points
        .iter()
        .filter(|dp| !dp.attributes.contains_key(labels::DEVICE))
        .count();
    assert_eq!(unnamed, 2);
}

#[test]
fn test_zero_devices_still_emits_usage_metric() {
    let scraper = started(page_files_ok(Vec::new()), swap_ok());
    let outcome = scraper.scrape().unwrap();

    assert!(outcome.error.is_ok());
    let usage = outcome.metric("system.paging.usage").unwrap();
    assert!(usage.data_points.is_empty());
}

#[test]
fn test_counter_semantics() {
    let scraper = started(page_files_ok(vec![device("/dev/sda1", 1, 1, Some(1))]), swap_ok());
    let before = Timestamp::now();
    let outcome = scraper.scrape().unwrap();
    let start_time = Timestamp::from_unix_seconds(BOOT_TIME);

    let usage = outcome.metric("system.paging.usage").unwrap();
    assert!(matches!(usage.data_type, DataType::Sum { monotonic: false, .. }));
    for dp in &usage.data_points {
        assert_eq!(dp.start_timestamp, None);
        assert!(dp.timestamp >= before);
    }

    for name in ["system.paging.operations", "system.paging.faults"] {
        let metric = outcome.metric(name).unwrap();
        assert!(matches!(metric.data_type, DataType::Sum { monotonic: true, .. }));
        for dp in &metric.data_points {
            assert_eq!(dp.start_timestamp, Some(start_time));
            assert!(dp.timestamp >= before);
        }
    }
}

#[test]
fn test_page_file_failure_keeps_swap_metrics() {
    let scraper = started(page_files_err(), swap_ok());
    let outcome = scraper.scrape().unwrap();

    assert!(outcome.metric("system.paging.usage").is_none());
    assert_eq!(
        outcome.metric("system.paging.operations").unwrap().data_points.len(),
        4
    );
    assert_eq!(outcome.metric("system.paging.faults").unwrap().data_points.len(), 2);

    let err = outcome.error.unwrap_err();
    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.failed(), PAGING_USAGE_METRICS_LEN);
    assert_eq!(err.errors()[0].group, PAGING_USAGE_GROUP);
    assert!(err.to_string().contains("page files unavailable"));
}

#[test]
fn test_swap_failure_drops_operations_and_faults() {
    let scraper = started(page_files_ok(vec![device("/dev/sda1", 100, 50, None)]), swap_err());
    let outcome = scraper.scrape().unwrap();

    assert_eq!(outcome.metrics.len(), 1);
    assert!(outcome.metric("system.paging.usage").is_some());
    assert!(outcome.metric("system.paging.operations").is_none());
    assert!(outcome.metric("system.paging.faults").is_none());

    let err = outcome.error.unwrap_err();
    assert!(matches!(err, ScrapeError::Partial(_)));
    assert_eq!(err.failed(), PAGING_METRICS_LEN);
    // The lost group names both metrics fed by the swap source
    assert_eq!(err.errors()[0].group, PAGING_OPERATIONS_FAULTS_GROUP);
    assert_eq!(err.errors()[0].group, "system.paging.operations+faults");
    assert!(err.to_string().contains("swap stats unavailable"));
}

#[test]
fn test_both_failures_are_combined() {
    let scraper = started(page_files_err(), swap_err());
    let outcome = scraper.scrape().unwrap();

    assert!(outcome.metrics.is_empty());
    assert_eq!(outcome.data_point_count(), 0);

    let err = outcome.error.unwrap_err();
    assert!(matches!(err, ScrapeError::Multiple { .. }));
    assert_eq!(err.errors().len(), 2);
    assert_eq!(err.failed(), PAGING_USAGE_METRICS_LEN + PAGING_METRICS_LEN);

    let message = err.to_string();
    assert!(message.starts_with('['));
    assert!(message.contains("page files unavailable"));
    assert!(message.contains("swap stats unavailable"));
}

#[test]
fn test_each_source_called_once_per_scrape() {
    let page_calls = std::rc::Rc::new(Cell::new(0));
    let swap_calls = std::rc::Rc::new(Cell::new(0));

    let pc = page_calls.clone();
    let sc = swap_calls.clone();
    let mut scraper = PagingScraper::new(
        MetricsSettings::default(),
        || -> Result<u64, ProviderError> { Ok(BOOT_TIME) },
        move || -> Result<Vec<PageFileStats>, ProviderError> {
            pc.set(pc.get() + 1);
            Ok(Vec::new())
        },
        move || -> Result<SwapStats, ProviderError> {
            sc.set(sc.get() + 1);
            Ok(example_swap())
        },
    );
    scraper.start().unwrap();

    scraper.scrape().unwrap();
    scraper.scrape().unwrap();

    assert_eq!(page_calls.get(), 2);
    assert_eq!(swap_calls.get(), 2);
}

#[test]
fn test_start_failure_is_propagated() {
    let mut scraper = PagingScraper::new(
        MetricsSettings::default(),
        || -> Result<u64, ProviderError> { Err(ProviderError::Unavailable("no btime".into())) },
        page_files_ok(Vec::new()),
        swap_ok(),
    );

    let err = scraper.start().unwrap_err();
    // Provider failure surfaces unchanged
    assert_eq!(err.to_string(), "no btime");
    let StartError::BootTime(source) = &err;
    assert!(matches!(source, ProviderError::Unavailable(m) if m == "no btime"));
    assert!(scraper.start_time().is_none());
    assert!(scraper.scrape().is_err());
}

#[test]
fn test_start_time_is_anchored_once() {
    let calls = std::rc::Rc::new(Cell::new(0u64));
    let c = calls.clone();
    let mut scraper = PagingScraper::new(
        MetricsSettings::default(),
        move || -> Result<u64, ProviderError> {
            c.set(c.get() + 1);
            Ok(BOOT_TIME + c.get())
        },
        page_files_ok(Vec::new()),
        swap_ok(),
    );

    scraper.start().unwrap();
    let anchored = scraper.start_time().unwrap();
    scraper.start().unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(scraper.start_time(), Some(anchored));
    assert_eq!(anchored, Timestamp::from_unix_seconds(BOOT_TIME + 1));

    let outcome = scraper.scrape().unwrap();
    let faults = outcome.metric("system.paging.faults").unwrap();
    assert!(faults
        .data_points
        .iter()
        .all(|dp| dp.start_timestamp == Some(anchored)));
}

#[test]
fn test_disabled_metrics_are_skipped() {
    let mut settings = MetricsSettings::default();
    settings.system_paging_faults.enabled = false;

    let mut scraper = PagingScraper::new(
        settings,
        boot_ok(),
        page_files_ok(vec![device("/dev/sda1", 1, 1, None)]),
        swap_err(),
    );
    scraper.start().unwrap();

    let outcome = scraper.scrape().unwrap();
    assert!(outcome.metric("system.paging.usage").is_some());
    // Operations still enabled, so the swap failure costs one metric
    assert_eq!(outcome.error.unwrap_err().failed(), 1);
}

#[test]
fn test_disabled_group_does_not_call_source() {
    let mut settings = MetricsSettings::default();
    settings.system_paging_usage.enabled = false;

    let mut scraper = PagingScraper::new(settings, boot_ok(), page_files_err(), swap_ok());
    scraper.start().unwrap();

    let outcome = scraper.scrape().unwrap();
    assert!(outcome.error.is_ok());
    assert_eq!(outcome.metrics.len(), 2);
    assert!(outcome.metric("system.paging.usage").is_none());
}
