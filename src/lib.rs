//! Herakles Paging Exporter Library
//!
//! Collects swap and paging statistics and turns them into a typed,
//! timestamped metrics model. The library is independent of how metrics are
//! exported; the `herakles-paging-exporter` binary serves them to Prometheus.
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_paging_exporter::{MetricsSettings, PagingScraper, ProcFs};
//!
//! let procfs = ProcFs::default();
//! let mut scraper = PagingScraper::new(
//!     MetricsSettings::default(),
//!     procfs.clone(),
//!     procfs.clone(),
//!     procfs,
//! );
//!
//! // Anchor cumulative counters at boot time (fatal if unavailable).
//! scraper.start().expect("boot time");
//!
//! let outcome = scraper.scrape().expect("started");
//! for metric in &outcome.metrics {
//!     println!("{}: {} points", metric.name, metric.data_points.len());
//! }
//! if let Err(e) = &outcome.error {
//!     eprintln!("partial scrape: {} ({} lost)", e, e.failed());
//! }
//! ```

pub mod metadata;
pub mod model;
pub mod providers;
pub mod scrape_error;
pub mod scraper;

// Re-export main types for convenience
pub use metadata::{MetricSettings, MetricsSettings};
pub use model::{Attributes, DataType, Metric, NumberDataPoint, Timestamp};
pub use providers::{
    BootTimeSource, FixtureSource, PageFileSource, PageFileStats, PagingSource, ProcFs,
    ProviderError, SwapSource, SwapStats,
};
pub use scrape_error::{PartialScrapeError, ScrapeError, ScrapeErrors};
pub use scraper::{PagingScraper, ScrapeOutcome, ScrapeStateError, StartError};
