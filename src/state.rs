//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use herakles_paging_exporter::{PagingScraper, PagingSource, ProviderError, ScrapeStateError};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::Config;
use crate::metrics::PagingMetrics;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Scraper wired to the configured source for all three collaborators.
pub type Scraper = PagingScraper<PagingSource, PagingSource, PagingSource>;

/// Opens the configured source and wires it into a new, not yet started scraper.
pub fn build_scraper(config: &Config) -> Result<Scraper, ProviderError> {
    let source = PagingSource::open(config.procfs_root(), config.test_data_file.as_deref())?;
    Ok(PagingScraper::new(
        config.metrics,
        source.clone(),
        source.clone(),
        source,
    ))
}

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Outcome of the most recent scrape, as reported by `/health`.
#[derive(Debug, Clone, Default)]
pub struct ScrapeStatus {
    pub last_scraped: Option<Instant>,
    pub duration_seconds: f64,
    pub success: bool,
    pub metrics: usize,
    pub data_points: usize,
    pub errored_points: usize,
    pub last_error: Option<String>,
}

/// Failure of a whole collection cycle.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Scrape(#[from] ScrapeStateError),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub metrics: PagingMetrics,
    /// Started scraper; the boot time anchor is fixed for its lifetime.
    pub scraper: Scraper,
    pub config: Arc<Config>,
    pub status: RwLock<ScrapeStatus>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
    /// Held from scrape until the registry is encoded.
    collect_lock: Mutex<()>,
}

impl AppState {
    pub fn new(registry: Registry, metrics: PagingMetrics, scraper: Scraper, config: Config) -> Self {
        Self {
            registry,
            metrics,
            scraper,
            config: Arc::new(config),
            status: RwLock::new(ScrapeStatus::default()),
            start_time: Instant::now(),
            collect_lock: Mutex::new(()),
        }
    }

    /// Runs one scrape, publishes it to the registry and returns the encoded text.
    ///
    /// Blocks on procfs reads and on the collect lock, so it must run outside
    /// the async runtime (`spawn_blocking`). Concurrent callers are serialized:
    /// `record` resets the paging vectors before refilling them and no gather
    /// may observe that window.
    pub fn collect(&self) -> Result<String, CollectError> {
        let _guard = self
            .collect_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let start = Instant::now();
        let outcome = self.scraper.scrape()?;
        let duration = start.elapsed().as_secs_f64();

        if let Err(e) = &outcome.error {
            warn!(
                "Partial scrape: {} ({} errored points, {} metrics served)",
                e,
                e.failed(),
                outcome.metrics.len()
            );
        }

        self.metrics.record(&outcome, duration);

        *self.status.blocking_write() = ScrapeStatus {
            last_scraped: Some(start),
            duration_seconds: duration,
            success: outcome.error.is_ok(),
            metrics: outcome.metrics.len(),
            data_points: outcome.data_point_count(),
            errored_points: outcome.error.as_ref().err().map_or(0, |e| e.failed()),
            last_error: outcome.error.as_ref().err().map(|e| e.to_string()),
        };

        let mut buffer = Vec::with_capacity(BUFFER_CAP);
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| CollectError::Encoding(e.to_string()))?;
        let body = String::from_utf8(buffer).map_err(|e| CollectError::Encoding(e.to_string()))?;

        debug!(
            "Collected {} data points in {:.2}ms",
            outcome.data_point_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(body)
    }
}
