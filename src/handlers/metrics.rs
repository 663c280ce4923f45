//! Metrics endpoint handler for Prometheus scraping.
//!
//! Each `/metrics` request runs exactly one paging scrape; the Prometheus
//! server polling this endpoint is the scheduler. Partial failures are logged
//! and reflected in the exporter metrics, the surviving groups are served.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::{CollectError, SharedState};

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    ScrapeFailed(String),
    EncodingFailed,
}

impl From<CollectError> for MetricsError {
    fn from(e: CollectError) -> Self {
        match e {
            CollectError::Scrape(e) => MetricsError::ScrapeFailed(e.to_string()),
            CollectError::Encoding(_) => MetricsError::EncodingFailed,
        }
    }
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        match self {
            MetricsError::ScrapeFailed(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("Scrape failed: {msg}")).into_response()
            }
            MetricsError::EncodingFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
            }
        }
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    // procfs reads and the collect lock block, keep them off the runtime workers
    let collector = Arc::clone(&state);
    let body = tokio::task::spawn_blocking(move || collector.collect())
        .await
        .map_err(|e| {
            error!("Collect task failed: {}", e);
            MetricsError::EncodingFailed
        })?
        .map_err(|e| {
            error!("Failed to collect metrics: {}", e);
            MetricsError::from(e)
        })?;

    debug!(
        "Served /metrics in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(body)
}
