//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that reports the
//! outcome of the most recent scrape.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::{ScrapeStatus, SharedState};

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "Project: https://github.com/cansp-dev/herakles-paging-exporter — More info: https://www.herakles.now — Support: exporter@herakles.now";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let status = state.status.read().await.clone();

    // No scrape yet counts as unavailable, like a failed one
    let code = if status.success && status.last_scraped.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let message = match (&status.last_scraped, status.success) {
        (None, _) => "No scrape yet",
        (Some(_), true) => "OK",
        (Some(_), false) => "Partial scrape failure",
    };

    let start_time = state
        .scraper
        .start_time()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "not started".to_string());

    let table = render_status(&status);

    debug!("Health check: {} - {}", code, message);
    (
        code,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nUptime: {}s\nCounters anchored at: {start_time}\n\n{table}\n{FOOTER_TEXT}",
            state.start_time.elapsed().as_secs()
        ),
    )
}

/// Renders the last scrape as a plain-text table.
fn render_status(status: &ScrapeStatus) -> String {
    let mut out = String::new();
    writeln!(out, "LAST SCRAPE").ok();
    writeln!(out, "===========").ok();
    writeln!(out).ok();

    let age = status
        .last_scraped
        .map(|t| format!("{:.1}s ago", t.elapsed().as_secs_f64()))
        .unwrap_or_else(|| "never".to_string());

    writeln!(out, "{:20} | {}", "When", age).ok();
    writeln!(out, "{:20} | {:.2}ms", "Duration", status.duration_seconds * 1000.0).ok();
    writeln!(out, "{:20} | {}", "Metrics", status.metrics).ok();
    writeln!(out, "{:20} | {}", "Data points", status.data_points).ok();
    writeln!(out, "{:20} | {}", "Errored points", status.errored_points).ok();
    if let Some(err) = &status.last_error {
        writeln!(out, "{:20} | {}", "Error", err).ok();
    }
    out
}
