//! Scrape command implementation.
//!
//! Starts the scraper once and runs a fixed number of sequential scrapes,
//! printing each metric collection together with its aggregate error.

use anyhow::Context;
use herakles_paging_exporter::{Metric, ScrapeOutcome};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::state::build_scraper;

/// One printed scrape.
#[derive(Serialize)]
struct ScrapeReport<'a> {
    iteration: usize,
    duration_ms: f64,
    metrics: &'a [Metric],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

#[derive(Serialize)]
struct ErrorReport {
    message: String,
    failed: usize,
    groups: Vec<&'static str>,
}

impl ErrorReport {
    fn from_outcome(outcome: &ScrapeOutcome) -> Option<Self> {
        outcome.error.as_ref().err().map(|e| ErrorReport {
            message: e.to_string(),
            failed: e.failed(),
            groups: e.errors().iter().map(|p| p.group).collect(),
        })
    }
}

/// Runs `iterations` scrapes, `interval_ms` apart.
pub fn command_scrape(
    iterations: usize,
    interval_ms: u64,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<()> {
    let mut scraper = build_scraper(config).context("failed to open paging source")?;
    scraper.start().context("failed to start paging scraper")?;

    let interval = Duration::from_millis(interval_ms);

    for iteration in 1..=iterations {
        let start = Instant::now();
        let outcome = scraper.scrape()?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        if let Err(e) = &outcome.error {
            warn!("Iteration {}: partial scrape: {}", iteration, e);
        }

        let report = ScrapeReport {
            iteration,
            duration_ms,
            metrics: &outcome.metrics,
            error: ErrorReport::from_outcome(&outcome),
        };

        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            OutputFormat::Yaml => serde_yaml::to_string(&report)?,
        };
        println!("{}", rendered);

        if iteration < iterations {
            debug!("Sleeping {:?} before next scrape", interval);
            std::thread::sleep(interval);
        }
    }

    Ok(())
}
