//! CLI command implementations for herakles-paging-exporter.
//!
//! - `check`: Configuration and source validation
//! - `config`: Configuration file generation
//! - `scrape`: One-shot or repeated scrapes printed to stdout

pub mod check;
pub mod config;
pub mod scrape;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use scrape::command_scrape;
