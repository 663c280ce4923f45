//! Paging statistics replayed from a JSON or YAML file.
//!
//! Used instead of procfs when `test_data_file` is configured, so the exporter
//! can run on hosts without a Linux `/proc`. Each source can be replaced by an
//! error message to simulate a failing provider.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{BootTimeSource, PageFileSource, PageFileStats, ProviderError, SwapSource, SwapStats};

/// Either the data a source returns or the error it fails with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replay<T> {
    Error { error: String },
    Data(T),
}

impl<T: Clone> Replay<T> {
    fn replay(&self) -> Result<T, ProviderError> {
        match self {
            Replay::Data(data) => Ok(data.clone()),
            Replay::Error { error } => Err(ProviderError::Unavailable(error.clone())),
        }
    }
}

/// Root structure of a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSource {
    pub boot_time: Replay<u64>,
    pub page_files: Replay<Vec<PageFileStats>>,
    pub swap: Replay<SwapStats>,
}

impl FixtureSource {
    /// Loads a fixture; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        debug!("Loading paging fixture from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };

        let fixture: FixtureSource = parsed.map_err(|message| ProviderError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        info!("Loaded paging fixture from {}", path.display());
        Ok(fixture)
    }
}

impl BootTimeSource for FixtureSource {
    fn boot_time(&self) -> Result<u64, ProviderError> {
        self.boot_time.replay()
    }
}

impl PageFileSource for FixtureSource {
    fn page_file_stats(&self) -> Result<Vec<PageFileStats>, ProviderError> {
        self.page_files.replay()
    }
}

impl SwapSource for FixtureSource {
    fn swap_stats(&self) -> Result<SwapStats, ProviderError> {
        self.swap.replay()
    }
}
