//! Configuration management for herakles-paging-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use herakles_paging_exporter::providers::procfs::DEFAULT_PROCFS_ROOT;
use herakles_paging_exporter::MetricsSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Sources
    #[serde(alias = "procfs-root")]
    pub procfs_root: Option<PathBuf>,
    /// Path to a fixture file (replays paging stats instead of /proc)
    #[serde(alias = "test-data-file")]
    pub test_data_file: Option<PathBuf>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Metrics enable flags
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            procfs_root: Some(PathBuf::from(DEFAULT_PROCFS_ROOT)),
            test_data_file: None,
            enable_health: Some(true),
            log_level: Some("info".into()),
            metrics: MetricsSettings::default(),
        }
    }
}

impl Config {
    pub fn procfs_root(&self) -> &Path {
        self.procfs_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PROCFS_ROOT))
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if !cfg.metrics.any_enabled() {
        return Err("At least one of system.paging.usage/operations/faults must be enabled".into());
    }

    if cfg.port == Some(0) {
        return Err("port must be non-zero".into());
    }

    match &cfg.test_data_file {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Test data file not found: {}", path.display()).into());
            }
        }
        None => {
            let root = cfg.procfs_root();
            if !root.is_dir() {
                return Err(format!("procfs root is not a directory: {}", root.display()).into());
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(root) = &args.procfs_root {
        config.procfs_root = Some(root.clone());
    }

    if let Some(test_file) = &args.test_data_file {
        config.test_data_file = Some(test_file.clone());
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    // Metric flags
    if args.disable_usage {
        config.metrics.system_paging_usage.enabled = false;
    }
    if args.disable_operations {
        config.metrics.system_paging_operations.enabled = false;
    }
    if args.disable_faults {
        config.metrics.system_paging_faults.enabled = false;
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            let defaults = [
                "/etc/herakles/paging-exporter.yaml",
                "/etc/herakles/paging-exporter.yml",
                "/etc/herakles/paging-exporter.json",
                "./herakles-paging-exporter.yaml",
                "./herakles-paging-exporter.yml",
                "./herakles-paging-exporter.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses configuration content, choosing the format from the file extension.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in requested format
pub fn render_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
