//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> anyhow::Result<()> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("herakles-paging-exporter.yaml"));

    let mut content = render_config(&config, format).map_err(|e| anyhow::anyhow!("{e}"))?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Paging Exporter Configuration
# =======================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9216                   # HTTP port
#
# Sources
# -------
# procfs_root: "/proc"         # Where swaps, vmstat and stat are read from
# test_data_file: null         # Fixture file replayed instead of procfs
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# Metrics Enable Flags
# --------------------
# metrics:
#   system.paging.usage:
#     enabled: true            # Swap usage per device and state
#   system.paging.operations:
#     enabled: true            # Paging operations since boot
#   system.paging.faults:
#     enabled: true            # Major/minor page faults since boot
"#;

    format!("{comments}\n{yaml}")
}
