//! Paging statistics read from a Linux procfs tree.
//!
//! - boot time: `btime` line of `/proc/stat`
//! - page files: `/proc/swaps`
//! - swap activity: `/proc/vmstat`

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{BootTimeSource, PageFileSource, PageFileStats, ProviderError, SwapSource, SwapStats};

pub const DEFAULT_PROCFS_ROOT: &str = "/proc";

/// `/proc/swaps` and the `pgpg*` counters of `/proc/vmstat` are in KiB.
const KIB: u64 = 1024;

/// Fallback when `sysconf(_SC_PAGESIZE)` is unavailable.
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Reads the system page size using sysconf.
pub fn page_size() -> u64 {
    // SAFETY: sysconf is a simple libc call with no side effects.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        DEFAULT_PAGE_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
    page_size: u64,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROCFS_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: page_size(),
        }
    }

    /// Overrides the page size used to convert `pswpin`/`pswpout` to bytes.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, name: &str) -> Result<(PathBuf, String), ProviderError> {
        let path = self.root.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(ProviderError::Io { path, source }),
        }
    }
}

impl BootTimeSource for ProcFs {
    fn boot_time(&self) -> Result<u64, ProviderError> {
        let (path, content) = self.read("stat")?;
        parse_boot_time(&content).map_err(|message| ProviderError::Parse { path, message })
    }
}

impl PageFileSource for ProcFs {
    fn page_file_stats(&self) -> Result<Vec<PageFileStats>, ProviderError> {
        let (path, content) = self.read("swaps")?;
        let stats = parse_swaps(&content).map_err(|message| ProviderError::Parse { path, message })?;
        debug!("Read {} swap devices from {}", stats.len(), self.root.display());
        Ok(stats)
    }
}

impl SwapSource for ProcFs {
    fn swap_stats(&self) -> Result<SwapStats, ProviderError> {
        let (path, content) = self.read("vmstat")?;
        parse_vmstat(&content, self.page_size)
            .map_err(|message| ProviderError::Parse { path, message })
    }
}

/// Extracts `btime` (seconds since epoch) from `/proc/stat` content.
pub fn parse_boot_time(content: &str) -> Result<u64, String> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("btime ") {
            return rest
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid btime '{}': {}", rest.trim(), e));
        }
    }
    Err("btime line not found".to_string())
}

/// Parses `/proc/swaps`.
///
/// Format: `Filename Type Size Used Priority`, sizes in KiB, one header line.
pub fn parse_swaps(content: &str) -> Result<Vec<PageFileStats>, String> {
    let mut stats = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if idx == 0 && line.starts_with("Filename") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            return Err(format!(
                "line {}: expected at least 4 fields, got {}",
                idx + 1,
                parts.len()
            ));
        }

        let size_kb: u64 = parts[2]
            .parse()
            .map_err(|e| format!("line {}: invalid size '{}': {}", idx + 1, parts[2], e))?;
        let used_kb: u64 = parts[3]
            .parse()
            .map_err(|e| format!("line {}: invalid used '{}': {}", idx + 1, parts[3], e))?;

        stats.push(PageFileStats {
            device_name: unescape_octal(parts[0]),
            used_bytes: used_kb.saturating_mul(KIB),
            free_bytes: size_kb.saturating_sub(used_kb).saturating_mul(KIB),
            cached_bytes: None,
        });
    }

    Ok(stats)
}

/// Parses the paging counters out of `/proc/vmstat`.
pub fn parse_vmstat(content: &str, page_size: u64) -> Result<SwapStats, String> {
    let mut pswpin = None;
    let mut pswpout = None;
    let mut pgpgin = None;
    let mut pgpgout = None;
    let mut pgfault = None;
    let mut pgmajfault = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match key {
            "pswpin" => &mut pswpin,
            "pswpout" => &mut pswpout,
            "pgpgin" => &mut pgpgin,
            "pgpgout" => &mut pgpgout,
            "pgfault" => &mut pgfault,
            "pgmajfault" => &mut pgmajfault,
            _ => continue,
        };
        let parsed: u64 = value
            .parse()
            .map_err(|e| format!("invalid value for {} '{}': {}", key, value, e))?;
        *slot = Some(parsed);
    }

    let require = |value: Option<u64>, key: &str| value.ok_or_else(|| format!("{} not found", key));

    Ok(SwapStats {
        sin: require(pswpin, "pswpin")?.saturating_mul(page_size),
        sout: require(pswpout, "pswpout")?.saturating_mul(page_size),
        pg_in: require(pgpgin, "pgpgin")?.saturating_mul(KIB),
        pg_out: require(pgpgout, "pgpgout")?.saturating_mul(KIB),
        pg_fault: require(pgfault, "pgfault")?,
        pg_maj_fault: require(pgmajfault, "pgmajfault")?,
    })
}

/// The kernel escapes whitespace in swap file names as `\040` etc.
fn unescape_octal(name: &str) -> String {
    if !name.contains('\\') {
        return name.to_string();
    }

    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let code = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 8).ok());
            if let Some(code) = code {
                out.push(code);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
