//! Sources of raw paging statistics consumed by the scraper.
//!
//! The scraper only depends on the three traits below. `ProcFs` reads them
//! from a Linux procfs tree, `FixtureSource` replays them from a file, and
//! plain closures implement them for tests.

pub mod fixture;
pub mod procfs;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use fixture::FixtureSource;
pub use procfs::ProcFs;

/// Failure of a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Unavailable(String),
}

/// Usage of one swap device or page file, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFileStats {
    pub device_name: String,
    pub used_bytes: u64,
    pub free_bytes: u64,
    /// Only some platforms report cached swap per device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_bytes: Option<u64>,
}

/// Cumulative swap activity since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwapStats {
    /// Bytes swapped in from disk.
    pub sin: u64,
    /// Bytes swapped out to disk.
    pub sout: u64,
    /// Bytes paged in.
    pub pg_in: u64,
    /// Bytes paged out.
    pub pg_out: u64,
    /// All page faults, major and minor.
    pub pg_fault: u64,
    pub pg_maj_fault: u64,
}

/// Host boot time in seconds since the Unix epoch.
pub trait BootTimeSource {
    fn boot_time(&self) -> Result<u64, ProviderError>;
}

pub trait PageFileSource {
    fn page_file_stats(&self) -> Result<Vec<PageFileStats>, ProviderError>;
}

pub trait SwapSource {
    fn swap_stats(&self) -> Result<SwapStats, ProviderError>;
}

impl<F> BootTimeSource for F
where
    F: Fn() -> Result<u64, ProviderError>,
{
    fn boot_time(&self) -> Result<u64, ProviderError> {
        self()
    }
}

impl<F> PageFileSource for F
where
    F: Fn() -> Result<Vec<PageFileStats>, ProviderError>,
{
    fn page_file_stats(&self) -> Result<Vec<PageFileStats>, ProviderError> {
        self()
    }
}

impl<F> SwapSource for F
where
    F: Fn() -> Result<SwapStats, ProviderError>,
{
    fn swap_stats(&self) -> Result<SwapStats, ProviderError> {
        self()
    }
}

/// Either live procfs data or a replayed fixture.
#[derive(Debug, Clone)]
pub enum PagingSource {
    ProcFs(ProcFs),
    Fixture(FixtureSource),
}

impl PagingSource {
    /// Uses the fixture when a path is given, procfs at `procfs_root` otherwise.
    pub fn open(
        procfs_root: &std::path::Path,
        fixture: Option<&std::path::Path>,
    ) -> Result<Self, ProviderError> {
        match fixture {
            Some(path) => Ok(PagingSource::Fixture(FixtureSource::load(path)?)),
            None => Ok(PagingSource::ProcFs(ProcFs::new(procfs_root))),
        }
    }
}

impl BootTimeSource for PagingSource {
    fn boot_time(&self) -> Result<u64, ProviderError> {
        match self {
            PagingSource::ProcFs(p) => p.boot_time(),
            PagingSource::Fixture(f) => f.boot_time(),
        }
    }
}

impl PageFileSource for PagingSource {
    fn page_file_stats(&self) -> Result<Vec<PageFileStats>, ProviderError> {
        match self {
            PagingSource::ProcFs(p) => p.page_file_stats(),
            PagingSource::Fixture(f) => f.page_file_stats(),
        }
    }
}

impl SwapSource for PagingSource {
    fn swap_stats(&self) -> Result<SwapStats, ProviderError> {
        match self {
            PagingSource::ProcFs(p) => p.swap_stats(),
            PagingSource::Fixture(f) => f.swap_stats(),
        }
    }
}
