//! Aggregation of partial scrape failures.
//!
//! Each failed metric group contributes one [`PartialScrapeError`] carrying the
//! number of data points it could not produce. [`ScrapeErrors::combine`] folds
//! them into nothing, the single failure, or a [`ScrapeError::Multiple`].

use std::fmt;

use crate::providers::ProviderError;

/// One metric group that could not be scraped.
#[derive(Debug, thiserror::Error)]
#[error("{group}: {source}")]
pub struct PartialScrapeError {
    /// Metric group that failed, e.g. `system.paging.usage`.
    pub group: &'static str,
    /// Data points lost because of this failure.
    pub failed: usize,
    #[source]
    pub source: ProviderError,
}

/// Aggregate error returned alongside the metrics of a scrape.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Partial(PartialScrapeError),
    #[error("{}", MultipleDisplay(.errors))]
    Multiple {
        errors: Vec<PartialScrapeError>,
        failed: usize,
    },
}

impl ScrapeError {
    /// Total number of data points lost.
    pub fn failed(&self) -> usize {
        match self {
            ScrapeError::Partial(err) => err.failed,
            ScrapeError::Multiple { failed, .. } => *failed,
        }
    }

    /// Individual failures, in the order they were recorded.
    pub fn errors(&self) -> &[PartialScrapeError] {
        match self {
            ScrapeError::Partial(err) => std::slice::from_ref(err),
            ScrapeError::Multiple { errors, .. } => errors,
        }
    }
}

struct MultipleDisplay<'a>(&'a [PartialScrapeError]);

impl fmt::Display for MultipleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        f.write_str("]")
    }
}

/// Accumulator for partial failures within one scrape.
#[derive(Debug, Default)]
pub struct ScrapeErrors {
    errors: Vec<PartialScrapeError>,
    failed: usize,
}

impl ScrapeErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `group` lost `failed` data points because of `source`.
    pub fn add_partial(&mut self, group: &'static str, failed: usize, source: ProviderError) {
        self.failed += failed;
        self.errors.push(PartialScrapeError {
            group,
            failed,
            source,
        });
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn combine(mut self) -> Result<(), ScrapeError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(ScrapeError::Partial(self.errors.remove(0))),
            _ => Err(ScrapeError::Multiple {
                errors: self.errors,
                failed: self.failed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(msg: &str) -> ProviderError {
        ProviderError::Unavailable(msg.to_string())
    }

    #[test]
    fn test_combine_empty_is_ok() {
        let errors = ScrapeErrors::new();
        assert!(errors.is_empty());
        assert!(errors.combine().is_ok());
    }

    #[test]
    fn test_combine_single_keeps_failure() {
        let mut errors = ScrapeErrors::new();
        errors.add_partial("system.paging.usage", 1, unavailable("no swaps"));

        let err = errors.combine().unwrap_err();
        assert!(matches!(err, ScrapeError::Partial(_)));
        assert_eq!(err.failed(), 1);
        assert_eq!(err.to_string(), "system.paging.usage: no swaps");
    }

    #[test]
    fn test_combine_multiple_sums_failed() {
        let mut errors = ScrapeErrors::new();
        errors.add_partial("system.paging.usage", 1, unavailable("a"));
        errors.add_partial("system.paging.operations", 2, unavailable("b"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.failed_count(), 3);

        let err = errors.combine().unwrap_err();
        assert_eq!(err.failed(), 3);
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "[system.paging.usage: a; system.paging.operations: b]"
        );
    }
}
