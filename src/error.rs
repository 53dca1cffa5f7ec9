//! Error type shared by the bundling pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the pipeline and its collaborators.
///
/// Only cache and serialisation failures are fatal to a request; fetch failures are recovered
/// by the bundle builder and merely logged.
#[derive(Debug, Error)]
pub enum BundleError {
  /// A bundle file could not be persisted.
  #[error("failed to write bundle {}: {source}", path.display())]
  CacheWrite {
    /// Target path of the bundle.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },
  /// A cache entry exists but could not be read.
  #[error("failed to read bundle {}: {source}", path.display())]
  CacheRead {
    /// Path of the bundle.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },
  /// The rewritten tree could not be serialised back to HTML.
  #[error("failed to serialise document: {0}")]
  Serialize(#[source] io::Error),
  /// An external resource could not be retrieved.
  #[error("failed to fetch {url}: {reason}")]
  Fetch {
    /// URL that was requested.
    url: String,
    /// Human readable failure description.
    reason: String,
  },
  /// The configuration file could not be read.
  #[error("failed to read {}: {source}", path.display())]
  ConfigRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },
  /// The configuration file is not valid JSON for [`crate::BundlerConfig`].
  #[error("failed to parse {}: {source}", path.display())]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}

impl BundleError {
  /// Convenience constructor for fetch failures.
  pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::Fetch {
      url: url.into(),
      reason: reason.to_string(),
    }
  }

  /// Whether the error should abort bundling for the current document.
  pub fn is_fatal(&self) -> bool {
    !matches!(self, Self::Fetch { .. })
  }
}
