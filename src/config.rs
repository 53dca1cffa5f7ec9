//! Bundler configuration loader describing where bundles live and how they are served.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::BundleError;

const DEFAULT_CONFIG_FILE: &str = "concat.config.json";

/// Explicit configuration handed to [`crate::ConcatBuilder`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Directory on disk where bundle files are written.
    pub cache_dir: PathBuf,
    /// Public base URL under which `cache_dir` is served.
    pub cache_url: String,
    /// URL of the page being processed, used to resolve relative resource URLs.
    pub document_url: Option<String>,
    /// Upper bound for a single external fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Whether the final markup is run through the HTML minifier.
    pub minify_html: bool,
    /// URL fragments whose tags are left in the document instead of being bundled.
    pub exclude: Vec<String>,
    /// User agent sent by the default HTTP fetcher.
    pub user_agent: String,
    /// Whether resources may be read from local `file://` URLs found in the markup.
    pub allow_file_urls: bool,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("concat_all_cache"),
            cache_url: "/concat_all_cache".into(),
            document_url: None,
            fetch_timeout_secs: 10,
            minify_html: true,
            exclude: Vec::new(),
            user_agent: concat!("concat_bundler/", env!("CARGO_PKG_VERSION")).into(),
            allow_file_urls: false,
        }
    }
}

impl BundlerConfig {
    /// Configuration rooted at `cache_dir` and served from `cache_url`, defaults elsewhere.
    pub fn new(cache_dir: impl Into<PathBuf>, cache_url: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            cache_url: cache_url.into(),
            ..Self::default()
        }
    }

    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing or malformed file yields the defaults so a host can always construct a bundler.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::load(path).ok()
    }

    /// Read configuration from a JSON file, reporting why it could not be used.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|source| BundleError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| BundleError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Public URL of a bundle file named `file_name`.
    pub fn bundle_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.cache_url.trim_end_matches('/'), file_name)
    }

    /// Timeout applied to each external fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Builder-style setter for [`Self::document_url`].
    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    /// Builder-style setter for [`Self::minify_html`].
    pub fn with_minify(mut self, enabled: bool) -> Self {
        self.minify_html = enabled;
        self
    }
}
