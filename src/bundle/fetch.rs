//! Retrieval of external resource bytes.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use percent_encoding::percent_decode_str;

use crate::config::BundlerConfig;
use crate::error::BundleError;

const DEFAULT_MAX_SIZE: u64 = 16 * 1024 * 1024;

/// Capability used by the bundle builder to read external resources.
///
/// Implementations must be `Send + Sync` because fetches for one bundle run in parallel.
pub trait ResourceFetcher: Send + Sync {
  /// Fetch the bytes behind `url`.
  fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
    (**self).fetch(url)
  }
}

/// Default fetcher for `http(s)://`, protocol-relative and `data:` URLs.
///
/// Every HTTP request is bounded by a global timeout, so one unreachable host cannot stall the
/// pipeline. `file://` URLs are refused unless enabled with [`HttpFetcher::with_file_urls`],
/// since bundles are served publicly.
#[derive(Clone)]
pub struct HttpFetcher {
  agent: ureq::Agent,
  timeout: Duration,
  user_agent: String,
  max_size: u64,
  allow_file_urls: bool,
}

impl HttpFetcher {
  /// Create a fetcher with the given timeout and user agent.
  pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
    Self {
      agent: build_agent(timeout),
      timeout,
      user_agent: user_agent.into(),
      max_size: DEFAULT_MAX_SIZE,
      allow_file_urls: false,
    }
  }

  /// Fetcher configured from [`BundlerConfig::fetch_timeout`], `user_agent` and
  /// `allow_file_urls`.
  pub fn from_config(config: &BundlerConfig) -> Self {
    Self::new(config.fetch_timeout(), config.user_agent.clone())
      .with_file_urls(config.allow_file_urls)
  }

  /// Set the request timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.agent = build_agent(timeout);
    self.timeout = timeout;
    self
  }

  /// Set the maximum accepted response size in bytes.
  pub fn with_max_size(mut self, max_size: u64) -> Self {
    self.max_size = max_size;
    self
  }

  /// Allow or refuse reading local files through `file://` URLs.
  pub fn with_file_urls(mut self, allow: bool) -> Self {
    self.allow_file_urls = allow;
    self
  }

  /// Configured request timeout.
  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  fn fetch_http(&self, url: &str) -> Result<Vec<u8>, BundleError> {
    let mut response = self
      .agent
      .get(url)
      .header("User-Agent", &self.user_agent)
      .call()
      .map_err(|err| BundleError::fetch(url, err))?;

    response
      .body_mut()
      .with_config()
      .limit(self.max_size)
      .read_to_vec()
      .map_err(|err| BundleError::fetch(url, err))
  }

  fn fetch_file(&self, url: &str) -> Result<Vec<u8>, BundleError> {
    if !self.allow_file_urls {
      return Err(BundleError::fetch(url, "file URLs are disabled"));
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    let path = percent_decode_str(path).decode_utf8_lossy();
    fs::read(&*path).map_err(|err| BundleError::fetch(url, err))
  }
}

impl Default for HttpFetcher {
  fn default() -> Self {
    Self::from_config(&BundlerConfig::default())
  }
}

impl ResourceFetcher for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("data:") {
      decode_data_url(url)
    } else if lower.starts_with("file://") {
      self.fetch_file(url)
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
      self.fetch_http(url)
    } else if url.starts_with("//") {
      self.fetch_http(&format!("https:{url}"))
    } else {
      Err(BundleError::fetch(url, "relative URL with no document URL to resolve against"))
    }
  }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
  ureq::Agent::config_builder()
    .timeout_global(Some(timeout))
    .build()
    .into()
}

/// Decode a `data:` URL into its payload bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, BundleError> {
  let rest = url
    .trim_start()
    .get(5..)
    .ok_or_else(|| BundleError::fetch(url, "malformed data URL"))?;
  let (meta, payload) = rest
    .split_once(',')
    .ok_or_else(|| BundleError::fetch(url, "data URL has no payload"))?;

  if meta
    .rsplit(';')
    .next()
    .is_some_and(|flag| flag.eq_ignore_ascii_case("base64"))
  {
    let compact: String = percent_decode_str(payload)
      .decode_utf8_lossy()
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect();
    general_purpose::STANDARD
      .decode(compact)
      .map_err(|err| BundleError::fetch(url, err))
  } else {
    Ok(percent_decode_str(payload).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn decodes_base64_data_urls() {
    let bytes = decode_data_url("data:text/css;base64,Ym9keXt9").unwrap();
    assert_eq!(bytes, b"body{}");
  }

  #[test]
  fn decodes_percent_encoded_data_urls() {
    let bytes = decode_data_url("data:text/javascript,alert(%22hi%22)").unwrap();
    assert_eq!(bytes, br#"alert("hi")"#);
  }

  #[test]
  fn rejects_data_urls_without_payload() {
    assert!(decode_data_url("data:text/css").is_err());
  }

  #[test]
  fn reads_file_urls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("site.css");
    fs::write(&path, "a{}").unwrap();

    let fetcher = HttpFetcher::default().with_file_urls(true);
    let bytes = fetcher
      .fetch(&format!("file://{}", path.display()))
      .unwrap();
    assert_eq!(bytes, b"a{}");
  }

  #[test]
  fn refuses_file_urls_by_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("secret.txt");
    fs::write(&path, "secret").unwrap();
    let url = format!("file://{}", path.display());

    let err = HttpFetcher::default().fetch(&url).unwrap_err();
    assert!(matches!(err, BundleError::Fetch { .. }));

    let config = BundlerConfig {
      allow_file_urls: true,
      ..BundlerConfig::default()
    };
    assert_eq!(HttpFetcher::from_config(&config).fetch(&url).unwrap(), b"secret");
  }

  #[test]
  fn relative_urls_fail_without_network_access() {
    let fetcher = HttpFetcher::default().with_timeout(Duration::from_secs(1));
    let err = fetcher.fetch("/wp-content/site.css").unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(fetcher.timeout(), Duration::from_secs(1));
  }
}
