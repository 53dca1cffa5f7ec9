//! Bundle materialisation: resolving resource bytes, assembling bundle text, and storage.

pub mod fetch;
pub mod scripts;
pub mod store;
pub mod styles;

use rayon::prelude::*;
use tracing::{debug, warn};
use url::Url;

use crate::config::BundlerConfig;
use crate::models::{Resource, ResourceKind};
use fetch::ResourceFetcher;

/// Human-readable marker naming where a bundled block came from.
pub fn provenance_comment(resource: &Resource) -> String {
  let source = match resource.url() {
    Some(url) => url.to_string(),
    None => match resource.kind {
      ResourceKind::Css => "in-file style".to_string(),
      ResourceKind::Js => "in-file script".to_string(),
    },
  };
  format!(
    "/***  From {} on {}  ***/\n",
    source.replace("*/", "* /"),
    resource.locator
  )
}

/// Resolves resource bytes and renders bundles for one document.
pub struct BundleSources<'a, F: ?Sized> {
  fetcher: &'a F,
  document_url: Option<Url>,
  inline_origin: String,
}

impl<'a, F: ResourceFetcher + ?Sized> BundleSources<'a, F> {
  /// Sources backed by `fetcher`, resolving relative URLs against the configured document URL.
  pub fn new(fetcher: &'a F, config: &BundlerConfig) -> Self {
    let document_url = config
      .document_url
      .as_deref()
      .and_then(|raw| match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(err) => {
          warn!(url = raw, error = %err, "ignoring unparsable document URL");
          None
        }
      });
    let inline_origin = match &document_url {
      Some(url) => url.to_string(),
      None => format!("{}/", config.cache_url.trim_end_matches('/')),
    };

    Self {
      fetcher,
      document_url,
      inline_origin,
    }
  }

  /// Location a resource's relative references resolve from.
  ///
  /// External resources resolve from their (absolutised) URL; inline stylesheets have no URL of
  /// their own and resolve from the document, or the cache root when the document URL is unknown.
  pub fn location(&self, resource: &Resource) -> String {
    match resource.url() {
      Some(url) => self.absolutize(url),
      None => self.inline_origin.clone(),
    }
  }

  fn absolutize(&self, url: &str) -> String {
    match &self.document_url {
      Some(base) => base
        .join(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string()),
      None => url.to_string(),
    }
  }

  /// Text of a resource. Failed fetches degrade to an empty body.
  pub fn load(&self, resource: &Resource) -> String {
    if let Some(content) = resource.content() {
      return content.to_string();
    }

    let location = self.location(resource);
    match self.fetcher.fetch(&location) {
      Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
      Err(err) => {
        warn!(url = %location, error = %err, "resource unavailable, bundling empty body");
        String::new()
      }
    }
  }

  /// Render the bundle for `kind` from `resources`, which must already be in document order.
  ///
  /// Fetches run in parallel; the output order follows `resources`, not completion order.
  pub fn build(&self, kind: ResourceKind, resources: &[&Resource]) -> String {
    let contents: Vec<String> = resources
      .par_iter()
      .map(|resource| self.load(resource))
      .collect();

    debug!(%kind, count = resources.len(), "assembling bundle");
    match kind {
      ResourceKind::Css => styles::join_css_blocks(
        resources
          .iter()
          .zip(&contents)
          .map(|(resource, content)| {
            styles::render_css_block(resource, content, &self.location(resource))
          })
          .collect(),
      ),
      ResourceKind::Js => scripts::join_js_units(
        resources
          .iter()
          .zip(&contents)
          .map(|(resource, content)| scripts::render_js_unit(resource, content))
          .collect(),
      ),
    }
  }
}
