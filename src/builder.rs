//! Pipeline orchestrator turning a rendered page into one that references two cached bundles.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, error, info};

use crate::bundle::BundleSources;
use crate::bundle::fetch::{HttpFetcher, ResourceFetcher};
use crate::bundle::store::{CacheStore, FsCacheStore};
use crate::config::BundlerConfig;
use crate::document::{Document, Extraction};
use crate::error::BundleError;
use crate::fingerprint::bundle_key;
use crate::minify::{HtmlMinifier, Minify, Passthrough};
use crate::models::{BundlePlan, Resource, ResourceKind};
use crate::selection::BundleSelection;

/// Generic build result type used across the crate.
pub type BuildResult<T> = Result<T, BundleError>;

/// Extracts, bundles and rewrites CSS and JS resources of rendered HTML documents.
///
/// A builder holds no per-document state, so one instance can serve concurrent requests.
pub struct ConcatBuilder<F = HttpFetcher, S = FsCacheStore> {
  config: BundlerConfig,
  fetcher: F,
  store: S,
  selection: BundleSelection,
  minifier: Box<dyn Minify>,
}

impl ConcatBuilder {
  /// Builder fetching over HTTP and caching in [`BundlerConfig::cache_dir`].
  pub fn new(config: BundlerConfig) -> Self {
    let fetcher = HttpFetcher::from_config(&config);
    let store = FsCacheStore::new(config.cache_dir.clone());
    Self::with_parts(config, fetcher, store)
  }
}

impl<F: ResourceFetcher, S: CacheStore> ConcatBuilder<F, S> {
  /// Builder with an explicit fetcher and cache store.
  pub fn with_parts(config: BundlerConfig, fetcher: F, store: S) -> Self {
    let selection = BundleSelection::from_config(&config);
    let minifier: Box<dyn Minify> = if config.minify_html {
      Box::new(HtmlMinifier)
    } else {
      Box::new(Passthrough)
    };

    Self {
      config,
      fetcher,
      store,
      selection,
      minifier,
    }
  }

  /// Replace the markup minifier.
  pub fn with_minifier(mut self, minifier: impl Minify + 'static) -> Self {
    self.minifier = Box::new(minifier);
    self
  }

  /// Active configuration.
  pub fn config(&self) -> &BundlerConfig {
    &self.config
  }

  /// Backing cache store.
  pub fn store(&self) -> &S {
    &self.store
  }

  /// Transform `html`, falling back to the untouched input when bundles cannot be persisted.
  pub fn process(&self, html: &str) -> String {
    match self.try_process(html) {
      Ok(output) => output,
      Err(err) => {
        error!(error = %err, "bundling failed, returning original document");
        html.to_string()
      }
    }
  }

  /// Transform `html`, reporting fatal failures instead of falling back.
  pub fn try_process(&self, html: &str) -> BuildResult<String> {
    let document = Document::parse(html);
    let extraction = document.extract(&self.selection);
    if extraction.is_empty() {
      debug!("no bundlable resources found");
      return Ok(self.minifier.minify(html));
    }

    let plans = self.plan(&extraction);
    self.materialize(&plans, &extraction)?;

    let [css, js] = &plans;
    document.detach_all(&extraction.removals);
    document.inject_bundle_tags(
      &self.config.bundle_url(&css.key.file_name()),
      &self.config.bundle_url(&js.key.file_name()),
    );
    let serialized = document.to_html().map_err(BundleError::Serialize)?;
    Ok(self.minifier.minify(&serialized))
  }

  /// Rewrite a rendered HTML file in place. Returns `true` when its contents changed.
  pub fn process_file(&self, path: &Path) -> anyhow::Result<bool> {
    let html =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let output = self
      .try_process(&html)
      .with_context(|| format!("failed to bundle {}", path.display()))?;
    if output == html {
      return Ok(false);
    }

    fs::write(path, &output).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "rewrote document");
    Ok(true)
  }

  /// Compute both bundle keys and whether each cache entry still has to be written.
  pub fn plan(&self, extraction: &Extraction) -> [BundlePlan; 2] {
    ResourceKind::ALL.map(|kind| {
      let key = bundle_key(kind, &extraction.resources);
      let needed = !self.store.exists(&key.file_name());
      debug!(
        %kind,
        resources = extraction.of_kind(kind).count(),
        bundle = %key,
        cached = !needed,
        "planned bundle"
      );
      BundlePlan { key, needed }
    })
  }

  fn materialize(&self, plans: &[BundlePlan], extraction: &Extraction) -> BuildResult<()> {
    if plans.iter().all(|plan| !plan.needed) {
      return Ok(());
    }

    let sources = BundleSources::new(&self.fetcher, &self.config);
    for plan in plans {
      // A cached kind only skips its own build; the other kind is still produced.
      if !plan.needed {
        continue;
      }

      let resources: Vec<&Resource> = extraction.of_kind(plan.key.kind).collect();
      let bundle = sources.build(plan.key.kind, &resources);
      let file_name = plan.key.file_name();
      self.store.write_atomic(&file_name, bundle.as_bytes())?;
      info!(bundle = %file_name, bytes = bundle.len(), "wrote bundle");
    }
    Ok(())
  }
}
