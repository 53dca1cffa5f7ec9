//! Filters deciding which external resources are folded into bundles.

use std::collections::BTreeSet;

use crate::config::BundlerConfig;
use crate::models::ResourceKind;

/// Trait describing which external resources may be bundled.
pub trait ResourceFilter {
  /// Returns `true` when the resource at `url` should be extracted into a bundle.
  fn is_included(&self, url: &str) -> bool;
}

/// Default selection: skips references to existing bundles and configured exclusions.
///
/// Leaving bundle references in place is what makes an already processed document a fixed
/// point: a second pass finds nothing to extract and returns the markup unchanged.
#[derive(Debug, Clone, Default)]
pub struct BundleSelection {
  bundle_prefix: Option<String>,
  exclude: BTreeSet<String>,
}

impl BundleSelection {
  /// Selection derived from the bundler configuration.
  pub fn from_config(config: &BundlerConfig) -> Self {
    Self {
      bundle_prefix: Some(format!("{}/", config.cache_url.trim_end_matches('/'))),
      exclude: normalise_list(config.exclude.iter().cloned()),
    }
  }

  /// Determine whether an external resource should be bundled.
  pub fn is_included(&self, url: &str) -> bool {
    if self.is_bundle_reference(url) {
      return false;
    }

    !self
      .exclude
      .iter()
      .any(|fragment| url.contains(fragment.as_str()))
  }

  /// Whether `url` names a bundle this crate wrote, `<cache_url>/<hex digest>.<css|js>`.
  pub fn is_bundle_reference(&self, url: &str) -> bool {
    let Some(prefix) = &self.bundle_prefix else {
      return false;
    };
    let Some(file_name) = url.strip_prefix(prefix.as_str()) else {
      return false;
    };

    ResourceKind::ALL.iter().any(|kind| {
      file_name
        .strip_suffix(kind.extension())
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|digest| !digest.is_empty() && digest.chars().all(|c| c.is_ascii_hexdigit()))
    })
  }

  /// Returns true when no filtering rules are active.
  #[cfg(test)]
  fn is_unfiltered(&self) -> bool {
    self.bundle_prefix.is_none() && self.exclude.is_empty()
  }
}

impl ResourceFilter for BundleSelection {
  fn is_included(&self, url: &str) -> bool {
    BundleSelection::is_included(self, url)
  }
}

/// Convert a list of raw fragments into a sorted, de-duplicated set.
///
/// Values are trimmed and empty entries are discarded, since an empty fragment would match
/// every URL.
fn normalise_list(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
    .collect()
}
