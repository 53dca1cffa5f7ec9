//! Data structures derived from a document while preparing its bundles.

use std::fmt;

/// Kind of asset a [`Resource`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  /// Stylesheet from `<link rel="stylesheet">` or `<style>`.
  Css,
  /// Script from `<script>`.
  Js,
}

impl ResourceKind {
  /// Both kinds, in the order their bundle tags are injected.
  pub const ALL: [ResourceKind; 2] = [ResourceKind::Css, ResourceKind::Js];

  /// File extension of the bundle for this kind.
  pub fn extension(self) -> &'static str {
    match self {
      Self::Css => "css",
      Self::Js => "js",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

/// Where the bytes of a [`Resource`] come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOrigin {
  /// Text embedded in the document, already trimmed.
  Inline {
    /// Raw element text.
    content: String,
  },
  /// A URL referenced by `href` or `src`.
  External {
    /// Attribute value exactly as written in the document.
    url: String,
  },
}

/// One CSS or JS unit discovered in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
  /// Asset kind.
  pub kind: ResourceKind,
  /// Inline text or external URL.
  pub origin: ResourceOrigin,
  /// Content fingerprint, see [`crate::fingerprint::identity`].
  pub identity: String,
  /// Media query for stylesheets; always `None` for scripts.
  pub media: Option<String>,
  /// Position of the source tag in the original tree, e.g. `/html/head/style[2]`.
  pub locator: String,
}

impl Resource {
  /// URL of an external resource.
  pub fn url(&self) -> Option<&str> {
    match &self.origin {
      ResourceOrigin::External { url } => Some(url),
      ResourceOrigin::Inline { .. } => None,
    }
  }

  /// Embedded text of an inline resource.
  pub fn content(&self) -> Option<&str> {
    match &self.origin {
      ResourceOrigin::Inline { content } => Some(content),
      ResourceOrigin::External { .. } => None,
    }
  }

  /// Returns `true` for resources that must be fetched.
  pub fn is_external(&self) -> bool {
    matches!(self.origin, ResourceOrigin::External { .. })
  }

  /// Media query to wrap a stylesheet in.
  pub fn media_or_default(&self) -> &str {
    self.media.as_deref().unwrap_or("all")
  }
}

/// Content-derived name of one bundle; doubles as the cache file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleKey {
  /// Kind of resources the bundle concatenates.
  pub kind: ResourceKind,
  /// Hex digest over the ordered resource identities.
  pub digest: String,
}

impl BundleKey {
  /// Cache file name, `<digest>.<ext>`.
  pub fn file_name(&self) -> String {
    format!("{}.{}", self.digest, self.kind.extension())
  }
}

impl fmt::Display for BundleKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.file_name())
  }
}

/// Per-kind outcome of the cache lookup for one document.
#[derive(Debug, Clone)]
pub struct BundlePlan {
  /// Key of the bundle.
  pub key: BundleKey,
  /// Whether the cache file is missing and must be built.
  pub needed: bool,
}
