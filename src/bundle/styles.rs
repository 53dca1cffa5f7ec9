//! Stylesheet assembly for the CSS bundle.

use regex::Regex;

use super::provenance_comment;
use crate::asset_paths::rewrite_css_urls;
use crate::models::Resource;

const BLOCK_SEPARATOR: &str = "\n\n";

fn charset_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)\A\s*@charset\s+["'][^"']*["']\s*;"#).expect("invalid charset regex")
  })
}

/// Render one stylesheet as a provenance-annotated `@media` block.
///
/// `origin` is where relative references in `content` were originally resolved from. A leading
/// `@charset` rule is dropped because it is only valid at the very start of a file.
pub fn render_css_block(resource: &Resource, content: &str, origin: &str) -> String {
  let body = charset_pattern().replace(content, "");
  let body = rewrite_css_urls(origin, &body);
  format!(
    "{}@media {} {{\n{}\n}}",
    provenance_comment(resource),
    resource.media_or_default(),
    body
  )
}

/// Join rendered blocks into the final bundle text.
pub fn join_css_blocks(blocks: Vec<String>) -> String {
  blocks.join(BLOCK_SEPARATOR)
}
