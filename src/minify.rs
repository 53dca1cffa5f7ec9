//! Best-effort textual compaction of the final markup.
//!
//! This is not an HTML parser. The transform only removes whitespace and comments outside of
//! raw-text regions (`<pre>`, `<textarea>`, `<script>`, `<style>`) and conditional comments,
//! and every step is written so that a second pass over its own output changes nothing.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Narrow interface for the markup minifier so hosts can swap or disable it.
pub trait Minify: Send + Sync {
  /// Return a compacted version of `html`.
  fn minify(&self, html: &str) -> String;
}

/// Identity transform used when minification is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Minify for Passthrough {
  fn minify(&self, html: &str) -> String {
    html.to_string()
  }
}

/// Regex-driven HTML minifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMinifier;

impl Minify for HtmlMinifier {
  fn minify(&self, html: &str) -> String {
    minify_html(html)
  }
}

fn raw_region_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r"(?is)<!--\[if\b.*?<!\[endif\]-->|<pre\b.*?</pre\s*>|<textarea\b.*?</textarea\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>",
    )
    .expect("invalid raw region regex")
  })
}

fn comment_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"))
}

fn whitespace_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
}

fn void_element_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)<(img|input)(\s[^<>]*?)?\s*/>").expect("invalid void element regex")
  })
}

fn tag_close_space_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(<[a-zA-Z][^<>]*?)\s*(/?)\s*>").expect("invalid tag close regex")
  })
}

fn style_attribute_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)(<[a-z][^<>]*?\sstyle=)(?:"([^"]*)"|'([^']*)')"#)
      .expect("invalid style attribute regex")
  })
}

fn css_punctuation_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\s*([:;,{}])\s*").expect("invalid css punctuation regex"))
}

/// Minify a complete HTML document.
pub fn minify_html(html: &str) -> String {
  if html.trim().is_empty() {
    return html.to_string();
  }

  let html = html.replace('\r', "");
  let mut output = String::with_capacity(html.len());
  let mut cursor = 0;
  for region in raw_region_pattern().find_iter(&html) {
    let segment = &html[cursor..region.start()];
    output.push_str(&compact_segment(segment, cursor == 0, false));
    output.push_str(region.as_str());
    cursor = region.end();
  }
  output.push_str(&compact_segment(&html[cursor..], cursor == 0, true));

  output.trim().to_string()
}

/// Compact whitespace inside an inline `style` attribute value.
pub fn minify_inline_css(css: &str) -> String {
  let collapsed = whitespace_pattern().replace_all(css.trim(), " ");
  let tightened = css_punctuation_pattern().replace_all(&collapsed, "$1");
  tightened.trim_end_matches(';').to_string()
}

/// Compact a region of markup that holds no raw-text elements.
///
/// `at_start`/`at_end` tell whether the region touches the document edges; otherwise it is
/// bordered by a raw region, which always starts with `<` and ends with `>`.
fn compact_segment(segment: &str, at_start: bool, at_end: bool) -> String {
  // Removing one comment can join the text around it into another.
  let mut without_comments = segment.to_string();
  loop {
    let stripped = comment_pattern().replace_all(&without_comments, "").into_owned();
    if stripped == without_comments {
      break;
    }
    without_comments = stripped;
  }

  let with_styles = style_attribute_pattern().replace_all(&without_comments, |caps: &Captures<'_>| {
    match (caps.get(2), caps.get(3)) {
      (Some(value), _) => format!("{}\"{}\"", &caps[1], minify_inline_css(value.as_str())),
      (_, Some(value)) => format!("{}'{}'", &caps[1], minify_inline_css(value.as_str())),
      _ => caps[0].to_string(),
    }
  });
  let text: &str = &with_styles;

  let collapsed = whitespace_pattern().replace_all(text, |caps: &Captures<'_>| {
    let Some(run) = caps.get(0) else {
      return String::new();
    };
    let before = text[..run.start()]
      .chars()
      .next_back()
      .or((!at_start).then_some('>'));
    let after = text[run.end()..]
      .chars()
      .next()
      .or((!at_end).then_some('<'));

    let between_tags = before == Some('>') && after == Some('<');
    let is_break = run.as_str().contains('\n') || run.as_str().len() > 1;
    if between_tags && is_break {
      String::new()
    } else {
      " ".to_string()
    }
  });

  // Void elements are normalised last, once the spaces around a trailing `/` are gone.
  let trimmed = tag_close_space_pattern().replace_all(&collapsed, "$1$2>");
  void_element_pattern()
    .replace_all(&trimmed, "<$1$2>")
    .into_owned()
}
