use regex::{Captures, Regex};

use super::{directory_of, is_passthrough_reference, needs_quoting, resolve_segments};

fn css_url_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\burl\(([^)]*)\)").expect("invalid css url regex"))
}

/// Rewrite relative `url(...)` references in `css` so they resolve from any bundle location.
///
/// `origin` is the location the stylesheet was originally served from. Rewritten references lose
/// their quotes; references that are absolute, `data:` URIs, or would need quoting are left
/// byte-for-byte as written.
pub fn rewrite_css_urls(origin: &str, css: &str) -> String {
    let directory = directory_of(origin);
    css_url_pattern()
        .replace_all(css, |caps: &Captures<'_>| {
            let value = caps[1]
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'');
            if is_passthrough_reference(value) || needs_quoting(value) {
                caps[0].to_string()
            } else {
                format!("url({})", resolve_segments(directory, value))
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://example.com/assets/theme/style.css";

    #[test]
    fn resolves_parent_references_against_origin() {
        let css = "body { background: url(../img/bg.png) no-repeat; }";
        assert_eq!(
            rewrite_css_urls(ORIGIN, css),
            "body { background: url(https://example.com/assets/img/bg.png) no-repeat; }"
        );
    }

    #[test]
    fn leaves_absolute_and_data_urls_untouched() {
        let css = "a{background:url(http://other.com/x.png)}b{background:url(data:image/png;base64,AAA=)}";
        assert_eq!(rewrite_css_urls(ORIGIN, css), css);
    }

    #[test]
    fn strips_quotes_from_rewritten_references() {
        let css = r#"@font-face{src:url("fonts/a.woff2") format("woff2"),url( 'fonts/a.woff' )}"#;
        assert_eq!(
            rewrite_css_urls(ORIGIN, css),
            "@font-face{src:url(https://example.com/assets/theme/fonts/a.woff2) format(\"woff2\"),url(https://example.com/assets/theme/fonts/a.woff)}"
        );
    }

    #[test]
    fn keeps_quoted_absolute_urls_verbatim() {
        let css = r#"a{background:url("https://cdn.example.com/a.png")}"#;
        assert_eq!(rewrite_css_urls(ORIGIN, css), css);
    }

    #[test]
    fn is_idempotent() {
        let css = ".x{background:url(../img/a.png)}.y{background:url(/img/b.png)}";
        let once = rewrite_css_urls(ORIGIN, css);
        assert_eq!(rewrite_css_urls(ORIGIN, &once), once);

        let rooted = rewrite_css_urls("/concat_all_cache/", css);
        assert_eq!(rewrite_css_urls("/concat_all_cache/", &rooted), rooted);
    }

    #[test]
    fn protocol_relative_stylesheets_keep_the_cdn_host() {
        let origin = "//cdn.example.com/lib/css/fa.css";
        let once = rewrite_css_urls(origin, ".i{src:url(../fonts/fa.woff)}");
        assert_eq!(once, ".i{src:url(//cdn.example.com/lib/fonts/fa.woff)}");
        assert_eq!(rewrite_css_urls(origin, &once), once);
    }

    #[test]
    fn leaves_ambiguous_references_alone() {
        let css = "a{background:url(my image.png)}";
        assert_eq!(rewrite_css_urls(ORIGIN, css), css);
    }
}
