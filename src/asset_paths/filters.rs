use regex::Regex;

fn passthrough_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*:").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"^#").expect("invalid fragment regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a `url(...)` reference must be left exactly as written.
///
/// Absolute URLs (any scheme, including `data:`), protocol-relative URLs, fragment-only
/// references and empty values already resolve the same way from any stylesheet location.
pub fn is_passthrough_reference(value: &str) -> bool {
    value.is_empty()
        || passthrough_patterns()
            .iter()
            .any(|pattern| pattern.is_match(value))
}

/// Returns `true` when `value` contains characters that cannot appear in an unquoted `url()`.
pub fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | '\\'))
}
