use regex::Regex;

fn authority_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*:)?//[^/?#]*").expect("invalid authority regex")
    })
}

/// Directory portion of a resource location.
///
/// Query strings and fragments are dropped first so a `?ver=1/2` suffix cannot masquerade as a
/// path segment. A bare origin such as `https://example.com` is its own directory.
pub fn directory_of(location: &str) -> &str {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let authority_len = authority_pattern()
        .find(path)
        .map_or(0, |found| found.end());

    match path[authority_len..].rfind('/') {
        Some(index) => &path[..authority_len + index],
        None if authority_len > 0 => &path[..authority_len],
        None => "",
    }
}

/// Resolve `reference` against `directory` using POSIX segment rules.
///
/// `.` segments are dropped and `..` pops one segment, never climbing above the origin
/// (`scheme://host` or a protocol-relative `//host`) or the root. A root-relative reference restarts from that origin. Relative
/// directories are treated as rooted, so the result is always absolute or rooted and resolving
/// it again against the same directory returns it unchanged.
pub fn resolve_segments(directory: &str, reference: &str) -> String {
    let (origin, base_path) = match authority_pattern().find(directory) {
        Some(found) => (found.as_str(), &directory[found.end()..]),
        None => ("", directory),
    };

    let split_at = reference.find(['?', '#']).unwrap_or(reference.len());
    let (reference_path, suffix) = reference.split_at(split_at);

    let mut stack: Vec<&str> = Vec::new();
    let relative = match reference_path.strip_prefix('/') {
        Some(rooted) => rooted,
        None => {
            stack.extend(base_path.split('/').filter(|segment| !segment.is_empty()));
            reference_path
        }
    };

    for segment in relative.split('/') {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    format!("{origin}/{}{suffix}", stack.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_strips_file_name_and_query() {
        assert_eq!(
            directory_of("https://example.com/assets/theme/style.css?ver=5.2"),
            "https://example.com/assets/theme"
        );
        assert_eq!(directory_of("/wp-content/style.css"), "/wp-content");
        assert_eq!(directory_of("https://example.com"), "https://example.com");
        assert_eq!(directory_of("style.css"), "");
    }

    #[test]
    fn climbs_parent_directories() {
        assert_eq!(
            resolve_segments("https://example.com/assets/theme", "../img/bg.png"),
            "https://example.com/assets/img/bg.png"
        );
    }

    #[test]
    fn ignores_current_directory_segments() {
        assert_eq!(
            resolve_segments("/themes/base", "./fonts/./a.woff2"),
            "/themes/base/fonts/a.woff2"
        );
    }

    #[test]
    fn never_climbs_above_origin() {
        assert_eq!(
            resolve_segments("https://example.com/a", "../../../x.png"),
            "https://example.com/x.png"
        );
        assert_eq!(resolve_segments("/a", "../../x.png"), "/x.png");
    }

    #[test]
    fn root_relative_references_keep_the_origin_host() {
        assert_eq!(
            resolve_segments("https://cdn.example.com/css", "/img/a.png"),
            "https://cdn.example.com/img/a.png"
        );
        assert_eq!(resolve_segments("/css", "/img/a.png"), "/img/a.png");
    }

    #[test]
    fn protocol_relative_origins_keep_their_host() {
        assert_eq!(
            directory_of("//cdn.example.com/lib/css/fa.css"),
            "//cdn.example.com/lib/css"
        );
        assert_eq!(
            resolve_segments("//cdn.example.com/lib/css", "../fonts/fa.woff"),
            "//cdn.example.com/lib/fonts/fa.woff"
        );
        assert_eq!(
            resolve_segments("//cdn.example.com/lib/css", "/img/a.png"),
            "//cdn.example.com/img/a.png"
        );
    }

    #[test]
    fn relative_directories_are_rooted() {
        assert_eq!(resolve_segments("css", "../a.png"), "/a.png");
        assert_eq!(resolve_segments("", "a.png"), "/a.png");
    }

    #[test]
    fn keeps_query_and_fragment_suffixes() {
        assert_eq!(
            resolve_segments("/css", "../font.svg?v=1#icons"),
            "/font.svg?v=1#icons"
        );
    }
}
