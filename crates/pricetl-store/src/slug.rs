use std::sync::LazyLock;

use regex::Regex;

static SLEVA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/sleva/([^/?#]+)").expect("valid slug regex"));

/// Derives the storage slug of a product URL.
///
/// Uses the path component after `/sleva/`, else the last non-empty path
/// segment, else `"unknown"`. The result is always filename-safe.
#[must_use]
pub fn slug_from_url(url: &str) -> String {
    if let Some(slug) = SLEVA_RE.captures(url).and_then(|caps| caps.get(1)) {
        return sanitize_filename(slug.as_str());
    }

    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map_or_else(|| "unknown".to_string(), sanitize_filename)
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_after_sleva_marker() {
        assert_eq!(slug_from_url("https://www.kupi.cz/sleva/banany"), "banany");
        assert_eq!(
            slug_from_url("https://www.kupi.cz/sleva/maslo-250g?src=hp#offers"),
            "maslo-250g"
        );
    }

    #[test]
    fn slug_falls_back_to_last_segment() {
        assert_eq!(
            slug_from_url("https://www.example.cz/akce/mleko/"),
            "mleko"
        );
        assert_eq!(slug_from_url("https://www.example.cz/akce/syr?x=1"), "syr");
    }

    #[test]
    fn slug_of_empty_url_is_unknown() {
        assert_eq!(slug_from_url(""), "unknown");
        assert_eq!(slug_from_url("///"), "unknown");
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("banány:2kg/x"), "ban_ny_2kg_x");
        assert_eq!(sanitize_filename("ok_name-1.0"), "ok_name-1.0");
    }
}
