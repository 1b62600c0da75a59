use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_HINT: &str = "25832";

/// Everything from the first ASCII digit onward; empty when there is none.
///
/// Trailing non-digits are kept, so `"EPSG:4326 (WGS 84)"` yields `"4326 (WGS 84)"`.
/// Unlike a `[0-9].+` pattern, a lone digit (`"7"`) is a hint and newlines are kept.
pub fn extract_query_hint(query: &str) -> String {
    match query.find(|c: char| c.is_ascii_digit()) {
        Some(start) => query[start..].to_string(),
        None => String::new(),
    }
}

fn page_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)projQuery=[^0-9&]*([0-9]*)").expect("page parameter pattern is valid")
    })
}

/// Digit run of the `projQuery` parameter in a page URL or raw query string.
///
/// Non-digits between the `=` and the code are skipped (`projQuery=EPSG:2056`) but the
/// match never runs into the next parameter. An empty digit run counts as absent.
pub fn page_query_hint(url_or_query: &str) -> Option<String> {
    page_param_pattern()
        .captures(url_or_query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|digits| !digits.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupHint {
    pub hint: String,
    /// Whether the hint came from the page URL rather than the default.
    pub from_page: bool,
}

pub fn startup_hint(page_url: Option<&str>, default_hint: &str) -> StartupHint {
    match page_url.and_then(page_query_hint) {
        Some(hint) => StartupHint {
            hint,
            from_page: true,
        },
        None => StartupHint {
            hint: default_hint.to_string(),
            from_page: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code_is_unchanged() {
        assert_eq!(extract_query_hint("25832"), "25832");
        assert_eq!(extract_query_hint(&extract_query_hint("25832")), "25832");
    }

    #[test]
    fn test_no_digits_gives_empty_hint() {
        assert_eq!(extract_query_hint("Pseudo-Mercator"), "");
        assert_eq!(extract_query_hint(""), "");
    }

    #[test]
    fn test_datum_name_digits_count() {
        assert_eq!(extract_query_hint("WGS 84"), "84");
        assert_eq!(extract_query_hint("WGS 84 / Pseudo-Mercator"), "84 / Pseudo-Mercator");
    }

    #[test]
    fn test_first_digit_onward_is_kept() {
        assert_eq!(extract_query_hint("WGS 84 / UTM zone 32N"), "84 / UTM zone 32N");
        assert_eq!(extract_query_hint("EPSG:4326"), "4326");
        assert_eq!(extract_query_hint("7"), "7");
        assert_eq!(extract_query_hint("EPSG:\n2056"), "2056");
        assert_eq!(extract_query_hint("25832\nUTM"), "25832\nUTM");
    }

    #[test]
    fn test_non_ascii_prefix() {
        assert_eq!(extract_query_hint("Système 2154"), "2154");
    }

    #[test]
    fn test_page_query_hint() {
        assert_eq!(
            page_query_hint("https://example.org/?projQuery=2056"),
            Some("2056".to_string())
        );
        assert_eq!(
            page_query_hint("?foo=1&PROJQUERY=EPSG:3035&bar=2"),
            Some("3035".to_string())
        );
        assert_eq!(page_query_hint("?projQuery=&zoom=3"), None);
        assert_eq!(page_query_hint("?projQuery=abc"), None);
        assert_eq!(page_query_hint("https://example.org/"), None);
    }

    #[test]
    fn test_startup_hint_defaults() {
        let from_page = startup_hint(Some("?projQuery=4326"), DEFAULT_HINT);
        assert_eq!(from_page.hint, "4326");
        assert!(from_page.from_page);

        let default = startup_hint(None, DEFAULT_HINT);
        assert_eq!(default.hint, "25832");
        assert!(!default.from_page);
    }
}
