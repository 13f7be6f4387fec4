//! Display shortening for long URLs.
//!
//! Only the display text is shortened; callers keep the full URL as the
//! navigation target. Kept free of crate-internal imports so integration
//! tests can include the module directly.

use std::sync::LazyLock;

use regex::Regex;

/// Display-width budget applied when no explicit limit is given.
pub const DEFAULT_MAX_DISPLAY_CHARS: usize = 50;

/// Institution domain that gets the fixed-form abbreviation.
pub const INSTITUTION_DOMAIN: &str = "udea.edu.co";

static COURSE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"q=(\d+)").expect("course id pattern is valid"));

/// Shorten `url` for display, keeping at most `max_len` characters plus an
/// ellipsis.
///
/// Institution URLs that carry a numeric `q` parameter collapse to a fixed
/// form that preserves the course identifier. Everything else keeps the
/// first `max_len / 2` and last `max_len / 4` characters.
#[must_use]
pub fn shorten(url: &str, max_len: usize) -> String {
    let char_count = url.chars().count();
    if char_count <= max_len {
        return url.to_string();
    }

    if url.contains(INSTITUTION_DOMAIN)
        && let Some(captures) = COURSE_ID_RE.captures(url)
    {
        return format!("https://{INSTITUTION_DOMAIN}/...?q={}", &captures[1]);
    }

    let head: String = url.chars().take(max_len / 2).collect();
    let tail_len = max_len / 4;
    let tail: String = url
        .chars()
        .skip(char_count.saturating_sub(tail_len))
        .collect();
    format!("{head}...{tail}")
}

/// Shorten with the default display budget.
#[must_use]
pub fn shorten_default(url: &str) -> String {
    shorten(url, DEFAULT_MAX_DISPLAY_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_urls_pass_through_unchanged() {
        let url = "https://udea.edu.co/cursos";
        assert_eq!(shorten_default(url), url);

        let exactly_fifty = format!("https://example.com/{}", "a".repeat(31));
        assert_eq!(exactly_fifty.chars().count(), 50);
        assert_eq!(shorten_default(&exactly_fifty), exactly_fifty);
    }

    #[test]
    fn institution_urls_keep_the_course_id() {
        let url = format!(
            "https://portal.udea.edu.co/wps/portal/udea/web/inicio/cursos?{}&q=98765",
            "x".repeat(40)
        );
        let display = shorten_default(&url);
        assert_eq!(display, "https://udea.edu.co/...?q=98765");
        assert!(display.ends_with("98765"));
    }

    #[test]
    fn institution_urls_without_course_id_truncate_generically() {
        let url = format!("https://portal.udea.edu.co/{}", "x".repeat(60));
        let display = shorten_default(&url);
        assert!(display.contains("..."));
        assert_eq!(display.chars().count(), 25 + 3 + 12);
    }

    #[test]
    fn long_urls_keep_head_and_tail() {
        let url = format!("https://example.com/path/{}/final-segment", "y".repeat(50));
        let display = shorten_default(&url);
        let head: String = url.chars().take(25).collect();
        let tail: String = url.chars().skip(url.chars().count() - 12).collect();
        assert_eq!(display, format!("{head}...{tail}"));
    }

    #[test]
    fn custom_budget_is_respected() {
        let url = "https://example.com/abcdefghijklmnopqrstuvwxyz";
        let display = shorten(url, 20);
        // 10 head chars + "..." + 5 tail chars.
        assert_eq!(display.chars().count(), 18);
    }
}
