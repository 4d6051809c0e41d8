//! Length-limit helpers shared by the adapter `format_response`
//! implementations.

/// Truncate `text` to at most `limit` characters, replacing the tail with
/// `marker` when a cut is needed.
///
/// Counts characters rather than bytes so multi-byte text never splits a
/// code point. Idempotent: output is always ≤ `limit` chars, and input
/// already within the limit passes through unchanged.
pub fn truncate_with_marker(text: &str, limit: usize, marker: &str) -> String {
    let marker_len = marker.chars().count();
    debug_assert!(marker_len < limit);

    let total = text.chars().count();
    if total <= limit {
        return text.to_owned();
    }

    let keep = limit.saturating_sub(marker_len);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(marker);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(truncate_with_marker("hello", 10, "..."), "hello");
    }

    #[test]
    fn long_text_cut_to_limit() {
        let out = truncate_with_marker(&"a".repeat(50), 10, "...");
        assert_eq!(out, format!("{}...", "a".repeat(7)));
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn idempotent_under_reapplication() {
        let once = truncate_with_marker(&"x".repeat(2000), 1000, "...");
        let twice = truncate_with_marker(&once, 1000, "...");
        assert_eq!(once, twice);
    }

    #[test]
    fn multibyte_text_never_splits_a_char() {
        let out = truncate_with_marker(&"é".repeat(20), 10, "...");
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }
}
