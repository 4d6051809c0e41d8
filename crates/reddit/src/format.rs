use {once_cell::sync::Lazy, regex::Regex};

use parley_channels::format::truncate_with_marker;

/// Hard cap for one outbound comment, signature included.
pub const MAX_COMMENT_CHARS: usize = 1200;

const TRUNCATION_MARKER: &str = "...\n\n*[truncated]*";

/// Disclosure footer appended to every outbound comment, exactly once.
pub const SIGNATURE: &str = "\n\n---\n*I'm an automated assistant.*";

static EXTRA_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank-line regex"));

/// Normalize a reply for Reddit markdown: collapse runs of blank lines, cut
/// the body so the whole comment fits [`MAX_COMMENT_CHARS`], and append the
/// bot signature. Reapplying is a no-op.
pub fn format_comment(text: &str) -> String {
    let collapsed = EXTRA_BLANK_LINES.replace_all(text, "\n\n");
    let trimmed = collapsed.trim_end();
    let body = trimmed.strip_suffix(SIGNATURE).unwrap_or(trimmed);

    let budget = MAX_COMMENT_CHARS - SIGNATURE.chars().count();
    let body = truncate_with_marker(body, budget, TRUNCATION_MARKER);
    format!("{body}{SIGNATURE}")
}
