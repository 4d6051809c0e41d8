use {once_cell::sync::Lazy, regex::Regex};

use parley_channels::format::truncate_with_marker;

/// Hard cap for one post body.
pub const MAX_POST_CHARS: usize = 1000;

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*] (.+)$").expect("bullet regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));

/// Rewrite a reply for the board: bullets become greentext quotes, markdown
/// emphasis is stripped (the board renders none of it), and the result is
/// cut to [`MAX_POST_CHARS`].
pub fn format_post(text: &str) -> String {
    let text = BULLET.replace_all(text, "> $1");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    truncate_with_marker(&text, MAX_POST_CHARS, "...")
}
