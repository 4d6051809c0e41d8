use {once_cell::sync::Lazy, regex::Regex};

use parley_channels::format::truncate_with_marker;

/// Snaps are glanced at on a phone; keep replies short.
pub const MAX_CHAT_CHARS: usize = 200;

static HAPPY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(happy|good)\b").expect("happy regex"));
static SAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(sad|bad)\b").expect("sad regex"));
static FIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(fire|hot|cool)\b").expect("fire regex"));

/// Mobile-friendly styling: mood words become emoji, then the text is cut
/// to [`MAX_CHAT_CHARS`]. Replacing the words outright keeps the transform
/// idempotent; a second pass finds nothing left to substitute.
pub fn format_chat(text: &str) -> String {
    let text = HAPPY.replace_all(text, "😊");
    let text = SAD.replace_all(&text, "😢");
    let text = FIRE.replace_all(&text, "🔥");
    truncate_with_marker(&text, MAX_CHAT_CHARS, "...")
}
