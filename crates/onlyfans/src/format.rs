use {once_cell::sync::Lazy, regex::Regex};

use parley_channels::format::truncate_with_marker;

/// Keep DMs conversational; anything longer reads like a form letter.
pub const MAX_DM_CHARS: usize = 300;

// The optional trailing group is the idempotence guard: a word that already
// carries its emoji is left untouched on a second pass. Single-scalar emoji
// only, so char-based truncation can never split one.
static THANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(thank you|thanks)\b( 💕)?").expect("thanks regex"));
static HEART: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(love|like)\b( ❤)?").expect("heart regex"));
static SPARKLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(new|latest)\b( ✨)?").expect("sparkle regex"));

// A truncation cut can land right after a mood word whose emoji got sliced
// off; left bare it would grow the emoji back on the next pass.
static EXPOSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(thank you|thanks|love|like|new|latest) ?\.\.\.$").expect("exposed regex")
});

fn append_emoji(re: &Regex, text: &str, emoji: char) -> String {
    re.replace_all(text, |caps: &regex::Captures| match caps.get(2) {
        Some(_) => caps[0].to_string(),
        None => format!("{} {emoji}", &caps[1]),
    })
    .into_owned()
}

/// Warm creator tone: affection emoji after key words, cut to
/// [`MAX_DM_CHARS`]. Reapplying the transform is a no-op.
pub fn format_dm(text: &str) -> String {
    let text = THANKS.replace_all(text, |caps: &regex::Captures| match caps.get(2) {
        Some(_) => caps[0].to_string(),
        None => "thank you 💕".to_owned(),
    });
    let text = append_emoji(&HEART, &text, '❤');
    let text = append_emoji(&SPARKLE, &text, '✨');

    let truncated = text.chars().count() > MAX_DM_CHARS;
    let out = truncate_with_marker(&text, MAX_DM_CHARS, "...");
    if truncated {
        EXPOSED.replace(&out, "...").into_owned()
    } else {
        out
    }
}
