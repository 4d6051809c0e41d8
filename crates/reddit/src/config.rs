use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for one Reddit bot session.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    /// Subreddits to monitor, processed in order each tick.
    pub subreddits: Vec<String>,

    /// Seconds between polling ticks.
    pub poll_interval_secs: u64,

    /// Recency window for new submissions (seconds).
    pub submission_window_secs: u64,

    /// Recency window for new comments (seconds). Comments move faster than
    /// submissions, so the window is tighter.
    pub comment_window_secs: u64,

    /// Minimum seconds between outbound comments/replies.
    pub comment_delay_secs: u64,

    /// Upper bound on items processed per subreddit per tick.
    pub max_batch: usize,

    /// Account the bot posts as; self-authored items are skipped.
    pub username: String,

    /// User-Agent for API requests (Reddit requires a descriptive one).
    pub user_agent: String,

    /// OAuth access token for write operations. Reading public listings
    /// needs no credentials.
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,
}

impl std::fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditConfig")
            .field("subreddits", &self.subreddits)
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            subreddits: vec![
                "AskReddit".into(),
                "programming".into(),
                "technology".into(),
            ],
            poll_interval_secs: 30,
            submission_window_secs: 3600,
            comment_window_secs: 1800,
            comment_delay_secs: 5,
            max_batch: 50,
            username: "parleybot".into(),
            user_agent: "parley/0.3 (by /u/parleybot)".into(),
            access_token: Secret::new(String::new()),
        }
    }
}
