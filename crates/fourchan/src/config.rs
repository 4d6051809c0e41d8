use serde::{Deserialize, Serialize};

/// Configuration for one imageboard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FourChanConfig {
    /// Boards to monitor, processed in order each tick.
    pub boards: Vec<String>,

    /// Seconds between polling ticks.
    pub poll_interval_secs: u64,

    /// Posts older than this many seconds are dropped by the tick filter.
    pub recency_window_secs: u64,

    /// Minimum seconds between outbound posts (anti-spam spacing).
    pub post_delay_secs: u64,

    /// Upper bound on posts processed per board per tick.
    pub max_batch: usize,

    /// User-Agent for API requests.
    pub user_agent: String,

    /// Poster name the bot signs with; used to skip its own posts and to
    /// detect mentions.
    pub bot_name: String,
}

impl Default for FourChanConfig {
    fn default() -> Self {
        Self {
            boards: vec!["g".into(), "pol".into(), "b".into()],
            poll_interval_secs: 10,
            recency_window_secs: 300,
            post_delay_secs: 30,
            max_batch: 50,
            user_agent: "parley/0.3".into(),
            bot_name: "parley".into(),
        }
    }
}
