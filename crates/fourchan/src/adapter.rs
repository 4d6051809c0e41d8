use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use {
    async_trait::async_trait,
    chrono::{DateTime, TimeZone, Utc},
    once_cell::sync::Lazy,
    regex::Regex,
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use {
    parley_channels::{
        AdapterSession, ChannelAdapter, ConnectionState, MessageSink, RateGate,
        poll::{spawn_poll_loop, within_window},
    },
    parley_common::{Error, Message, Result},
};

use crate::{
    client::{BoardClient, BoardPost},
    config::FourChanConfig,
    format,
};

/// Keywords that make a post on the technology board worth answering even
/// without a direct mention.
static TECH_TOPICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(programming|linux|ai|code)\b").expect("tech regex"));

/// Option schema for `send_message`.
#[derive(Debug, Deserialize)]
struct SendOptions {
    board: String,
    thread_id: u64,
    content: String,
}

/// Polling adapter for the imageboard.
pub struct FourChanAdapter {
    session: Arc<AdapterSession>,
    client: Arc<dyn BoardClient>,
    config: RwLock<FourChanConfig>,
    gate: RwLock<Option<Arc<RateGate>>>,
}

impl FourChanAdapter {
    pub fn new(client: Arc<dyn BoardClient>) -> Self {
        Self {
            session: Arc::new(AdapterSession::new("fourchan")),
            client,
            config: RwLock::new(FourChanConfig::default()),
            gate: RwLock::new(None),
        }
    }

    fn start_listening(&self) {
        let cfg = self.config.read().unwrap().clone();
        let interval = Duration::from_secs(cfg.poll_interval_secs);
        let cancel = self.session.begin_listening();
        let session = Arc::clone(&self.session);
        let client = Arc::clone(&self.client);

        spawn_poll_loop("fourchan", interval, cancel, move || {
            let session = Arc::clone(&session);
            let client = Arc::clone(&client);
            let cfg = cfg.clone();
            async move {
                for board in &cfg.boards {
                    poll_board(client.as_ref(), &session, &cfg, board).await;
                }
            }
        });
    }

    async fn post(&self, board: &str, thread_no: u64, body: &str) -> Result<()> {
        if !self.session.is_connected() {
            debug!(board, "skipping post: not connected");
            return Ok(());
        }
        let gate = self.gate.read().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await;
        }
        self.client.submit_post(board, thread_no, body).await
    }
}

#[async_trait]
impl ChannelAdapter for FourChanAdapter {
    fn id(&self) -> &str {
        "fourchan"
    }

    async fn connect(&self, config: serde_json::Value) -> Result<()> {
        self.session.set_state(ConnectionState::Connecting);
        let cfg: FourChanConfig = serde_json::from_value(config).map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("invalid fourchan config: {e}"))
        })?;
        *self.gate.write().unwrap() =
            Some(Arc::new(RateGate::new(Duration::from_secs(cfg.post_delay_secs))));
        info!(boards = ?cfg.boards, "fourchan adapter connected");
        *self.config.write().unwrap() = cfg;
        self.session.set_state(ConnectionState::Connected);
        Ok(())
    }

    fn on_message(&self, sink: Arc<dyn MessageSink>) {
        self.session.register_sink(sink);
        if self.session.is_connected() {
            self.start_listening();
        }
    }

    async fn send_message(&self, options: serde_json::Value) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        let opts: SendOptions = serde_json::from_value(options)?;
        self.post(&opts.board, opts.thread_id, &opts.content).await
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        let board = original
            .data_str("board")
            .ok_or_else(|| Error::adapter_internal("fourchan", "reply target missing board"))?
            .to_owned();
        let thread_no = original
            .data_i64("thread_id")
            .ok_or_else(|| Error::adapter_internal("fourchan", "reply target missing thread_id"))?
            as u64;
        let post_no = original
            .data_i64("post_id")
            .ok_or_else(|| Error::adapter_internal("fourchan", "reply target missing post_id"))?;

        let body = format!(">>{post_no}\n{content}");
        self.post(&board, thread_no, &body).await
    }

    fn format_response(&self, text: &str) -> String {
        format::format_post(text)
    }

    fn should_respond(&self, message: &Message) -> bool {
        let cfg = self.config.read().unwrap();
        let content = message.content.to_lowercase();

        if content.contains(&cfg.bot_name.to_lowercase()) || content.contains("bot") {
            return true;
        }
        if message.mentions_bot() {
            return true;
        }
        // Topical posts on the technology board are fair game.
        message.data_str("board") == Some("g") && TECH_TOPICS.is_match(&content)
    }

    async fn disconnect(&self) {
        self.session.shut_down();
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

/// One board's share of a tick. A failed fetch is logged and skipped; the
/// remaining boards still run.
async fn poll_board(
    client: &dyn BoardClient,
    session: &AdapterSession,
    cfg: &FourChanConfig,
    board: &str,
) {
    let posts = match client.recent_posts(board).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(board, error = %e, "board fetch failed, skipping this tick");
            return;
        }
    };

    let window = Duration::from_secs(cfg.recency_window_secs);
    let mut delivered = 0usize;
    for post in posts {
        if delivered >= cfg.max_batch {
            debug!(board, max_batch = cfg.max_batch, "batch bound reached");
            break;
        }
        if post.name.eq_ignore_ascii_case(&cfg.bot_name) {
            continue;
        }
        let Some(timestamp) = post_time(&post) else {
            continue;
        };
        if !within_window(timestamp, window) {
            continue;
        }
        session.deliver(decode_post(board, &post, timestamp, &cfg.bot_name)).await;
        delivered += 1;
    }
}

fn post_time(post: &BoardPost) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(post.time, 0).single()
}

fn decode_post(
    board: &str,
    post: &BoardPost,
    timestamp: DateTime<Utc>,
    bot_name: &str,
) -> Message {
    let mentions = post
        .comment
        .to_lowercase()
        .contains(&bot_name.to_lowercase());
    Message::new(
        post.comment.clone(),
        post.no.to_string(),
        format!("/{board}/"),
        timestamp,
    )
    .with_data(serde_json::json!({
        "from_bot": false,
        "mentions_bot": mentions,
        "direct_message": false,
        "board": board,
        "thread_id": post.thread_no,
        "post_id": post.no,
        "is_op": post.is_op(),
    }))
}
