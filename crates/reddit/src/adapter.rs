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
    client::{Comment, RedditClient, Submission},
    config::RedditConfig,
    format,
};

static HELP_TOPICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(help|question|bug|error|code)\b").expect("help regex"));
static AI_TOPICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(ai|artificial intelligence|bot)\b").expect("ai regex"));
static TECH_TOPICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(ai|machine learning|automation)\b").expect("tech regex"));

/// Option schema for `send_message`, dispatching on `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SendOptions {
    Comment {
        submission_id: String,
        content: String,
    },
    Reply {
        comment_id: String,
        content: String,
    },
    Pm {
        username: String,
        subject: String,
        content: String,
    },
}

/// Polling adapter for Reddit.
pub struct RedditAdapter {
    session: Arc<AdapterSession>,
    client: Arc<dyn RedditClient>,
    config: RwLock<RedditConfig>,
    gate: RwLock<Option<Arc<RateGate>>>,
}

impl RedditAdapter {
    pub fn new(client: Arc<dyn RedditClient>) -> Self {
        Self {
            session: Arc::new(AdapterSession::new("reddit")),
            client,
            config: RwLock::new(RedditConfig::default()),
            gate: RwLock::new(None),
        }
    }

    fn start_listening(&self) {
        let cfg = self.config.read().unwrap().clone();
        let interval = Duration::from_secs(cfg.poll_interval_secs);
        let cancel = self.session.begin_listening();
        let session = Arc::clone(&self.session);
        let client = Arc::clone(&self.client);

        spawn_poll_loop("reddit", interval, cancel, move || {
            let session = Arc::clone(&session);
            let client = Arc::clone(&client);
            let cfg = cfg.clone();
            async move {
                for subreddit in &cfg.subreddits {
                    poll_subreddit(client.as_ref(), &session, &cfg, subreddit).await;
                }
            }
        });
    }

    async fn rate_limited<F, Fut>(&self, op: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if !self.session.is_connected() {
            debug!("skipping reddit send: not connected");
            return Ok(());
        }
        let gate = self.gate.read().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await;
        }
        op().await
    }
}

#[async_trait]
impl ChannelAdapter for RedditAdapter {
    fn id(&self) -> &str {
        "reddit"
    }

    async fn connect(&self, config: serde_json::Value) -> Result<()> {
        self.session.set_state(ConnectionState::Connecting);
        let cfg: RedditConfig = serde_json::from_value(config).map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("invalid reddit config: {e}"))
        })?;
        *self.gate.write().unwrap() = Some(Arc::new(RateGate::new(Duration::from_secs(
            cfg.comment_delay_secs,
        ))));
        info!(subreddits = ?cfg.subreddits, username = %cfg.username, "reddit adapter connected");
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
        let client = Arc::clone(&self.client);
        match opts {
            SendOptions::Comment {
                submission_id,
                content,
            } => {
                self.rate_limited(|| async move { client.comment_on(&submission_id, &content).await })
                    .await
            }
            SendOptions::Reply {
                comment_id,
                content,
            } => {
                self.rate_limited(|| async move { client.reply_to(&comment_id, &content).await })
                    .await
            }
            SendOptions::Pm {
                username,
                subject,
                content,
            } => {
                self.rate_limited(
                    || async move { client.private_message(&username, &subject, &content).await },
                )
                .await
            }
        }
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        let client = Arc::clone(&self.client);
        match original.data_str("kind") {
            Some("comment") => {
                let comment_id = original
                    .data_str("comment_id")
                    .ok_or_else(|| {
                        Error::adapter_internal("reddit", "reply target missing comment_id")
                    })?
                    .to_owned();
                let content = content.to_owned();
                self.rate_limited(|| async move { client.reply_to(&comment_id, &content).await })
                    .await
            }
            Some("submission") => {
                let submission_id = original
                    .data_str("submission_id")
                    .ok_or_else(|| {
                        Error::adapter_internal("reddit", "reply target missing submission_id")
                    })?
                    .to_owned();
                let content = content.to_owned();
                self.rate_limited(
                    || async move { client.comment_on(&submission_id, &content).await },
                )
                .await
            }
            other => Err(Error::adapter_internal(
                "reddit",
                format!("unknown reply target kind: {other:?}"),
            )),
        }
    }

    fn format_response(&self, text: &str) -> String {
        format::format_comment(text)
    }

    fn should_respond(&self, message: &Message) -> bool {
        let cfg = self.config.read().unwrap();
        let content = message.content.to_lowercase();
        let handle = format!("u/{}", cfg.username.to_lowercase());

        // Covers both "u/name" and "/u/name" spellings.
        if content.contains(&handle) {
            return true;
        }

        let matched = match message.data_str("subreddit") {
            Some("programming") | Some("learnprogramming") => HELP_TOPICS.is_match(&content),
            Some("AskReddit") => AI_TOPICS.is_match(&content),
            Some("technology") => TECH_TOPICS.is_match(&content),
            _ => false,
        };
        matched || message.is_direct_message()
    }

    async fn disconnect(&self) {
        self.session.shut_down();
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

/// One subreddit's share of a tick: new submissions first, then new
/// comments, each kind against its own recency window. A failed fetch skips
/// only that listing.
async fn poll_subreddit(
    client: &dyn RedditClient,
    session: &AdapterSession,
    cfg: &RedditConfig,
    subreddit: &str,
) {
    match client.new_submissions(subreddit).await {
        Ok(submissions) => {
            let window = Duration::from_secs(cfg.submission_window_secs);
            let mut delivered = 0usize;
            for submission in submissions {
                if delivered >= cfg.max_batch {
                    break;
                }
                if submission.author.eq_ignore_ascii_case(&cfg.username) {
                    continue;
                }
                let Some(ts) = event_time(submission.created_utc) else {
                    continue;
                };
                if !within_window(ts, window) {
                    continue;
                }
                session
                    .deliver(decode_submission(&submission, subreddit, ts, &cfg.username))
                    .await;
                delivered += 1;
            }
        }
        Err(e) => warn!(subreddit, error = %e, "submission fetch failed"),
    }

    match client.new_comments(subreddit).await {
        Ok(comments) => {
            let window = Duration::from_secs(cfg.comment_window_secs);
            let mut delivered = 0usize;
            for comment in comments {
                if delivered >= cfg.max_batch {
                    break;
                }
                if comment.author.eq_ignore_ascii_case(&cfg.username) {
                    continue;
                }
                let Some(ts) = event_time(comment.created_utc) else {
                    continue;
                };
                if !within_window(ts, window) {
                    continue;
                }
                session
                    .deliver(decode_comment(&comment, subreddit, ts, &cfg.username))
                    .await;
                delivered += 1;
            }
        }
        Err(e) => warn!(subreddit, error = %e, "comment fetch failed"),
    }
}

fn event_time(created_utc: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(created_utc, 0).single()
}

fn decode_submission(
    submission: &Submission,
    subreddit: &str,
    timestamp: DateTime<Utc>,
    username: &str,
) -> Message {
    let content = format!("{}\n\n{}", submission.title, submission.selftext);
    let mentions = submission
        .selftext
        .to_lowercase()
        .contains(&username.to_lowercase());
    Message::new(
        content,
        submission.author.clone(),
        format!("r/{subreddit}"),
        timestamp,
    )
    .with_data(serde_json::json!({
        "from_bot": false,
        "mentions_bot": mentions,
        "direct_message": false,
        "kind": "submission",
        "subreddit": subreddit,
        "submission_id": submission.id,
        "score": submission.score,
        "url": format!("https://reddit.com{}", submission.permalink),
    }))
}

fn decode_comment(
    comment: &Comment,
    subreddit: &str,
    timestamp: DateTime<Utc>,
    username: &str,
) -> Message {
    let mentions = comment
        .body
        .to_lowercase()
        .contains(&username.to_lowercase());
    Message::new(
        comment.body.clone(),
        comment.author.clone(),
        format!("r/{subreddit}"),
        timestamp,
    )
    .with_data(serde_json::json!({
        "from_bot": false,
        "mentions_bot": mentions,
        "direct_message": false,
        "kind": "comment",
        "subreddit": subreddit,
        "comment_id": comment.id,
        "submission_id": comment.link_id,
        "score": comment.score,
    }))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::sync::Mutex,
        tokio::sync::mpsc,
    };

    #[derive(Default)]
    struct ScriptedClient {
        submissions: Mutex<Vec<Submission>>,
        comments: Mutex<Vec<Comment>>,
        outbound: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RedditClient for ScriptedClient {
        async fn new_submissions(&self, _subreddit: &str) -> Result<Vec<Submission>> {
            Ok(self.submissions.lock().unwrap().clone())
        }

        async fn new_comments(&self, _subreddit: &str) -> Result<Vec<Comment>> {
            Ok(self.comments.lock().unwrap().clone())
        }

        async fn comment_on(&self, submission_id: &str, body: &str) -> Result<()> {
            self.outbound
                .lock()
                .unwrap()
                .push(format!("comment_on:{submission_id}:{body}"));
            Ok(())
        }

        async fn reply_to(&self, comment_id: &str, body: &str) -> Result<()> {
            self.outbound
                .lock()
                .unwrap()
                .push(format!("reply_to:{comment_id}:{body}"));
            Ok(())
        }

        async fn private_message(&self, username: &str, subject: &str, body: &str) -> Result<()> {
            self.outbound
                .lock()
                .unwrap()
                .push(format!("pm:{username}:{subject}:{body}"));
            Ok(())
        }
    }

    struct ChannelSink(mpsc::UnboundedSender<Message>);

    #[async_trait]
    impl MessageSink for ChannelSink {
        async fn deliver(&self, message: Message) {
            let _ = self.0.send(message);
        }
    }

    fn submission(id: &str, author: &str, age_secs: i64) -> Submission {
        Submission {
            id: id.into(),
            author: author.into(),
            title: format!("title {id}"),
            selftext: "body".into(),
            created_utc: (Utc::now() - chrono::Duration::seconds(age_secs)).timestamp(),
            score: 1,
            permalink: format!("/r/test/{id}"),
        }
    }

    fn comment(id: &str, author: &str, age_secs: i64, body: &str) -> Comment {
        Comment {
            id: id.into(),
            author: author.into(),
            body: body.into(),
            created_utc: (Utc::now() - chrono::Duration::seconds(age_secs)).timestamp(),
            score: 1,
            link_id: "t3_parent".into(),
        }
    }

    fn config_json() -> serde_json::Value {
        serde_json::json!({
            "subreddits": ["programming"],
            "poll_interval_secs": 1,
            "comment_delay_secs": 0,
            "username": "parleybot",
        })
    }

    #[tokio::test]
    async fn tick_applies_per_kind_windows_and_self_filter() {
        let client = Arc::new(ScriptedClient::default());
        *client.submissions.lock().unwrap() = vec![
            submission("s1", "alice", 60),
            submission("s2", "parleybot", 60), // own post, skipped
            submission("s3", "bob", 4000),     // outside 3600s window
        ];
        *client.comments.lock().unwrap() = vec![
            comment("c1", "carol", 60, "fresh comment"),
            comment("c2", "dave", 2000, "outside 1800s comment window"),
        ];

        let adapter = RedditAdapter::new(Arc::clone(&client) as Arc<dyn RedditClient>);
        adapter.connect(config_json()).await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        adapter.on_message(Arc::new(ChannelSink(tx)));

        let mut kinds = Vec::new();
        for _ in 0..2 {
            let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("delivery")
                .expect("channel open");
            kinds.push((msg.data_str("kind").unwrap_or_default().to_owned(), msg.user_id));
        }
        assert_eq!(
            kinds,
            vec![
                ("submission".to_owned(), "alice".to_owned()),
                ("comment".to_owned(), "carol".to_owned()),
            ]
        );
        assert!(
            tokio::time::timeout(Duration::from_millis(300), rx.recv())
                .await
                .is_err()
        );
        adapter.disconnect().await;
    }

    #[tokio::test]
    async fn reply_dispatches_on_kind() {
        let client = Arc::new(ScriptedClient::default());
        let adapter = RedditAdapter::new(Arc::clone(&client) as Arc<dyn RedditClient>);
        adapter.connect(config_json()).await.unwrap();

        let on_comment = Message::new("q", "alice", "r/programming", Utc::now()).with_data(
            serde_json::json!({ "kind": "comment", "comment_id": "c9" }),
        );
        adapter.reply(&on_comment, "answer one").await.unwrap();

        let on_submission = Message::new("q", "bob", "r/programming", Utc::now()).with_data(
            serde_json::json!({ "kind": "submission", "submission_id": "s9" }),
        );
        adapter.reply(&on_submission, "answer two").await.unwrap();

        let outbound = client.outbound.lock().unwrap();
        assert_eq!(
            *outbound,
            vec![
                "reply_to:c9:answer one".to_owned(),
                "comment_on:s9:answer two".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn send_message_supports_private_messages() {
        let client = Arc::new(ScriptedClient::default());
        let adapter = RedditAdapter::new(Arc::clone(&client) as Arc<dyn RedditClient>);
        adapter.connect(config_json()).await.unwrap();

        adapter
            .send_message(serde_json::json!({
                "kind": "pm",
                "username": "alice",
                "subject": "hello",
                "content": "hi there",
            }))
            .await
            .unwrap();

        assert_eq!(
            *client.outbound.lock().unwrap(),
            vec!["pm:alice:hello:hi there".to_owned()]
        );
    }

    #[tokio::test]
    async fn reply_with_unknown_kind_errors() {
        let adapter = RedditAdapter::new(Arc::new(ScriptedClient::default()));
        adapter.connect(config_json()).await.unwrap();
        let msg = Message::new("q", "alice", "r/programming", Utc::now());
        assert!(adapter.reply(&msg, "answer").await.is_err());
    }

    #[test]
    fn should_respond_follows_subreddit_policy() {
        let adapter = RedditAdapter::new(Arc::new(ScriptedClient::default()));

        let in_sub = |sub: &str, content: &str| {
            Message::new(content, "alice", format!("r/{sub}"), Utc::now())
                .with_data(serde_json::json!({ "subreddit": sub }))
        };

        assert!(adapter.should_respond(&in_sub("programming", "weird bug in my code")));
        assert!(adapter.should_respond(&in_sub("AskReddit", "could an ai do this?")));
        assert!(adapter.should_respond(&in_sub("technology", "automation is coming")));
        assert!(!adapter.should_respond(&in_sub("pics", "look at this cat")));
        assert!(adapter.should_respond(&in_sub("pics", "paging u/parleybot")));

        let dm = Message::new("hi", "alice", "dm", Utc::now())
            .with_data(serde_json::json!({ "direct_message": true }));
        assert!(adapter.should_respond(&dm));
    }
}
