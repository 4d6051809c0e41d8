use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    chrono::{TimeZone, Utc},
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use {
    parley_channels::{AdapterSession, ChannelAdapter, ConnectionState, MessageSink},
    parley_common::{Error, Message, Result},
};

use crate::{config::OnlyFansConfig, format};

/// Creator messaging API boundary.
#[async_trait]
pub trait CreatorApi: Send + Sync {
    async fn send_dm(&self, user_id: &str, text: &str) -> Result<()>;
}

/// Inbound creator-account events. Plain messages flow through the sink like
/// any other channel; the rest get canned creator responses on the spot.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CreatorEvent {
    Message {
        user_id: String,
        content: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Subscription {
        user_id: String,
        username: String,
    },
    Tip {
        user_id: String,
        amount: f64,
    },
    ContentRequest {
        user_id: String,
        kind: String,
    },
}

/// Option schema for `send_message`.
#[derive(Debug, Deserialize)]
struct SendOptions {
    user_id: String,
    content: String,
}

/// Always-on DM adapter for a creator account.
pub struct OnlyFansAdapter {
    session: Arc<AdapterSession>,
    api: Arc<dyn CreatorApi>,
    config: RwLock<OnlyFansConfig>,
}

impl OnlyFansAdapter {
    pub fn new(api: Arc<dyn CreatorApi>) -> Self {
        Self {
            session: Arc::new(AdapterSession::new("onlyfans")),
            api,
            config: RwLock::new(OnlyFansConfig::default()),
        }
    }

    /// Entry point for one account event. Messages go to the sink; the
    /// engagement events are answered immediately with a canned response.
    /// Events arriving before `connect` are dropped.
    pub async fn handle_event(&self, event: CreatorEvent) {
        if !self.session.is_connected() {
            debug!("dropping creator event: not connected");
            return;
        }
        match event {
            CreatorEvent::Message {
                user_id,
                content,
                timestamp,
            } => {
                self.session
                    .deliver(decode_message(user_id, content, timestamp))
                    .await;
            }
            CreatorEvent::Subscription { user_id, username } => {
                info!(%user_id, "new subscriber");
                self.send_canned(&user_id, &welcome_message(&username)).await;
            }
            CreatorEvent::Tip { user_id, amount } => {
                info!(%user_id, amount, "tip received");
                self.send_canned(&user_id, &tip_response(amount)).await;
            }
            CreatorEvent::ContentRequest { user_id, kind } => {
                debug!(%user_id, %kind, "content request");
                self.send_canned(&user_id, content_request_response(&kind))
                    .await;
            }
        }
    }

    async fn send_canned(&self, user_id: &str, text: &str) {
        if let Err(e) = self.api.send_dm(user_id, text).await {
            warn!(%user_id, error = %e, "failed to send creator response");
        }
    }
}

#[async_trait]
impl ChannelAdapter for OnlyFansAdapter {
    fn id(&self) -> &str {
        "onlyfans"
    }

    async fn connect(&self, config: serde_json::Value) -> Result<()> {
        self.session.set_state(ConnectionState::Connecting);
        let cfg: OnlyFansConfig = serde_json::from_value(config).map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("invalid onlyfans config: {e}"))
        })?;
        info!(creator_id = %cfg.creator_id, "onlyfans adapter connected");
        *self.config.write().unwrap() = cfg;
        self.session.set_state(ConnectionState::Connected);
        Ok(())
    }

    fn on_message(&self, sink: Arc<dyn MessageSink>) {
        self.session.register_sink(sink);
        if self.session.is_connected() {
            self.session.set_state(ConnectionState::Listening);
        }
    }

    async fn send_message(&self, options: serde_json::Value) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        let opts: SendOptions = serde_json::from_value(options)?;
        self.api.send_dm(&opts.user_id, &opts.content).await
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        self.api.send_dm(&original.user_id, content).await
    }

    fn format_response(&self, text: &str) -> String {
        format::format_dm(text)
    }

    fn should_respond(&self, _message: &Message) -> bool {
        // Subscribers and fans always get a response.
        true
    }

    async fn disconnect(&self) {
        self.session.shut_down();
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

fn decode_message(user_id: String, content: String, timestamp: Option<i64>) -> Message {
    let timestamp = timestamp
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now);
    Message::new(content, user_id, "onlyfans_dm", timestamp).with_data(serde_json::json!({
        "from_bot": false,
        "mentions_bot": true,
        "direct_message": true,
    }))
}

fn welcome_message(username: &str) -> String {
    format!(
        "Hey {username}! 💕 Welcome to my page! I'm so excited to have you here. \
         Feel free to message me anytime - I love chatting with my fans! ✨"
    )
}

fn tip_response(amount: f64) -> String {
    format!(
        "OMG thank you so much for the tip! 😍 ${amount} means the world to me! \
         You're absolutely amazing! 💕✨"
    )
}

fn content_request_response(kind: &str) -> &'static str {
    match kind {
        "custom" => {
            "I'd love to create something special for you! 💕 Let me know more details \
             about what you're looking for and I'll see what I can do! ✨"
        }
        "schedule" => {
            "I typically post new content every few days! 📅 Keep an eye out for my \
             latest updates! You can also turn on notifications so you never miss anything! 🔔"
        }
        _ => {
            "Thanks for reaching out! 💕 I'm here to chat and answer any questions \
             you might have! What's on your mind? ✨"
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::sync::Mutex,
        tokio::sync::mpsc,
    };

    #[derive(Default)]
    struct RecordingApi(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl CreatorApi for RecordingApi {
        async fn send_dm(&self, user_id: &str, text: &str) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((user_id.to_owned(), text.to_owned()));
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

    async fn connected_adapter() -> (
        OnlyFansAdapter,
        Arc<RecordingApi>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let api = Arc::new(RecordingApi::default());
        let adapter = OnlyFansAdapter::new(Arc::clone(&api) as Arc<dyn CreatorApi>);
        adapter
            .connect(serde_json::json!({ "api_key": "k", "creator_id": "creator" }))
            .await
            .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        adapter.on_message(Arc::new(ChannelSink(tx)));
        (adapter, api, rx)
    }

    #[tokio::test]
    async fn message_event_reaches_the_sink() {
        let (adapter, api, mut rx) = connected_adapter().await;
        adapter
            .handle_event(CreatorEvent::Message {
                user_id: "fan1".into(),
                content: "hey!".into(),
                timestamp: Some(1_700_000_000),
            })
            .await;

        let msg = rx.try_recv().expect("delivery");
        assert_eq!(msg.content, "hey!");
        assert_eq!(msg.channel, "onlyfans_dm");
        assert!(msg.is_direct_message());
        assert!(api.0.lock().unwrap().is_empty(), "no canned response for plain messages");
    }

    #[tokio::test]
    async fn subscription_gets_a_welcome() {
        let (adapter, api, mut rx) = connected_adapter().await;
        adapter
            .handle_event(CreatorEvent::Subscription {
                user_id: "fan2".into(),
                username: "alex".into(),
            })
            .await;

        let sent = api.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "fan2");
        assert!(sent[0].1.starts_with("Hey alex!"));
        drop(sent);
        assert!(rx.try_recv().is_err(), "engagement events skip the sink");
    }

    #[tokio::test]
    async fn tip_gets_a_thank_you_with_the_amount() {
        let (adapter, api, _rx) = connected_adapter().await;
        adapter
            .handle_event(CreatorEvent::Tip {
                user_id: "fan3".into(),
                amount: 25.0,
            })
            .await;

        let sent = api.0.lock().unwrap();
        assert!(sent[0].1.contains("$25"));
    }

    #[tokio::test]
    async fn content_requests_answer_by_kind() {
        let (adapter, api, _rx) = connected_adapter().await;
        for kind in ["custom", "schedule", "pricing"] {
            adapter
                .handle_event(CreatorEvent::ContentRequest {
                    user_id: "fan4".into(),
                    kind: kind.into(),
                })
                .await;
        }

        let sent = api.0.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].1.contains("something special"));
        assert!(sent[1].1.contains("every few days"));
        assert!(sent[2].1.contains("What's on your mind?"));
    }

    #[tokio::test]
    async fn events_before_connect_are_dropped() {
        let api = Arc::new(RecordingApi::default());
        let adapter = OnlyFansAdapter::new(Arc::clone(&api) as Arc<dyn CreatorApi>);
        let (tx, mut rx) = mpsc::unbounded_channel();
        adapter.on_message(Arc::new(ChannelSink(tx)));
        adapter
            .handle_event(CreatorEvent::Subscription {
                user_id: "fan".into(),
                username: "early".into(),
            })
            .await;
        assert!(api.0.lock().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reply_goes_back_to_the_fan() {
        let (adapter, api, _rx) = connected_adapter().await;
        let original = Message::new("hi", "fan5", "onlyfans_dm", Utc::now());
        adapter.reply(&original, "hello!").await.unwrap();
        assert_eq!(
            *api.0.lock().unwrap(),
            vec![("fan5".to_owned(), "hello!".to_owned())]
        );
    }

    #[test]
    fn events_decode_from_json() {
        let event: CreatorEvent = serde_json::from_str(
            r#"{"event":"tip","user_id":"fan","amount":10.5}"#,
        )
        .unwrap();
        assert!(matches!(event, CreatorEvent::Tip { amount, .. } if amount == 10.5));
    }
}
