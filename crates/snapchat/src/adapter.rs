use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    chrono::{TimeZone, Utc},
    serde::Deserialize,
    tracing::{debug, info},
};

use {
    parley_channels::{AdapterSession, ChannelAdapter, ConnectionState, MessageSink},
    parley_common::{Error, Message, Result},
};

use crate::{config::SnapchatConfig, format};

/// Send-side transport boundary.
#[async_trait]
pub trait SnapSender: Send + Sync {
    async fn send_chat(&self, user_id: &str, text: &str) -> Result<()>;
}

/// Webhook payload shape. Text snaps carry `text`, media snaps a `caption`.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    user_id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    snap_type: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    /// Unix timestamp of the snap; receipt time when absent.
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Option schema for `send_message`.
#[derive(Debug, Deserialize)]
struct SendOptions {
    user_id: String,
    content: String,
}

/// Webhook adapter for Snapchat.
pub struct SnapchatAdapter {
    session: Arc<AdapterSession>,
    sender: Arc<dyn SnapSender>,
    config: RwLock<SnapchatConfig>,
}

impl SnapchatAdapter {
    pub fn new(sender: Arc<dyn SnapSender>) -> Self {
        Self {
            session: Arc::new(AdapterSession::new("snapchat")),
            sender,
            config: RwLock::new(SnapchatConfig::default()),
        }
    }

    /// Externally invoked entry point: decode one delivered payload and run
    /// the sink inline. Malformed payloads and payloads arriving before
    /// `connect`/`on_message` are dropped, never raised.
    pub async fn handle_webhook(&self, payload: &[u8]) {
        if !self.session.is_connected() {
            debug!("dropping webhook payload: not connected");
            return;
        }
        let decoded: WebhookPayload = match serde_json::from_slice(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = %e, "dropping malformed webhook payload");
                return;
            }
        };
        self.session.deliver(decode_payload(decoded)).await;
    }
}

#[async_trait]
impl ChannelAdapter for SnapchatAdapter {
    fn id(&self) -> &str {
        "snapchat"
    }

    async fn connect(&self, config: serde_json::Value) -> Result<()> {
        self.session.set_state(ConnectionState::Connecting);
        let cfg: SnapchatConfig = serde_json::from_value(config).map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("invalid snapchat config: {e}"))
        })?;
        info!(app_id = %cfg.app_id, "snapchat adapter connected");
        *self.config.write().unwrap() = cfg;
        self.session.set_state(ConnectionState::Connected);
        Ok(())
    }

    fn on_message(&self, sink: Arc<dyn MessageSink>) {
        self.session.register_sink(sink);
        // Webhook delivery is caller-driven; "listening" just means the
        // entry point will now forward payloads.
        if self.session.is_connected() {
            self.session.set_state(ConnectionState::Listening);
        }
    }

    async fn send_message(&self, options: serde_json::Value) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        let opts: SendOptions = serde_json::from_value(options)?;
        self.sender.send_chat(&opts.user_id, &opts.content).await
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        self.sender.send_chat(&original.user_id, content).await
    }

    fn format_response(&self, text: &str) -> String {
        format::format_chat(text)
    }

    fn should_respond(&self, _message: &Message) -> bool {
        // Every webhook delivery is already a direct 1:1 interaction.
        true
    }

    async fn disconnect(&self) {
        self.session.shut_down();
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

fn decode_payload(payload: WebhookPayload) -> Message {
    let content = payload
        .text
        .or(payload.caption)
        .unwrap_or_default();
    let timestamp = payload
        .timestamp
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now);
    Message::new(content, payload.user_id, "snapchat_dm", timestamp).with_data(serde_json::json!({
        "from_bot": false,
        "mentions_bot": true,
        "direct_message": true,
        "snap_type": payload.snap_type,
        "media_url": payload.media_url,
    }))
}
