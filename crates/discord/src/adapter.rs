use std::{
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use {
    async_trait::async_trait,
    serde::Deserialize,
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, info, warn},
};

use {
    parley_channels::{
        AdapterSession, ChannelAdapter, ConnectionState, MessageSink,
        format::truncate_with_marker,
    },
    parley_common::{Error, Message, Result},
};

use crate::{
    config::DiscordConfig,
    gateway::{DiscordGateway, GatewayMessage},
};

/// Discord caps messages at 2000 characters; stay under it with margin for
/// the client's own decorations.
pub const MAX_MESSAGE_CHARS: usize = 1900;

/// How long `disconnect` waits for the drain task to wind down.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Option schema for `send_message`.
#[derive(Debug, Deserialize)]
struct SendOptions {
    channel: String,
    content: String,
}

/// Persistent-stream adapter for Discord.
pub struct DiscordAdapter {
    session: Arc<AdapterSession>,
    gateway: Arc<dyn DiscordGateway>,
    config: RwLock<DiscordConfig>,
    stream: Mutex<Option<mpsc::Receiver<GatewayMessage>>>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordAdapter {
    pub fn new(gateway: Arc<dyn DiscordGateway>) -> Self {
        Self {
            session: Arc::new(AdapterSession::new("discord")),
            gateway,
            config: RwLock::new(DiscordConfig::default()),
            stream: Mutex::new(None),
            drain: Mutex::new(None),
        }
    }

    /// Spawn the drain task over the stored event stream. Runs on its own
    /// task so the caller's control plane (stop, sends on other platforms)
    /// is never blocked by this adapter listening.
    fn start_listening(&self) {
        let Some(mut rx) = self.stream.lock().unwrap().take() else {
            debug!("no gateway stream to drain (already listening?)");
            return;
        };
        let cancel = self.session.begin_listening();
        let session = Arc::clone(&self.session);

        let handle = tokio::spawn(async move {
            info!("discord drain task started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = rx.recv() => match event {
                        Some(event) => session.deliver(decode_event(event)).await,
                        None => {
                            // Stream closed upstream; fall back to Connected
                            // so an explicit disconnect still owns the final
                            // transition.
                            warn!("discord gateway stream closed");
                            if session.state() == ConnectionState::Listening {
                                session.set_state(ConnectionState::Connected);
                            }
                            break;
                        }
                    },
                }
            }
            debug!("discord drain task stopped");
        });
        *self.drain.lock().unwrap() = Some(handle);
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn id(&self) -> &str {
        "discord"
    }

    async fn connect(&self, config: serde_json::Value) -> Result<()> {
        self.session.set_state(ConnectionState::Connecting);
        let cfg: DiscordConfig = serde_json::from_value(config).map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("invalid discord config: {e}"))
        })?;

        let rx = self.gateway.open(&cfg).await.map_err(|e| {
            self.session.set_state(ConnectionState::Disconnected);
            Error::connection(format!("discord gateway: {e}"))
        })?;

        info!(bot_name = %cfg.bot_name, "discord adapter connected");
        *self.config.write().unwrap() = cfg;
        *self.stream.lock().unwrap() = Some(rx);
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
        self.gateway.send(&opts.channel, &opts.content).await
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        let channel_id = original
            .data_str("channel_id")
            .ok_or_else(|| Error::adapter_internal("discord", "reply target missing channel_id"))?;
        self.gateway.send(channel_id, content).await
    }

    fn format_response(&self, text: &str) -> String {
        // Discord renders markdown natively; only the length needs care.
        truncate_with_marker(text, MAX_MESSAGE_CHARS, "...")
    }

    fn should_respond(&self, message: &Message) -> bool {
        message.mentions_bot() || message.is_direct_message()
    }

    async fn disconnect(&self) {
        self.session.shut_down();
        self.gateway.close().await;
        self.stream.lock().unwrap().take();

        let handle = self.drain.lock().unwrap().take();
        if let Some(handle) = handle {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err() {
                warn!("discord drain task did not stop within the shutdown timeout");
            }
        }
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

fn decode_event(event: GatewayMessage) -> Message {
    Message::new(
        event.content,
        event.author_id,
        event.channel_name,
        event.timestamp,
    )
    .with_data(serde_json::json!({
        "from_bot": event.author_is_bot,
        "mentions_bot": event.mentions_bot,
        "direct_message": event.is_direct,
        "user_roles": event.author_roles,
        "channel_id": event.channel_id,
        "message_id": event.message_id,
    }))
}
