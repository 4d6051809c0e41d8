use {async_trait::async_trait, chrono::{DateTime, Utc}, tokio::sync::mpsc};

use {crate::config::DiscordConfig, parley_common::Result};

/// One message event as decoded by the gateway transport.
#[derive(Debug, Clone)]
pub struct GatewayMessage {
    pub message_id: String,
    pub channel_id: String,
    /// Human-readable channel name ("general", or the DM peer).
    pub channel_name: String,
    pub author_id: String,
    pub author_is_bot: bool,
    pub author_roles: Vec<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_direct: bool,
    pub mentions_bot: bool,
}

/// Transport boundary for the Discord gateway. A real implementation wraps
/// the websocket session; tests push scripted events through the channel.
#[async_trait]
pub trait DiscordGateway: Send + Sync {
    /// Open the persistent event stream. Called once per `connect`; the
    /// returned receiver yields events until the stream closes.
    async fn open(&self, config: &DiscordConfig) -> Result<mpsc::Receiver<GatewayMessage>>;

    /// Send `content` to a channel.
    async fn send(&self, channel_id: &str, content: &str) -> Result<()>;

    /// Tear down the stream; after this returns the receiver drains and
    /// closes.
    async fn close(&self);
}
