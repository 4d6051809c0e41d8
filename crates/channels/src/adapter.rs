use std::sync::{Arc, Mutex, RwLock};

use {
    async_trait::async_trait,
    tokio_util::sync::CancellationToken,
    tracing::debug,
};

use parley_common::{Message, Result};

// ── Connection state machine ────────────────────────────────────────────────

/// Lifecycle of one adapter instance.
///
/// `Connecting` is transient inside `connect`. `Listening` is entered only
/// when a sink is registered while `Connected`. Errors during listening keep
/// the adapter in `Listening` and the loop retrying; only an explicit
/// `disconnect` returns it to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Listening,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Listening)
    }
}

// ── Inbound sink ────────────────────────────────────────────────────────────

/// Receiver for decoded inbound messages. The orchestrator provides the
/// concrete implementation (its pipeline); adapters only ever hold it as a
/// trait object.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: Message);
}

// ── Adapter capability set ──────────────────────────────────────────────────

/// The seven operations every platform adapter implements. This trait is the
/// only boundary between the dispatch core and real platform transports.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Platform identifier (e.g. "discord", "reddit").
    fn id(&self) -> &str;

    /// Establish a session from an adapter-specific config bag. On failure
    /// the adapter stays `Disconnected` and the error is returned, never
    /// panicked.
    async fn connect(&self, config: serde_json::Value) -> Result<()>;

    /// Register (or replace) the inbound sink. While `Connected`, polling
    /// and stream adapters start their background loop here; before
    /// `connect` the sink is stored and nothing else happens.
    fn on_message(&self, sink: Arc<dyn MessageSink>);

    /// Send an outbound message per the adapter's option schema. Silently a
    /// no-op when not connected.
    async fn send_message(&self, options: serde_json::Value) -> Result<()>;

    /// Send `content` as a native reply to `original`, deriving the target
    /// from `original.platform_data`.
    async fn reply(&self, original: &Message, content: &str) -> Result<()>;

    /// Pure, idempotent transform: strip unsupported formatting, apply the
    /// platform's stylistic quirks, truncate to the platform limit.
    fn format_response(&self, text: &str) -> String;

    /// Platform-specific response policy. Pure predicate; the orchestrator's
    /// generic decision (mention / DM / trigger word) overrides it.
    fn should_respond(&self, message: &Message) -> bool;

    /// Idempotent; cancels any background loop and is safe on a
    /// never-connected adapter.
    async fn disconnect(&self);

    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;
}

// ── Shared session state ────────────────────────────────────────────────────

/// Connection state, registered sink, and listening-cancellation token —
/// the mutable core every adapter owns. Delivery is gated here so that no
/// message reaches the sink once `disconnect` has flipped the state, even if
/// a polling tick is still in flight.
pub struct AdapterSession {
    platform: &'static str,
    state: RwLock<ConnectionState>,
    sink: RwLock<Option<Arc<dyn MessageSink>>>,
    cancel: Mutex<CancellationToken>,
}

impl AdapterSession {
    pub fn new(platform: &'static str) -> Self {
        Self {
            platform,
            state: RwLock::new(ConnectionState::Disconnected),
            sink: RwLock::new(None),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn platform(&self) -> &'static str {
        self.platform
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap() = state;
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Registering a second sink replaces the first; no error.
    pub fn register_sink(&self, sink: Arc<dyn MessageSink>) {
        *self.sink.write().unwrap() = Some(sink);
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().unwrap().is_some()
    }

    /// Hand a decoded message to the registered sink. Dropped (with a debug
    /// log) when no sink is registered or the adapter is no longer
    /// connected.
    pub async fn deliver(&self, message: Message) {
        if !self.is_connected() {
            debug!(platform = self.platform, "dropping message: not connected");
            return;
        }
        let sink = self.sink.read().unwrap().clone();
        match sink {
            Some(sink) => sink.deliver(message).await,
            None => debug!(platform = self.platform, "dropping message: no sink"),
        }
    }

    /// Cancel any previous listening loop and mint the token for a new one.
    pub fn begin_listening(&self) -> CancellationToken {
        let mut guard = self.cancel.lock().unwrap();
        guard.cancel();
        *guard = CancellationToken::new();
        self.set_state(ConnectionState::Listening);
        guard.clone()
    }

    /// Signal the loop to stop and mark the session disconnected. Safe to
    /// call repeatedly; the loop observes the token at its next tick
    /// boundary.
    pub fn shut_down(&self) {
        self.cancel.lock().unwrap().cancel();
        self.set_state(ConnectionState::Disconnected);
    }
}
