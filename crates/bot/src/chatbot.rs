use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use {
    async_trait::async_trait,
    once_cell::sync::Lazy,
    regex::Regex,
    tracing::{debug, error, info, warn},
};

use {
    parley_channels::{ChannelAdapter, MessageSink},
    parley_common::{Error, Message, RequestContext, Result},
    parley_router::{Assistant, classify},
};

use crate::platform::Platform;

/// Fallback reply sent when the assistant delegate fails.
pub const APOLOGY: &str = "Sorry, I encountered an error processing your message.";

/// Words that warrant a response on any platform, regardless of the
/// adapter's own policy.
static TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(help|parley|assistant)\b").expect("trigger regex"));

// ── Orchestrator ────────────────────────────────────────────────────────────

/// One chatbot instance: one platform, one adapter, one assistant.
pub struct Chatbot {
    platform: Platform,
    config: serde_json::Value,
    adapter: Arc<dyn ChannelAdapter>,
    assistant: Arc<dyn Assistant>,
    running: AtomicBool,
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot")
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Chatbot {
    /// The adapter must belong to `platform`; a mismatch is a configuration
    /// error and construction fails before anything connects.
    pub fn new(
        platform: Platform,
        config: serde_json::Value,
        assistant: Arc<dyn Assistant>,
        adapter: Arc<dyn ChannelAdapter>,
    ) -> Result<Self> {
        if adapter.id() != platform.id() {
            return Err(Error::configuration(format!(
                "adapter '{}' does not serve platform '{platform}'",
                adapter.id()
            )));
        }
        Ok(Self {
            platform,
            config,
            adapter,
            assistant,
            running: AtomicBool::new(false),
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Connect the adapter and register the pipeline sink. A connect failure
    /// leaves the bot running degraded: the sink is registered anyway so a
    /// later reconnect starts delivering, and the error is returned for the
    /// caller to surface.
    pub async fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let result = self.adapter.connect(self.config.clone()).await;
        if let Err(ref e) = result {
            warn!(platform = %self.platform, error = %e, "connect failed, running degraded");
        } else {
            info!(platform = %self.platform, "chatbot started");
        }
        self.adapter.on_message(Arc::new(Pipeline {
            platform: self.platform,
            adapter: Arc::clone(&self.adapter),
            assistant: Arc::clone(&self.assistant),
        }));
        result
    }

    /// Terminal: disconnects the adapter and turns later sends into no-ops.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.adapter.disconnect().await;
        info!(platform = %self.platform, "chatbot stopped");
    }

    pub async fn send_message(&self, options: serde_json::Value) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        self.adapter.send_message(options).await
    }

    pub async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        self.adapter.reply(original, content).await
    }
}

// ── Inbound pipeline ────────────────────────────────────────────────────────

/// The sink registered with the adapter. Runs the full decision and
/// delegation sequence for each inbound message; never panics and never
/// returns an error upward.
struct Pipeline {
    platform: Platform,
    adapter: Arc<dyn ChannelAdapter>,
    assistant: Arc<dyn Assistant>,
}

impl Pipeline {
    /// Mentions, DMs, and trigger words warrant a reply everywhere; only
    /// past those does the adapter's own policy get a say.
    fn wants_response(&self, message: &Message) -> bool {
        if message.mentions_bot()
            || message.is_direct_message()
            || TRIGGER.is_match(&message.content)
        {
            return true;
        }
        self.adapter.should_respond(message)
    }

    fn context_for(&self, message: &Message) -> RequestContext {
        RequestContext {
            platform: self.platform.id().to_owned(),
            user_id: message.user_id.clone(),
            channel: message.channel.clone(),
            timestamp: message.timestamp,
            is_public: !message.is_direct_message(),
            user_roles: message.user_roles(),
        }
    }
}

#[async_trait]
impl MessageSink for Pipeline {
    async fn deliver(&self, message: Message) {
        if message.from_bot() {
            debug!(platform = %self.platform, "ignoring own message");
            return;
        }
        if !self.wants_response(&message) {
            debug!(platform = %self.platform, channel = %message.channel, "not responding");
            return;
        }

        let category = classify(&message.content);
        let context = self.context_for(&message);
        debug!(
            platform = %self.platform,
            category = category.as_str(),
            user = %message.user_id,
            "delegating"
        );

        let reply = match self
            .assistant
            .delegate(&message.content, category, &context)
            .await
        {
            Ok(text) => self.adapter.format_response(&text),
            Err(e) => {
                warn!(platform = %self.platform, error = %e, "delegate failed, apologising");
                APOLOGY.to_owned()
            }
        };

        if let Err(e) = self.adapter.reply(&message, &reply).await {
            error!(platform = %self.platform, error = %e, "reply failed");
        }
    }
}
