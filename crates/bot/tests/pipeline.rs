//! End-to-end pipeline tests against an in-memory adapter and assistant.

use std::sync::{Arc, Mutex, RwLock};

use {
    async_trait::async_trait,
    chrono::Utc,
    serde_json::json,
};

use {
    parley_bot::{APOLOGY, Chatbot, Platform},
    parley_channels::{AdapterSession, ChannelAdapter, ConnectionState, MessageSink},
    parley_common::{Error, Message, RequestContext, Result},
    parley_router::{Assistant, Category},
};

// ── Test doubles ────────────────────────────────────────────────────────────

/// Minimal adapter: records replies, respond policy requires "beep".
struct FakeAdapter {
    session: Arc<AdapterSession>,
    replies: Mutex<Vec<(String, String)>>,
    fail_connect: bool,
}

impl FakeAdapter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            session: Arc::new(AdapterSession::new("snapchat")),
            replies: Mutex::new(Vec::new()),
            fail_connect: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            session: Arc::new(AdapterSession::new("snapchat")),
            replies: Mutex::new(Vec::new()),
            fail_connect: true,
        })
    }

    fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    async fn inject(&self, message: Message) {
        self.session.deliver(message).await;
    }
}

#[async_trait]
impl ChannelAdapter for FakeAdapter {
    fn id(&self) -> &str {
        "snapchat"
    }

    async fn connect(&self, _config: serde_json::Value) -> Result<()> {
        if self.fail_connect {
            return Err(Error::connection("refused"));
        }
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
        let content = options["content"].as_str().unwrap_or_default().to_owned();
        self.replies.lock().unwrap().push(("(send)".into(), content));
        Ok(())
    }

    async fn reply(&self, original: &Message, content: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((original.user_id.clone(), content.to_owned()));
        Ok(())
    }

    fn format_response(&self, text: &str) -> String {
        format!("[fmt] {text}")
    }

    fn should_respond(&self, message: &Message) -> bool {
        message.content.contains("beep")
    }

    async fn disconnect(&self) {
        self.session.shut_down();
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }
}

/// Assistant that echoes the chosen category and records the context.
struct EchoAssistant {
    seen: RwLock<Vec<(Category, RequestContext)>>,
    fail: bool,
}

impl EchoAssistant {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: RwLock::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            seen: RwLock::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl Assistant for EchoAssistant {
    async fn delegate(
        &self,
        _content: &str,
        category: Category,
        context: &RequestContext,
    ) -> Result<String> {
        self.seen.write().unwrap().push((category, context.clone()));
        if self.fail {
            return Err(Error::processing("model unavailable"));
        }
        Ok(format!("handled as {}", category.as_str()))
    }
}

fn bot(adapter: Arc<FakeAdapter>, assistant: Arc<EchoAssistant>) -> Chatbot {
    Chatbot::new(
        Platform::Snapchat,
        json!({}),
        assistant as Arc<dyn Assistant>,
        adapter as Arc<dyn ChannelAdapter>,
    )
    .unwrap()
}

fn dm(content: &str) -> Message {
    Message::new(content, "fan", "dm", Utc::now()).with_data(json!({
        "direct_message": true,
        "user_roles": ["subscriber"],
    }))
}

fn public(content: &str) -> Message {
    Message::new(content, "user", "lobby", Utc::now())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dm_is_classified_delegated_and_replied() {
    let adapter = FakeAdapter::new();
    let assistant = EchoAssistant::new();
    let bot = bot(adapter.clone(), assistant.clone());
    bot.start().await.unwrap();

    adapter.inject(dm("I need help with a legal contract")).await;

    let replies = adapter.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "fan");
    assert_eq!(replies[0].1, "[fmt] handled as legal");

    let seen = assistant.seen.read().unwrap();
    let (category, context) = &seen[0];
    assert_eq!(*category, Category::Legal);
    assert_eq!(context.platform, "snapchat");
    assert!(!context.is_public);
    assert_eq!(context.user_roles, vec!["subscriber"]);
}

#[tokio::test]
async fn delegate_failure_becomes_apology() {
    let adapter = FakeAdapter::new();
    let bot = bot(adapter.clone(), EchoAssistant::failing());
    bot.start().await.unwrap();

    adapter.inject(dm("anything")).await;

    let replies = adapter.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].1, APOLOGY);
}

#[tokio::test]
async fn own_messages_are_dropped() {
    let adapter = FakeAdapter::new();
    let assistant = EchoAssistant::new();
    let bot = bot(adapter.clone(), assistant.clone());
    bot.start().await.unwrap();

    adapter
        .inject(public("help me").with_data(json!({ "from_bot": true })))
        .await;

    assert!(adapter.replies().is_empty());
    assert!(assistant.seen.read().unwrap().is_empty());
}

#[tokio::test]
async fn trigger_word_bypasses_adapter_policy() {
    let adapter = FakeAdapter::new();
    let bot = bot(adapter.clone(), EchoAssistant::new());
    bot.start().await.unwrap();

    // Fails the adapter's "beep" policy, but carries a trigger word.
    adapter.inject(public("assistant, what time is it")).await;
    assert_eq!(adapter.replies().len(), 1);
}

#[tokio::test]
async fn adapter_policy_drops_plain_public_messages() {
    let adapter = FakeAdapter::new();
    let assistant = EchoAssistant::new();
    let bot = bot(adapter.clone(), assistant.clone());
    bot.start().await.unwrap();

    adapter.inject(public("just chatting over here")).await;
    assert!(adapter.replies().is_empty());
    assert!(assistant.seen.read().unwrap().is_empty());

    // The same channel passes once the policy matches.
    adapter.inject(public("beep boop")).await;
    assert_eq!(adapter.replies().len(), 1);
}

#[tokio::test]
async fn stop_is_terminal() {
    let adapter = FakeAdapter::new();
    let bot = bot(adapter.clone(), EchoAssistant::new());
    bot.start().await.unwrap();
    bot.stop().await;

    assert!(!bot.is_running());
    assert_eq!(adapter.state(), ConnectionState::Disconnected);

    // Injected messages and proxied sends are now no-ops.
    adapter.inject(dm("hello?")).await;
    bot.reply(&dm("hello?"), "late").await.unwrap();
    bot.send_message(json!({ "content": "late" })).await.unwrap();
    assert!(adapter.replies().is_empty());
}

#[tokio::test]
async fn failed_connect_runs_degraded() {
    let adapter = FakeAdapter::failing();
    let bot = bot(adapter.clone(), EchoAssistant::new());

    let err = bot.start().await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
    assert!(bot.is_running());
    assert_eq!(adapter.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn mismatched_adapter_is_a_configuration_error() {
    let err = Chatbot::new(
        Platform::Reddit,
        json!({}),
        EchoAssistant::new() as Arc<dyn Assistant>,
        FakeAdapter::new() as Arc<dyn ChannelAdapter>,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}
