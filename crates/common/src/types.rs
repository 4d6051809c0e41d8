use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

// ── Canonical message ───────────────────────────────────────────────────────

/// Platform-agnostic snapshot of one inbound event.
///
/// Built once by the owning adapter and never mutated afterwards, so it can
/// be handed across tasks without synchronization. `platform_data` is an
/// opaque bag of platform-specific fields (`board`, `thread_id`,
/// `subreddit`, `comment_id`, ...); the well-known flags are read through
/// the predicate methods, which default to false/empty when a key is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message text. May be empty, never absent.
    pub content: String,
    /// Opaque platform-defined user identifier.
    pub user_id: String,
    /// Opaque platform-defined channel identifier (`/g/`, `r/programming`, ...).
    pub channel: String,
    /// Time of the underlying native event, not receipt time.
    pub timestamp: DateTime<Utc>,
    /// Platform-specific fields, opaque to the dispatch core.
    #[serde(default)]
    pub platform_data: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn new(
        content: impl Into<String>,
        user_id: impl Into<String>,
        channel: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            user_id: user_id.into(),
            channel: channel.into(),
            timestamp,
            platform_data: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_platform_data(mut self, data: serde_json::Map<String, serde_json::Value>) -> Self {
        self.platform_data = data;
        self
    }

    /// Convenience over [`Self::with_platform_data`] for `serde_json::json!`
    /// literals. Non-object values leave the data empty.
    #[must_use]
    pub fn with_data(self, value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => self.with_platform_data(map),
            _ => self,
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.platform_data
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the event was authored by the bot itself.
    pub fn from_bot(&self) -> bool {
        self.flag("from_bot")
    }

    /// Whether the bot was explicitly mentioned.
    pub fn mentions_bot(&self) -> bool {
        self.flag("mentions_bot")
    }

    /// Whether the event arrived over a 1:1 channel.
    pub fn is_direct_message(&self) -> bool {
        self.flag("direct_message")
    }

    /// Roles of the sender, empty when the platform has no role concept.
    pub fn user_roles(&self) -> Vec<String> {
        self.platform_data
            .get("user_roles")
            .and_then(serde_json::Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|r| r.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// String-typed platform field, if present.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.platform_data.get(key).and_then(|v| v.as_str())
    }

    /// Integer-typed platform field, if present.
    pub fn data_i64(&self, key: &str) -> Option<i64> {
        self.platform_data.get(key).and_then(serde_json::Value::as_i64)
    }
}

// ── Delegation context ──────────────────────────────────────────────────────

/// Context record handed to the assistant delegate alongside message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub platform: String,
    pub user_id: String,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
    /// Inverse of `is_direct_message`.
    pub is_public: bool,
    pub user_roles: Vec<String>,
}
