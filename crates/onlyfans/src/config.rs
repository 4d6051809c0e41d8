use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for one creator account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlyFansConfig {
    /// Creator API key.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Creator account id.
    pub creator_id: String,

    /// Optional callback URL registered with the API for inbound events.
    pub webhook_url: Option<String>,
}

impl std::fmt::Debug for OnlyFansConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlyFansConfig")
            .field("api_key", &"[REDACTED]")
            .field("creator_id", &self.creator_id)
            .field("webhook_url", &self.webhook_url)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for OnlyFansConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            creator_id: String::new(),
            webhook_url: None,
        }
    }
}
