use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for one Snapchat business-account session.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapchatConfig {
    /// API key for the send-side client.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Registered application id.
    pub app_id: String,
}

impl std::fmt::Debug for SnapchatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapchatConfig")
            .field("api_key", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for SnapchatConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            app_id: String::new(),
        }
    }
}
