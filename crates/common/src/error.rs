use std::error::Error as StdError;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared across the dispatch core.
///
/// Only `Configuration` is fatal at startup. Everything else is recovered
/// where it occurs: a failed `connect` leaves the orchestrator running in a
/// degraded state, a failed fetch skips one source for one tick, and a failed
/// delegate call turns into a fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unsupported or misconfigured platform requested at construction.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A session could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// A single fetch or post inside an adapter failed; the loop continues.
    #[error("adapter error on {source_id}: {message}")]
    AdapterInternal { source_id: String, message: String },

    /// The assistant delegate call failed, whatever the internal cause.
    #[error("assistant processing failed: {message}")]
    Processing { message: String },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Wrapped source error from an external transport.
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn configuration(message: impl std::fmt::Display) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn connection(message: impl std::fmt::Display) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn adapter_internal(
        source_id: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::AdapterInternal {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn processing(message: impl std::fmt::Display) -> Self {
        Self::Processing {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
