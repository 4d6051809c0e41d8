use async_trait::async_trait;

use {
    crate::classify::Category,
    parley_common::{RequestContext, Result},
};

/// Contract for the external reasoning engine.
///
/// Synchronous from the pipeline's perspective (one call, one reply text),
/// however the implementation produces it. All internal failure modes —
/// timeout, malformed input, provider error — surface as a single
/// [`parley_common::Error::Processing`] value; the orchestrator recovers it
/// into a fallback reply and never lets it propagate.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn delegate(
        &self,
        content: &str,
        category: Category,
        context: &RequestContext,
    ) -> Result<String>;
}
