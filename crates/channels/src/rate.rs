use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

/// Enforces minimum spacing between outbound sends.
///
/// Platforms with anti-spam limits (imageboards especially) reject rapid
/// posting; `acquire` blocks until at least the configured delay has passed
/// since the previous send, then records the new send time. Serialized
/// through a tokio mutex so concurrent senders queue instead of racing the
/// timestamp.
pub struct RateGate {
    min_interval: Duration,
    last_send: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_send: Mutex::new(None),
        }
    }

    /// Wait out the remainder of the spacing window, if any.
    pub async fn acquire(&self) {
        let mut last = self.last_send.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
