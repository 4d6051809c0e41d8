use std::{future::Future, time::Duration};

use {
    chrono::{DateTime, Utc},
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

/// True when `timestamp` falls inside the trailing recency window.
///
/// With no persisted cursor this filter is the only de-duplication
/// mechanism, so re-delivery across restarts or overlapping windows is
/// possible.
pub fn within_window(timestamp: DateTime<Utc>, window: Duration) -> bool {
    let age = Utc::now().signed_duration_since(timestamp);
    age.to_std().map(|age| age <= window).unwrap_or(true)
}

/// Spawn a cancellable fetch-and-dispatch loop.
///
/// The token is observed at the top of every tick and again during the
/// sleep, so cancellation takes effect within one interval at worst. A tick
/// that errors internally must swallow the error itself — the loop never
/// stops on its own.
pub fn spawn_poll_loop<F, Fut>(
    platform: &'static str,
    interval: Duration,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        info!(platform, interval_secs = interval.as_secs(), "polling loop started");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            tick().await;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {},
            }
        }
        debug!(platform, "polling loop stopped");
    })
}
