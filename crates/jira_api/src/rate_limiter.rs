//! Request pacing shared by the Jira and Tempo clients.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum gap between consecutive requests.
///
/// Clones share the same clock, so one limiter handed to both the Jira and
/// the Tempo client paces the combined request stream of a migration run.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// A limiter that never waits; used by tests and local mocks.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits out the remaining cooldown, then stamps the current call.
    pub async fn hit(&self) {
        let mut guard = self.last_call.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                let wait = self.cooldown - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "pacing request");
                sleep(wait).await;
            }
        }
        *guard = Some(Instant::now());
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
