use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Time source for the poller
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since an arbitrary origin
    fn now(&self) -> Duration;

    /// Waits for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
