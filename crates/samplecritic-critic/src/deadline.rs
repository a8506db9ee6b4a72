use std::time::Duration;

use samplecritic_model::CancellationToken;
use tokio::task::JoinHandle;
use tracing::trace;

/// A cancellation token paired with a timer that fires it.
///
/// The timer is armed on construction and released exactly once, either by
/// [`DeadlineGuard::disarm`] or when the guard is dropped.
pub struct DeadlineGuard {
    token: CancellationToken,
    timer: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl DeadlineGuard {
    /// Arm a timer that cancels the guard's token after `timeout`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            trigger.cancel();
        });

        Self {
            token,
            timer: Some(timer),
            timeout,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the deadline has passed and the token was cancelled
    pub fn fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Release the timer and report whether the deadline had fired
    pub fn disarm(mut self) -> bool {
        self.release();
        self.fired()
    }

    fn release(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            trace!(timeout_ms = self.timeout.as_millis() as u64, "Deadline timer released");
        }
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fires_after_timeout() {
        let guard = DeadlineGuard::arm(Duration::from_millis(10));
        assert!(!guard.fired());
        guard.token().cancelled().await;
        assert!(guard.fired());
        assert!(guard.disarm());
    }

    #[tokio::test]
    async fn test_disarm_before_deadline_stops_timer() {
        let guard = DeadlineGuard::arm(Duration::from_millis(20));
        let token = guard.token().clone();
        assert!(!guard.disarm());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_releases_timer() {
        let token = {
            let guard = DeadlineGuard::arm(Duration::from_millis(20));
            guard.token().clone()
        };

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!token.is_cancelled());
    }
}
