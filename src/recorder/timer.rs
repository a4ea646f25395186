//! Timer seam
//!
//! All pacing in the engine (event spacing, round delays, surface polling,
//! the clear confirmation window) goes through this trait so the same code
//! runs on tokio and in the browser event loop.

use async_trait::async_trait;
use std::time::Duration;

/// Source of delays and monotonic time
#[async_trait(?Send)]
pub trait Timer {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);

    /// Monotonic time elapsed since the timer was created
    fn now(&self) -> Duration;
}

/// Timer backed by the tokio time driver
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct TokioTimer {
    origin: tokio::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioTimer {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_now_tracks_sleeps() {
        let timer = TokioTimer::new();
        assert_eq!(timer.now(), Duration::ZERO);

        timer.sleep(Duration::from_millis(300)).await;
        assert_eq!(timer.now(), Duration::from_millis(300));
    }
}
