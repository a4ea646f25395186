//! Target surface discovery
//!
//! The game creates its canvas asynchronously, so lookups are retried on a
//! timer until a qualifying surface shows up.

use crate::capture::traits::{Surface, SurfaceProvider};
use crate::recorder::error::{RecorderError, RecorderResult};
use crate::recorder::timer::Timer;
use std::time::Duration;

/// Candidates at or below this area are placeholders and never selected
pub const MIN_SURFACE_AREA: f64 = 100.0;

/// Default polling interval while waiting for the surface
pub const DEFAULT_LOCATE_INTERVAL: Duration = Duration::from_millis(500);

/// Pick the largest qualifying surface; the first one wins ties
pub fn locate<S: Surface>(candidates: impl IntoIterator<Item = S>) -> Option<S> {
    let mut best: Option<(f64, S)> = None;
    for candidate in candidates {
        let area = candidate.area();
        if !area.is_finite() || area <= MIN_SURFACE_AREA {
            continue;
        }
        match &best {
            Some((best_area, _)) if area <= *best_area => {}
            _ => best = Some((area, candidate)),
        }
    }
    best.map(|(_, surface)| surface)
}

/// How the interval between lookups evolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed,
    Exponential { factor: f64, max_interval: Duration },
}

/// Retry schedule for [`wait_for_surface`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    /// `None` keeps polling until the surface appears
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_LOCATE_INTERVAL)
    }
}

impl RetryPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff: Backoff::Fixed,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    fn next_interval(&self, current: Duration) -> Duration {
        match self.backoff {
            Backoff::Fixed => current,
            Backoff::Exponential {
                factor,
                max_interval,
            } => {
                let grown = current.as_secs_f64() * factor.max(1.0);
                Duration::try_from_secs_f64(grown)
                    .unwrap_or(max_interval)
                    .min(max_interval)
            }
        }
    }
}

/// Poll `provider` until a qualifying surface is found
pub async fn wait_for_surface<P, T>(
    provider: &P,
    timer: &T,
    policy: RetryPolicy,
) -> RecorderResult<P::Surface>
where
    P: SurfaceProvider,
    T: Timer + ?Sized,
{
    let mut interval = policy.interval;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Some(surface) = locate(provider.candidates()) {
            let size = surface.size();
            tracing::info!(
                "Surface found: {} x {} (attempt {})",
                size.width,
                size.height,
                attempts
            );
            return Ok(surface);
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            tracing::warn!("Surface not found after {} attempts", attempts);
            return Err(RecorderError::SurfaceNotFound);
        }

        tracing::debug!("Surface not found, retrying in {:?}", interval);
        timer.sleep(interval).await;
        interval = policy.next_interval(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::{FakeProvider, FakeSurface};
    use crate::recorder::timer::TokioTimer;

    #[test]
    fn test_locate_picks_largest() {
        let small = FakeSurface::new(300.0, 150.0);
        let large = FakeSurface::new(1280.0, 720.0);
        let found = locate(vec![small, large]).unwrap();
        assert_eq!(found.size().width, 1280.0);
    }

    #[test]
    fn test_locate_filters_degenerate() {
        let placeholders = vec![
            FakeSurface::new(0.0, 0.0),
            FakeSurface::new(10.0, 10.0),
            FakeSurface::new(1.0, 50.0),
        ];
        assert!(locate(placeholders).is_none());
        assert!(locate(Vec::<FakeSurface>::new()).is_none());
    }

    #[test]
    fn test_locate_ties_keep_first() {
        let first = FakeSurface::new(200.0, 100.0);
        let second = FakeSurface::new(100.0, 200.0);
        let found = locate(vec![first, second]).unwrap();
        assert_eq!(found.size().width, 200.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_surface_retries_until_ready() {
        let provider = FakeProvider::ready_after(vec![FakeSurface::new(800.0, 600.0)], 3);
        let timer = TokioTimer::new();

        let surface = wait_for_surface(&provider, &timer, RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(surface.size().height, 600.0);
        assert_eq!(*provider.calls.borrow(), 4);
        assert_eq!(timer.now(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_surface_gives_up() {
        let provider = FakeProvider::new(vec![]);
        let timer = TokioTimer::new();
        let policy = RetryPolicy::default().with_max_attempts(2);

        let result = wait_for_surface(&provider, &timer, policy).await;
        assert!(matches!(result, Err(RecorderError::SurfaceNotFound)));
        assert_eq!(*provider.calls.borrow(), 2);
    }

    fn exponential(factor: f64, max_interval: Duration) -> RetryPolicy {
        let backoff = Backoff::Exponential {
            factor,
            max_interval,
        };
        RetryPolicy::fixed(Duration::from_millis(500))
            .with_backoff(backoff)
    }

    #[test]
    fn test_backoff_growth_never_overflows() {
        let start = Duration::from_millis(500);

        let infinite = exponential(f64::INFINITY, Duration::from_secs(5));
        assert_eq!(infinite.next_interval(start), Duration::from_secs(5));

        let unbounded = exponential(1e12, Duration::MAX);
        let mut interval = start;
        for _ in 0..4 {
            interval = unbounded.next_interval(interval);
        }
        assert_eq!(interval, Duration::MAX);

        // Factors below one never shrink the interval
        let shrinking = exponential(0.5, Duration::from_secs(5));
        assert_eq!(shrinking.next_interval(start), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_backoff_is_capped() {
        let provider = FakeProvider::ready_after(vec![FakeSurface::new(800.0, 600.0)], 4);
        let timer = TokioTimer::new();
        let backoff = Backoff::Exponential {
            factor: 2.0,
            max_interval: Duration::from_millis(300),
        };
        let policy = RetryPolicy::fixed(Duration::from_millis(100))
            .with_backoff(backoff);

        wait_for_surface(&provider, &timer, policy).await.unwrap();
        // 100 + 200 + 300 + 300
        assert_eq!(timer.now(), Duration::from_millis(900));
    }
}
