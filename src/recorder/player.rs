//! Replay of a recorded sequence
//!
//! Each point is denormalized at the surface's current size and replayed as
//! a pointer-down / pointer-up / click triple, followed by a fixed delay.
//! Cancellation is cooperative: nothing is interrupted mid-delay.

use crate::capture::input::dispatch::{click_at, ClickDelivery};
use crate::capture::input::types::RecordedPoint;
use crate::capture::traits::Surface;
use crate::recorder::error::{RecorderError, RecorderResult};
use crate::recorder::state::RecorderConfig;
use crate::recorder::timer::Timer;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const ABORTED: u8 = 2;

/// Shared stop request checked at replay checkpoints
///
/// [`cancel`](Self::cancel) lets a looping replay finish its current round;
/// [`abort`](Self::abort) stops at the next point.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<AtomicU8>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst);
    }

    pub fn abort(&self) {
        self.state.store(ABORTED, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) != RUNNING
    }

    pub fn is_aborted(&self) -> bool {
        self.state.load(Ordering::SeqCst) == ABORTED
    }
}

/// Progress notifications emitted while replaying
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackProgress {
    /// A looping replay started round `n` (1-based)
    Round(u32),
    /// About to replay point `index` of `total` at intrinsic pixel `(x, y)`
    Point {
        index: usize,
        total: usize,
        x: f64,
        y: f64,
    },
}

/// Summary of a finished replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    pub rounds: u32,
    pub clicks: usize,
    pub fallbacks: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Checkpoint {
    /// Any stop request ends the pass
    AnyStop,
    /// Only an abort ends the round; a plain cancel lets it drain
    AbortOnly,
}

impl Checkpoint {
    fn should_stop(&self, token: &CancellationToken) -> bool {
        match self {
            Checkpoint::AnyStop => token.is_cancelled(),
            Checkpoint::AbortOnly => token.is_aborted(),
        }
    }
}

#[derive(Debug, Default)]
struct RoundOutcome {
    clicks: usize,
    fallbacks: usize,
    interrupted: bool,
}

async fn play_round<S, T>(
    points: &[RecordedPoint],
    surface: &S,
    timer: &T,
    config: &RecorderConfig,
    token: &CancellationToken,
    checkpoint: Checkpoint,
    progress: &mut dyn FnMut(PlaybackProgress),
) -> RecorderResult<RoundOutcome>
where
    S: Surface,
    T: Timer + ?Sized,
{
    let mut outcome = RoundOutcome::default();
    let total = points.len();

    for (index, point) in points.iter().enumerate() {
        if checkpoint.should_stop(token) {
            tracing::info!("Replay stopped before point {}/{}", index + 1, total);
            outcome.interrupted = true;
            break;
        }

        let size = surface.size();
        let Some((x, y)) = size.from_percent(point.x, point.y) else {
            tracing::warn!(
                "Skipping point {}: surface is {} x {}",
                index + 1,
                size.width,
                size.height
            );
            continue;
        };

        tracing::debug!("Replaying {}/{}: ({:.0}, {:.0})", index + 1, total, x, y);
        progress(PlaybackProgress::Point { index, total, x, y });

        let delivery = click_at(surface, timer, x, y, config.intra_event_delay())
            .await
            .map_err(|e| {
                tracing::warn!("Click {} failed, stopping replay: {}", index + 1, e);
                RecorderError::EventDispatchFailure {
                    index,
                    reason: e.to_string(),
                }
            })?;

        outcome.clicks += 1;
        if delivery == ClickDelivery::Fallback {
            outcome.fallbacks += 1;
        }

        timer.sleep(config.click_delay()).await;
    }

    Ok(outcome)
}

/// Replay `points` once, in order
pub async fn play_once<S, T>(
    points: &[RecordedPoint],
    surface: &S,
    timer: &T,
    config: &RecorderConfig,
    token: &CancellationToken,
    progress: &mut dyn FnMut(PlaybackProgress),
) -> RecorderResult<PlaybackReport>
where
    S: Surface,
    T: Timer + ?Sized,
{
    if points.is_empty() {
        return Err(RecorderError::EmptySequence);
    }

    tracing::info!("Replaying {} points", points.len());
    let outcome = play_round(
        points,
        surface,
        timer,
        config,
        token,
        Checkpoint::AnyStop,
        progress,
    )
    .await?;
    tracing::info!("Replay finished ({} clicks)", outcome.clicks);

    Ok(PlaybackReport {
        rounds: 1,
        clicks: outcome.clicks,
        fallbacks: outcome.fallbacks,
        cancelled: token.is_cancelled(),
    })
}

/// Replay `points` in rounds until `token` is cancelled
///
/// A cancel is observed between rounds, after the inter-round delay; an abort
/// is also observed before every point.
pub async fn play_loop<S, T>(
    points: &[RecordedPoint],
    surface: &S,
    timer: &T,
    config: &RecorderConfig,
    token: &CancellationToken,
    progress: &mut dyn FnMut(PlaybackProgress),
) -> RecorderResult<PlaybackReport>
where
    S: Surface,
    T: Timer + ?Sized,
{
    if points.is_empty() {
        return Err(RecorderError::EmptySequence);
    }

    tracing::info!("Starting looped replay of {} points", points.len());
    let mut report = PlaybackReport::default();

    while !token.is_cancelled() {
        report.rounds += 1;
        tracing::info!("===== Round {} =====", report.rounds);
        progress(PlaybackProgress::Round(report.rounds));

        let outcome = play_round(
            points,
            surface,
            timer,
            config,
            token,
            Checkpoint::AbortOnly,
            progress,
        )
        .await?;
        report.clicks += outcome.clicks;
        report.fallbacks += outcome.fallbacks;

        if outcome.interrupted {
            break;
        }
        timer.sleep(config.loop_delay()).await;
    }

    report.cancelled = true;
    tracing::info!(
        "Looped replay stopped after {} rounds ({} clicks)",
        report.rounds,
        report.clicks
    );
    Ok(report)
}

/// A replay detached from the session that started it
///
/// Holds a snapshot of the sequence and the surface handle so the session
/// stays free for stop requests while the replay is awaited.
#[derive(Debug, Clone)]
pub struct Playback<S> {
    points: Vec<RecordedPoint>,
    surface: S,
    looping: bool,
    config: RecorderConfig,
    token: CancellationToken,
}

impl<S: Surface> Playback<S> {
    pub fn new(
        points: Vec<RecordedPoint>,
        surface: Option<S>,
        looping: bool,
        config: RecorderConfig,
    ) -> RecorderResult<Self> {
        if points.is_empty() {
            return Err(RecorderError::EmptySequence);
        }
        let surface = surface.ok_or(RecorderError::SurfaceNotFound)?;
        Ok(Self {
            points,
            surface,
            looping,
            config,
            token: CancellationToken::new(),
        })
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub async fn run<T: Timer + ?Sized>(
        &self,
        timer: &T,
        progress: &mut dyn FnMut(PlaybackProgress),
    ) -> RecorderResult<PlaybackReport> {
        if self.looping {
            play_loop(
                &self.points,
                &self.surface,
                timer,
                &self.config,
                &self.token,
                progress,
            )
            .await
        } else {
            play_once(
                &self.points,
                &self.surface,
                timer,
                &self.config,
                &self.token,
                progress,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::EventKind;
    use crate::capture::testing::FakeSurface;
    use crate::recorder::timer::TokioTimer;
    use std::time::Duration;

    fn points() -> Vec<RecordedPoint> {
        vec![
            RecordedPoint::new(10.0, 12.5),
            RecordedPoint::new(50.0, 12.5),
            RecordedPoint::new(90.0, 90.0),
        ]
    }

    fn ignore(_: PlaybackProgress) {}

    #[tokio::test(start_paused = true)]
    async fn test_play_once_denormalizes_at_current_size() {
        let surface = FakeSurface::new(2000.0, 1600.0);
        let timer = TokioTimer::new();
        let token = CancellationToken::new();

        let report = play_once(
            &points()[..2],
            &surface,
            &timer,
            &RecorderConfig::default(),
            &token,
            &mut ignore,
        )
        .await
        .unwrap();

        assert_eq!(report.clicks, 2);
        assert_eq!(surface.clicks(), vec![(200.0, 200.0), (1000.0, 200.0)]);
        // two points x (50 + 50 + 300)
        assert_eq!(timer.now(), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_once_reports_progress() {
        let surface = FakeSurface::new(1000.0, 800.0);
        let timer = TokioTimer::new();
        let mut seen = Vec::new();

        play_once(
            &points(),
            &surface,
            &timer,
            &RecorderConfig::default(),
            &CancellationToken::new(),
            &mut |p| seen.push(p),
        )
        .await
        .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[1],
            PlaybackProgress::Point {
                index: 1,
                total: 3,
                x: 500.0,
                y: 100.0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_once_empty_sequence() {
        let surface = FakeSurface::new(1000.0, 800.0);
        let result = play_once(
            &[],
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &CancellationToken::new(),
            &mut ignore,
        )
        .await;
        assert!(matches!(result, Err(RecorderError::EmptySequence)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_once_stops_at_next_point_when_cancelled() {
        let surface = FakeSurface::new(1000.0, 800.0);
        let token = CancellationToken::new();
        surface.cancel_after_clicks(1, token.clone());

        let report = play_once(
            &points(),
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &token,
            &mut ignore,
        )
        .await
        .unwrap();

        assert_eq!(report.clicks, 1);
        assert!(report.cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_failure_aborts_pass() {
        let surface = FakeSurface::new(1000.0, 800.0);
        surface.fail_on(EventKind::Click);
        surface.break_fallback();

        let result = play_once(
            &points(),
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &CancellationToken::new(),
            &mut ignore,
        )
        .await;

        match result {
            Err(RecorderError::EventDispatchFailure { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected dispatch failure, got {:?}", other),
        }
        // down and up went out before the click failed
        assert_eq!(surface.events().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_keeps_pass_going() {
        let surface = FakeSurface::new(1000.0, 800.0);
        surface.fail_on(EventKind::PointerDown);

        let report = play_once(
            &points(),
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &CancellationToken::new(),
            &mut ignore,
        )
        .await
        .unwrap();

        assert_eq!(report.clicks, 3);
        assert_eq!(report.fallbacks, 3);
        assert_eq!(surface.fallback_clicks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degenerate_surface_skips_points() {
        let surface = FakeSurface::new(0.0, 0.0);
        let report = play_once(
            &points(),
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &CancellationToken::new(),
            &mut ignore,
        )
        .await
        .unwrap();
        assert_eq!(report.clicks, 0);
        assert!(surface.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_cancel_drains_current_round() {
        let surface = FakeSurface::new(1000.0, 800.0);
        let timer = TokioTimer::new();
        let token = CancellationToken::new();
        // Stop requested mid-way through round 2
        surface.cancel_after_clicks(4, token.clone());
        let mut rounds = Vec::new();

        let report = play_loop(
            &points(),
            &surface,
            &timer,
            &RecorderConfig::default(),
            &token,
            &mut |p| {
                if let PlaybackProgress::Round(n) = p {
                    rounds.push(n);
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(rounds, vec![1, 2]);
        assert_eq!(report.rounds, 2);
        assert_eq!(report.clicks, 6);
        assert!(report.cancelled);
        // 2 x (3 x 400ms + 2000ms)
        assert_eq!(timer.now(), Duration::from_millis(6400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_abort_stops_at_next_point() {
        let surface = FakeSurface::new(1000.0, 800.0);
        let token = CancellationToken::new();
        surface.abort_after_clicks(4, token.clone());

        let report = play_loop(
            &points(),
            &surface,
            &TokioTimer::new(),
            &RecorderConfig::default(),
            &token,
            &mut ignore,
        )
        .await
        .unwrap();

        assert_eq!(report.rounds, 2);
        assert_eq!(report.clicks, 4);
    }

    #[test]
    fn test_token_cancel_does_not_downgrade_abort() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.abort();
        token.cancel();
        assert!(token.is_aborted());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_playback_preconditions() {
        let empty = Playback::new(
            vec![],
            Some(FakeSurface::new(10.0, 20.0)),
            false,
            RecorderConfig::default(),
        );
        assert!(matches!(empty, Err(RecorderError::EmptySequence)));

        let missing =
            Playback::<FakeSurface>::new(points(), None, true, RecorderConfig::default());
        assert!(matches!(missing, Err(RecorderError::SurfaceNotFound)));
    }
}
