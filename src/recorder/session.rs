//! Recorder session
//!
//! Owns everything the tool knows for the lifetime of a page: the sequence,
//! the located surface, the current mode and the overlay state. Every
//! operator command goes through here, and every failure ends up as a
//! status line rather than an error escaping to the page.

use crate::capture::input::types::{PointerClick, RecordedPoint};
use crate::capture::traits::Surface;
use crate::processing::markers::{layout_markers, Indicator, Marker, MarkerMode};
use crate::recorder::error::{RecorderError, RecorderResult};
use crate::recorder::player::{CancellationToken, Playback, PlaybackProgress, PlaybackReport};
use crate::recorder::sequence::{Admission, RecordingSequence};
use crate::recorder::state::{Mode, RecorderConfig};
use crate::recorder::store::{KeyValueStore, PersistenceStore};
use std::time::Duration;

/// What happened to a click observed on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Accepted { index: usize, point: RecordedPoint },
    Rejected { duplicate_of: usize, distance: f64 },
    /// Not recording, or no surface to measure against
    Ignored,
}

/// Result of a clear request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearStep {
    NothingToClear,
    /// First press; a second one inside the window confirms
    Armed,
    Cleared { count: usize },
}

pub struct Session<S, K> {
    config: RecorderConfig,
    store: PersistenceStore<K>,
    sequence: RecordingSequence,
    surface: Option<S>,
    mode: Mode,
    markers: MarkerMode,
    saved: bool,
    status: String,
    clear_armed_at: Option<Duration>,
    playback_token: Option<CancellationToken>,
    indicators: Vec<Indicator>,
}

impl<S, K> Session<S, K>
where
    S: Surface,
    K: KeyValueStore,
{
    pub fn new(backend: K, config: RecorderConfig) -> Self {
        let store = PersistenceStore::with_key(backend, config.storage_key.clone());
        Self {
            config,
            store,
            sequence: RecordingSequence::new(),
            surface: None,
            mode: Mode::Idle,
            markers: MarkerMode::Hidden,
            saved: false,
            status: "Waiting for canvas...".to_string(),
            clear_armed_at: None,
            playback_token: None,
            indicators: Vec::new(),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn sequence(&self) -> &RecordingSequence {
        &self.sequence
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn marker_mode(&self) -> MarkerMode {
        self.markers
    }

    /// Whether the in-memory sequence matches the persisted snapshot
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Restore the persisted snapshot, replacing the in-memory sequence
    pub fn load(&mut self) -> usize {
        self.sequence = self.store.load();
        let count = self.sequence.len();
        if count > 0 {
            self.saved = true;
            self.markers = MarkerMode::ReadOnly;
            tracing::info!("Restored previous recording ({} clicks)", count);
        }
        count
    }

    pub fn attach_surface(&mut self, surface: S) {
        let size = surface.size();
        tracing::info!("Attached surface {} x {}", size.width, size.height);
        self.surface = Some(surface);
        self.status = if self.sequence.is_empty() {
            "Ready".to_string()
        } else {
            format!("Loaded: {} clicks", self.sequence.len())
        };
    }

    /// Forget the surface, e.g. after it was removed from the document
    pub fn detach_surface(&mut self) -> Option<S> {
        self.status = "Waiting for canvas...".to_string();
        self.surface.take()
    }

    /// Detach the surface if its handle no longer refers to a live surface
    pub fn release_detached_surface(&mut self) -> Option<S> {
        if self.surface.as_ref().is_some_and(|s| !s.is_attached()) {
            tracing::info!("Surface was removed, waiting for a new one");
            return self.detach_surface();
        }
        None
    }

    fn ensure_idle(&self) -> RecorderResult<()> {
        match self.mode {
            Mode::Idle => Ok(()),
            Mode::Recording { .. } => Err(RecorderError::AlreadyRecording),
            Mode::Replaying { .. } => Err(RecorderError::PlaybackActive),
        }
    }

    fn fail<T>(&mut self, err: RecorderError) -> RecorderResult<T> {
        tracing::warn!("{}", err);
        self.status = status_for(&err);
        Err(err)
    }

    fn persist(&mut self) {
        match self.store.save(&self.sequence) {
            Ok(()) => self.saved = true,
            Err(e) => {
                tracing::warn!("Keeping recording in memory only: {}", e);
                self.saved = false;
            }
        }
    }

    fn leave_edit_mode(&mut self) {
        if self.markers == MarkerMode::Editable {
            self.markers = MarkerMode::ReadOnly;
        }
    }

    fn show_markers_if_any(&mut self) {
        self.markers = if self.sequence.is_empty() {
            MarkerMode::Hidden
        } else {
            MarkerMode::ReadOnly
        };
    }

    /// Start recording; `append` keeps the existing clicks
    pub fn start_recording(&mut self, append: bool) -> RecorderResult<()> {
        if let Err(e) = self.ensure_idle() {
            return self.fail(e);
        }
        if self.surface.is_none() {
            return self.fail(RecorderError::SurfaceNotFound);
        }
        if append && self.sequence.is_empty() {
            return self.fail(RecorderError::EmptySequence);
        }

        if append {
            tracing::info!("Appending to recording with {} clicks", self.sequence.len());
            self.status = "Appending...".to_string();
        } else {
            self.sequence.clear();
            self.saved = false;
            tracing::info!("Recording started");
            self.status = "Recording...".to_string();
        }

        self.clear_armed_at = None;
        self.markers = MarkerMode::ReadOnly;
        self.mode = Mode::Recording { append };
        Ok(())
    }

    /// Stop recording and save; returns the number of recorded clicks
    pub fn stop_recording(&mut self) -> RecorderResult<usize> {
        if !self.mode.is_recording() {
            return self.fail(RecorderError::NotRecording);
        }

        self.mode = Mode::Idle;
        self.persist();
        self.show_markers_if_any();

        let count = self.sequence.len();
        tracing::info!("Recording finished: {} clicks", count);
        self.status = format!("Recording finished: {} clicks", count);
        Ok(count)
    }

    /// Offer a click on the surface to the recording
    pub fn handle_click(&mut self, click: PointerClick) -> RecorderResult<ClickOutcome> {
        if !self.mode.is_recording() {
            return Ok(ClickOutcome::Ignored);
        }
        let Some(surface) = &self.surface else {
            tracing::warn!("Click while recording but no surface attached");
            return Ok(ClickOutcome::Ignored);
        };

        let rect = surface.bounding_rect();
        let size = surface.size();
        let x = click.client_x - rect.left;
        let y = click.client_y - rect.top;

        let admission = match self
            .sequence
            .try_record(x, y, size, self.config.min_distance)
        {
            Ok(admission) => admission,
            Err(e) => return self.fail(e),
        };

        match admission {
            Admission::Rejected {
                duplicate_of,
                distance,
            } => {
                tracing::debug!(
                    "Click too close to #{} ({:.0}px), ignored",
                    duplicate_of + 1,
                    distance
                );
                self.status = format!(
                    "Ignored duplicate click (#{} is {:.0}px away)",
                    duplicate_of + 1,
                    distance
                );
                self.indicators
                    .push(Indicator::rejected(click.client_x, click.client_y));
                Ok(ClickOutcome::Rejected {
                    duplicate_of,
                    distance,
                })
            }
            Admission::Accepted { index, point } => {
                tracing::debug!(
                    "Recorded click #{}: ({:.2}%, {:.2}%)",
                    index + 1,
                    point.x,
                    point.y
                );
                self.saved = false;
                self.status = format!("Recorded: {} clicks", self.sequence.len());
                self.indicators
                    .push(Indicator::accepted(click.client_x, click.client_y));
                Ok(ClickOutcome::Accepted { index, point })
            }
        }
    }

    /// Snapshot the sequence into a replay the caller drives to completion
    pub fn begin_playback(&mut self, looping: bool) -> RecorderResult<Playback<S>> {
        if let Err(e) = self.ensure_idle() {
            return self.fail(e);
        }
        let playback = match Playback::new(
            self.sequence.points().to_vec(),
            self.surface.clone(),
            looping,
            self.config.clone(),
        ) {
            Ok(playback) => playback,
            Err(e) => return self.fail(e),
        };

        self.leave_edit_mode();
        self.clear_armed_at = None;
        self.playback_token = Some(playback.token());
        self.mode = Mode::Replaying {
            looping,
            stopping: false,
        };
        self.status = if looping {
            "Looping...".to_string()
        } else {
            "Replaying...".to_string()
        };
        Ok(playback)
    }

    /// Request a stop; a second request while stopping aborts at the next point
    pub fn stop_playback(&mut self) -> bool {
        let Mode::Replaying { looping, stopping } = self.mode else {
            return false;
        };
        let Some(token) = &self.playback_token else {
            return false;
        };

        if stopping {
            token.abort();
            tracing::info!("Replay aborted");
            self.status = "Stopped".to_string();
        } else {
            token.cancel();
            tracing::info!("Replay stop requested");
            self.status = if looping {
                "Stopping after this round...".to_string()
            } else {
                "Stopping...".to_string()
            };
        }
        self.mode = Mode::Replaying {
            looping,
            stopping: true,
        };
        true
    }

    pub fn report_progress(&mut self, progress: PlaybackProgress) {
        if matches!(self.mode, Mode::Replaying { stopping: true, .. }) {
            return;
        }
        self.status = match progress {
            PlaybackProgress::Round(n) => format!("Loop round {}...", n),
            PlaybackProgress::Point { index, total, .. } => {
                format!("Replaying: {}/{}", index + 1, total)
            }
        };
    }

    /// Return to idle once the replay future has completed
    pub fn finish_playback(&mut self, result: &RecorderResult<PlaybackReport>) {
        let looping = matches!(self.mode, Mode::Replaying { looping: true, .. });
        self.mode = Mode::Idle;
        self.playback_token = None;

        match result {
            Ok(report) if looping => {
                self.status = format!(
                    "Stopped after {} rounds ({} clicks)",
                    report.rounds, report.clicks
                );
            }
            Ok(report) => {
                self.show_markers_if_any();
                self.status = if report.cancelled {
                    "Stopped".to_string()
                } else {
                    "Replay finished".to_string()
                };
            }
            Err(e) => {
                tracing::warn!("Replay failed: {}", e);
                self.status = status_for(e);
            }
        }
    }

    pub fn toggle_markers(&mut self) -> MarkerMode {
        self.markers = match self.markers {
            MarkerMode::Hidden if self.sequence.is_empty() => {
                self.status = "No recording data".to_string();
                MarkerMode::Hidden
            }
            MarkerMode::Hidden => {
                self.status = "Showing markers".to_string();
                MarkerMode::ReadOnly
            }
            MarkerMode::ReadOnly | MarkerMode::Editable => {
                self.status = "Ready".to_string();
                MarkerMode::Hidden
            }
        };
        self.markers
    }

    pub fn toggle_edit(&mut self) -> RecorderResult<MarkerMode> {
        if let Err(e) = self.ensure_idle() {
            return self.fail(e);
        }

        if self.markers == MarkerMode::Editable {
            self.show_markers_if_any();
            self.status = if self.markers.is_visible() {
                "Showing markers".to_string()
            } else {
                "Ready".to_string()
            };
        } else if self.sequence.is_empty() {
            self.status = "No recording data".to_string();
        } else {
            self.markers = MarkerMode::Editable;
            self.status = "Click a marker to delete it".to_string();
        }
        Ok(self.markers)
    }

    /// Delete the point at `index` (edit mode only) and save
    pub fn delete_point(&mut self, index: usize) -> RecorderResult<RecordedPoint> {
        if let Err(e) = self.ensure_idle() {
            return self.fail(e);
        }
        if self.markers != MarkerMode::Editable {
            return self.fail(RecorderError::NotEditing);
        }

        let removed = match self.sequence.remove(index) {
            Ok(point) => point,
            Err(e) => return self.fail(e),
        };
        tracing::info!("Deleted click #{}", index + 1);

        if self.sequence.is_empty() {
            if let Err(e) = self.store.clear() {
                tracing::warn!("Failed to clear stored recording: {}", e);
            }
            self.saved = false;
            self.markers = MarkerMode::Hidden;
        } else {
            self.persist();
        }
        self.status = format!("Deleted, {} remaining", self.sequence.len());
        Ok(removed)
    }

    /// Two-step clear: arm on the first press, clear on a second press
    /// inside the confirmation window
    pub fn request_clear(&mut self, now: Duration) -> RecorderResult<ClearStep> {
        if let Err(e) = self.ensure_idle() {
            return self.fail(e);
        }

        let count = self.sequence.len();
        if count == 0 {
            self.clear_armed_at = None;
            self.status = "Nothing to clear".to_string();
            return Ok(ClearStep::NothingToClear);
        }

        let window = self.config.clear_confirm_window();
        match self.clear_armed_at {
            Some(armed) if now.saturating_sub(armed) < window => {
                self.clear_armed_at = None;
                self.sequence.clear();
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Failed to clear stored recording: {}", e);
                }
                self.saved = false;
                self.markers = MarkerMode::Hidden;
                self.status = "Cleared".to_string();
                tracing::info!("Cleared {} recorded clicks", count);
                Ok(ClearStep::Cleared { count })
            }
            _ => {
                self.clear_armed_at = Some(now);
                self.status = "Press clear again to confirm".to_string();
                Ok(ClearStep::Armed)
            }
        }
    }

    /// Disarm a pending clear once its window has passed
    pub fn expire_clear(&mut self, now: Duration) -> bool {
        match self.clear_armed_at {
            Some(armed) if now.saturating_sub(armed) >= self.config.clear_confirm_window() => {
                self.clear_armed_at = None;
                self.status = "Clear cancelled".to_string();
                true
            }
            _ => false,
        }
    }

    pub fn is_clear_armed(&self) -> bool {
        self.clear_armed_at.is_some()
    }

    /// Markers for the current overlay mode
    pub fn markers(&self) -> Vec<Marker> {
        match &self.surface {
            Some(surface) => layout_markers(
                self.sequence.points(),
                surface.size(),
                surface.bounding_rect(),
                self.markers,
            ),
            None => Vec::new(),
        }
    }

    /// Indicators raised since the last call
    pub fn take_indicators(&mut self) -> Vec<Indicator> {
        std::mem::take(&mut self.indicators)
    }
}

/// Status line shown for an error
pub fn status_for(err: &RecorderError) -> String {
    match err {
        RecorderError::SurfaceNotFound => {
            "Canvas not found, waiting for the game to load".to_string()
        }
        RecorderError::EmptySequence => "Nothing recorded yet, start a new recording".to_string(),
        RecorderError::EventDispatchFailure { index, .. } => {
            format!("Click #{} failed, replay stopped", index + 1)
        }
        other => format!("Error: {}", other),
    }
}
