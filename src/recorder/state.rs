//! Recorder configuration and mode

use crate::recorder::sequence::DEFAULT_MIN_DISTANCE;
use crate::recorder::store::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key an optional configuration override is read from
pub const CONFIG_STORAGE_KEY: &str = "autoClickConfig";

/// Marker in the page URL of the frame that hosts the game
pub const FRAME_URL_MARKER: &str = "gameIframe";

/// Whether a page at `href` should get a recorder
pub fn should_activate(href: &str) -> bool {
    href.contains(FRAME_URL_MARKER)
}

/// Tunables for recording and replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Wait after each replayed point
    pub click_delay_ms: u64,
    /// Wait after each round of a looping replay
    pub loop_delay_ms: u64,
    /// Spacing between pointer-down, pointer-up and click
    pub intra_event_delay_ms: u64,
    /// Clicks closer than this (pixels) to a stored point are dropped
    pub min_distance: f64,
    /// Polling interval while waiting for the surface
    pub locate_interval_ms: u64,
    /// A second clear request within this window confirms it
    pub clear_confirm_window_ms: u64,
    pub storage_key: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            click_delay_ms: 300,
            loop_delay_ms: 2000,
            intra_event_delay_ms: 50,
            min_distance: DEFAULT_MIN_DISTANCE,
            locate_interval_ms: 500,
            clear_confirm_window_ms: 3000,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl RecorderConfig {
    /// Parse an override; missing fields keep their defaults
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    /// Like [`from_json_str`](Self::from_json_str) but never fails
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        match raw.map(Self::from_json_str) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                tracing::warn!("Ignoring malformed recorder config: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    fn sanitized(mut self) -> Self {
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            tracing::warn!(
                "min_distance {} is invalid, using {}",
                self.min_distance,
                DEFAULT_MIN_DISTANCE
            );
            self.min_distance = DEFAULT_MIN_DISTANCE;
        }
        if self.storage_key.is_empty() {
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        self
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    pub fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }

    pub fn intra_event_delay(&self) -> Duration {
        Duration::from_millis(self.intra_event_delay_ms)
    }

    pub fn locate_interval(&self) -> Duration {
        Duration::from_millis(self.locate_interval_ms)
    }

    pub fn clear_confirm_window(&self) -> Duration {
        Duration::from_millis(self.clear_confirm_window_ms)
    }
}

/// What the session is doing; recording and replaying exclude each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Mode {
    Idle,
    Recording { append: bool },
    Replaying { looping: bool, stopping: bool },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Idle
    }
}

impl Mode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Mode::Recording { .. })
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self, Mode::Replaying { .. })
    }
}
