//! Recorder error taxonomy
//!
//! Every failure the engine can report. None of them is fatal to the hosting
//! page: the session turns each one into a status message.

use thiserror::Error;

/// Errors that can occur while recording or replaying
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Surface not found")]
    SurfaceNotFound,

    #[error("Nothing recorded yet")]
    EmptySequence,

    #[error("Event dispatch failed at point #{}: {reason}", .index + 1)]
    EventDispatchFailure { index: usize, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Playback in progress")]
    PlaybackActive,

    #[error("Not in edit mode")]
    NotEditing,

    #[error("Point #{} does not exist ({len} recorded)", .index + 1)]
    PointOutOfRange { index: usize, len: usize },
}

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(err: std::io::Error) -> Self {
        RecorderError::Persistence(err.to_string())
    }
}

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Failure reported by a surface when an event could not be dispatched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DispatchError(pub String);
