//! Click recording and replay engine
//!
//! The [`Session`] ties together the sequence, its persisted snapshot and
//! the player. Everything here is platform independent; the browser layer
//! only supplies a surface, a key-value store and a timer.

pub mod error;
pub mod player;
pub mod sequence;
pub mod session;
pub mod state;
pub mod store;
pub mod timer;

pub use error::{DispatchError, RecorderError, RecorderResult};
pub use player::{
    play_loop, play_once, CancellationToken, Playback, PlaybackProgress, PlaybackReport,
};
pub use sequence::{Admission, RecordingSequence};
pub use session::{status_for, ClearStep, ClickOutcome, Session};
pub use state::{should_activate, Mode, RecorderConfig};
pub use store::{KeyValueStore, MemoryStore, PersistenceStore};
pub use timer::Timer;

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(not(target_arch = "wasm32"))]
pub use timer::TokioTimer;
