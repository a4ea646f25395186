//! Pointer input types and event synthesis
//!
//! Recorded clicks come in as [`PointerClick`]s and go back out as a
//! pointer-down / pointer-up / click triple of [`SyntheticEvent`]s.

pub mod dispatch;
pub mod types;

pub use dispatch::{click_at, synthesize, ClickDelivery};
pub use types::{EventKind, PointerClick, RecordedPoint, SyntheticEvent};
