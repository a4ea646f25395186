//! Surface discovery and input synthesis
//!
//! This module finds the rendering surface and turns recorded positions
//! back into pointer events against it.

pub mod input;
pub mod locator;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use locator::{locate, wait_for_surface, Backoff, RetryPolicy};
pub use traits::{Rect, Surface, SurfaceProvider, ViewportOffsets};
