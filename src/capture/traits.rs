//! Surface abstraction
//!
//! A surface is the rendering element recorded points are relative to. The
//! browser layer implements these traits for `<canvas>` elements; tests use
//! in-memory fakes.

use crate::capture::input::types::SyntheticEvent;
use crate::processing::normalize::SurfaceSize;
use crate::recorder::error::DispatchError;
use serde::{Deserialize, Serialize};

/// Bounding box of a surface in client (viewport) coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Offsets needed to turn client coordinates into page and screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportOffsets {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
}

/// A located rendering surface
///
/// Handles are cheap to clone and must not be assumed stable across
/// navigation; the session re-resolves them through the locator.
pub trait Surface: Clone {
    /// Intrinsic size (the backing-store width/height, not the CSS box)
    fn size(&self) -> SurfaceSize;

    /// Whether the handle still refers to a live surface
    fn is_attached(&self) -> bool {
        true
    }

    /// Current bounding box in client coordinates
    fn bounding_rect(&self) -> Rect;

    /// Scroll and window offsets at the time of the call
    fn viewport_offsets(&self) -> ViewportOffsets {
        ViewportOffsets::default()
    }

    /// Dispatch one synthesized event at the surface
    fn dispatch(&self, event: &SyntheticEvent) -> Result<(), DispatchError>;

    /// Simplified click used when full event synthesis fails
    fn fallback_click(&self) -> Result<(), DispatchError>;

    /// Pixel area used to rank candidates
    fn area(&self) -> f64 {
        let size = self.size();
        size.width * size.height
    }
}

/// Enumerates candidate surfaces in document order
pub trait SurfaceProvider {
    type Surface: Surface;

    fn candidates(&self) -> Vec<Self::Surface>;
}
