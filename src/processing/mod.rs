//! Coordinate processing
//!
//! Normalization between pixel and percentage space, and the marker overlay
//! layout derived from it.

pub mod markers;
pub mod normalize;

pub use markers::{layout_markers, Indicator, IndicatorKind, Marker, MarkerMode};
pub use normalize::{distance, from_percent, to_percent, SurfaceSize};
