//! Coordinate normalization
//!
//! Recorded points are stored as percentages of the surface's intrinsic
//! size so a recording replays correctly when the game is later rendered at
//! a different resolution.

use serde::{Deserialize, Serialize};

/// Intrinsic surface dimensions in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are usable as divisors
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn to_percent(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        to_percent(x, y, self.width, self.height)
    }

    pub fn from_percent(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        from_percent(px, py, self.width, self.height)
    }
}

/// Convert pixel coordinates to percentages of the surface size
///
/// Returns `None` when either dimension is not a positive finite number.
pub fn to_percent(x: f64, y: f64, width: f64, height: f64) -> Option<(f64, f64)> {
    if !SurfaceSize::new(width, height).is_valid() {
        return None;
    }
    Some((x / width * 100.0, y / height * 100.0))
}

/// Convert percentages back to pixel coordinates at the given surface size
pub fn from_percent(px: f64, py: f64, width: f64, height: f64) -> Option<(f64, f64)> {
    if !SurfaceSize::new(width, height).is_valid() {
        return None;
    }
    Some((px / 100.0 * width, py / 100.0 * height))
}

/// Euclidean distance between two pixel positions
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_percent() {
        assert_eq!(to_percent(100.0, 100.0, 1000.0, 800.0), Some((10.0, 12.5)));
        assert_eq!(to_percent(500.0, 100.0, 1000.0, 800.0), Some((50.0, 12.5)));
    }

    #[test]
    fn test_from_percent_scales_to_new_size() {
        let first = from_percent(10.0, 12.5, 2000.0, 1600.0);
        assert_eq!(first, Some((200.0, 200.0)));
        let second = from_percent(50.0, 12.5, 2000.0, 1600.0);
        assert_eq!(second, Some((1000.0, 200.0)));
    }

    #[test]
    fn test_degenerate_dimensions_are_skipped() {
        assert_eq!(to_percent(1.0, 1.0, 0.0, 10.0), None);
        assert_eq!(to_percent(1.0, 1.0, 10.0, -5.0), None);
        assert_eq!(from_percent(1.0, 1.0, f64::NAN, 10.0), None);
        assert!(!SurfaceSize::new(f64::INFINITY, 10.0).is_valid());
    }

    #[test]
    fn test_distance() {
        let d = distance((102.0, 101.0), (100.0, 100.0));
        assert!((d - 5.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            x in -1.0e4f64..1.0e4,
            y in -1.0e4f64..1.0e4,
            w in 0.5f64..1.0e4,
            h in 0.5f64..1.0e4,
        ) {
            let (px, py) = to_percent(x, y, w, h).unwrap();
            let (rx, ry) = from_percent(px, py, w, h).unwrap();
            prop_assert!((rx - x).abs() <= 1e-9 * x.abs().max(1.0));
            prop_assert!((ry - y).abs() <= 1e-9 * y.abs().max(1.0));
        }
    }
}
