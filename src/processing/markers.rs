//! Marker overlay model
//!
//! Computes where numbered markers for recorded points and the short-lived
//! accept/reject indicators go. Rendering is left to the DOM layer.

use crate::capture::input::types::RecordedPoint;
use crate::capture::traits::Rect;
use crate::processing::normalize::SurfaceSize;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How recorded points are shown over the surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerMode {
    #[default]
    Hidden,
    ReadOnly,
    /// Clicking a marker deletes its point
    Editable,
}

impl MarkerMode {
    pub fn is_visible(&self) -> bool {
        !matches!(self, MarkerMode::Hidden)
    }
}

/// A numbered marker centred on a recorded point, in client coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub index: usize,
    pub label: String,
    pub client_x: f64,
    pub client_y: f64,
    pub editable: bool,
}

/// Lay out one marker per point; empty when hidden or the size is unusable
pub fn layout_markers(
    points: &[RecordedPoint],
    size: SurfaceSize,
    rect: Rect,
    mode: MarkerMode,
) -> Vec<Marker> {
    if !mode.is_visible() {
        return Vec::new();
    }

    points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let (x, y) = size.from_percent(point.x, point.y)?;
            Some(Marker {
                index,
                label: (index + 1).to_string(),
                client_x: rect.left + x,
                client_y: rect.top + y,
                editable: mode == MarkerMode::Editable,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    Accepted,
    Rejected,
}

/// Transient ring shown where a click was accepted or dropped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub client_x: f64,
    pub client_y: f64,
    /// Diameter in CSS pixels
    pub diameter: f64,
    pub ttl: Duration,
}

impl Indicator {
    pub fn accepted(client_x: f64, client_y: f64) -> Self {
        Self {
            kind: IndicatorKind::Accepted,
            client_x,
            client_y,
            diameter: 20.0,
            ttl: Duration::from_millis(500),
        }
    }

    pub fn rejected(client_x: f64, client_y: f64) -> Self {
        Self {
            kind: IndicatorKind::Rejected,
            client_x,
            client_y,
            diameter: 16.0,
            ttl: Duration::from_millis(800),
        }
    }

    /// Top-left corner so the ring is centred on the click
    pub fn origin(&self) -> (f64, f64) {
        let r = self.diameter / 2.0;
        (self.client_x - r, self.client_y - r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<RecordedPoint> {
        vec![
            RecordedPoint::new(10.0, 12.5),
            RecordedPoint::new(50.0, 50.0),
        ]
    }

    #[test]
    fn test_hidden_lays_out_nothing() {
        let markers = layout_markers(
            &points(),
            SurfaceSize::new(1000.0, 800.0),
            Rect::default(),
            MarkerMode::Hidden,
        );
        assert!(markers.is_empty());
    }

    #[test]
    fn test_markers_offset_by_rect() {
        let markers = layout_markers(
            &points(),
            SurfaceSize::new(1000.0, 800.0),
            Rect::new(8.0, 16.0, 1000.0, 800.0),
            MarkerMode::ReadOnly,
        );

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].label, "1");
        assert_eq!((markers[0].client_x, markers[0].client_y), (108.0, 116.0));
        assert_eq!((markers[1].client_x, markers[1].client_y), (508.0, 416.0));
        assert!(markers.iter().all(|m| !m.editable));
    }

    #[test]
    fn test_editable_markers() {
        let markers = layout_markers(
            &points(),
            SurfaceSize::new(1000.0, 800.0),
            Rect::default(),
            MarkerMode::Editable,
        );
        assert!(markers.iter().all(|m| m.editable));
        assert_eq!(markers[1].index, 1);
    }

    #[test]
    fn test_indicator_geometry() {
        let accepted = Indicator::accepted(100.0, 100.0);
        assert_eq!(accepted.origin(), (90.0, 90.0));
        assert_eq!(accepted.ttl, Duration::from_millis(500));

        let rejected = Indicator::rejected(100.0, 100.0);
        assert_eq!(rejected.origin(), (92.0, 92.0));
        assert_eq!(rejected.kind, IndicatorKind::Rejected);
    }
}
