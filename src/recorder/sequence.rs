//! The ordered list of recorded clicks
//!
//! Insertion order is click order is replay order. Deduplication compares a
//! new click against every stored point denormalized at the surface's
//! *current* size, including points recorded at a different size.

use crate::capture::input::types::RecordedPoint;
use crate::processing::normalize::{distance, SurfaceSize};
use crate::recorder::error::{RecorderError, RecorderResult};
use serde::{Deserialize, Serialize};

/// Default minimum pixel distance between two retained clicks
pub const DEFAULT_MIN_DISTANCE: f64 = 50.0;

/// Result of offering a click to the sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Accepted { index: usize, point: RecordedPoint },
    /// Too close to the stored point at `duplicate_of`
    Rejected { duplicate_of: usize, distance: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingSequence {
    points: Vec<RecordedPoint>,
}

impl RecordingSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<RecordedPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[RecordedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordedPoint> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn push(&mut self, point: RecordedPoint) {
        self.points.push(point);
    }

    /// Remove the point at `index`, keeping the others in order
    pub fn remove(&mut self, index: usize) -> RecorderResult<RecordedPoint> {
        if index >= self.points.len() {
            return Err(RecorderError::PointOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(self.points.remove(index))
    }

    /// First stored point closer than `min_distance` to `(x, y)`
    pub fn find_duplicate(
        &self,
        x: f64,
        y: f64,
        size: SurfaceSize,
        min_distance: f64,
    ) -> Option<(usize, f64)> {
        self.points.iter().enumerate().find_map(|(i, p)| {
            let existing = size.from_percent(p.x, p.y)?;
            let d = distance((x, y), existing);
            (d < min_distance).then_some((i, d))
        })
    }

    /// Deduplicate and append a click at surface-relative pixel `(x, y)`
    pub fn try_record(
        &mut self,
        x: f64,
        y: f64,
        size: SurfaceSize,
        min_distance: f64,
    ) -> RecorderResult<Admission> {
        if let Some((duplicate_of, distance)) = self.find_duplicate(x, y, size, min_distance) {
            return Ok(Admission::Rejected {
                duplicate_of,
                distance,
            });
        }

        let (px, py) = size
            .to_percent(x, y)
            .ok_or(RecorderError::InvalidDimensions {
                width: size.width,
                height: size.height,
            })?;
        let point = RecordedPoint::new(px, py);
        self.points.push(point);

        Ok(Admission::Accepted {
            index: self.points.len() - 1,
            point,
        })
    }
}

impl<'a> IntoIterator for &'a RecordingSequence {
    type Item = &'a RecordedPoint;
    type IntoIter = std::slice::Iter<'a, RecordedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
