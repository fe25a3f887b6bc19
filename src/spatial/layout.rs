//! Derived spatial layout: per-floor point groups and bounding geometry.

use std::collections::BTreeMap;

use crate::domain::{CalibrationPoint, CalibrationSession, Vector2};

/// Axis-aligned bounding box over floor-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// Compute the bounding box of a set of positions. `None` when empty.
    pub fn from_positions<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector2>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Box width (meters).
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Box height (meters).
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Length of the box diagonal (meters).
    pub fn diagonal(&self) -> f64 {
        let w = self.width();
        let h = self.height();
        (w * w + h * h).sqrt()
    }

    /// Center of the box.
    pub fn center(&self) -> Vector2 {
        Vector2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if a point lies within the box.
    pub fn contains(&self, point: &Vector2) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Expand every side outward by `fraction` of the diagonal, allowing
    /// candidates slightly outside the observed envelope.
    pub fn expanded(&self, fraction: f64) -> Self {
        let pad = self.diagonal() * fraction;
        Self {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }
}

/// All points captured on one floor, with their bounding box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorLayout {
    floor: u32,
    points: Vec<CalibrationPoint>,
    bounding_box: BoundingBox,
}

impl FloorLayout {
    fn new(floor: u32, points: Vec<CalibrationPoint>) -> Self {
        let bounding_box =
            BoundingBox::from_positions(points.iter().map(|p| p.position().horizontal()))
                .unwrap_or(BoundingBox {
                    min_x: 0.0,
                    min_y: 0.0,
                    max_x: 0.0,
                    max_y: 0.0,
                });
        Self {
            floor,
            points,
            bounding_box,
        }
    }

    /// Floor number.
    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Points on this floor, in capture order.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Bounding box of this floor's points.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Mean normalized strength across this floor's points.
    pub fn average_signal(&self) -> f64 {
        let sum: f64 = self.points.iter().map(|p| p.reading().strength()).sum();
        sum / self.points.len() as f64
    }

    /// Unweighted centroid of this floor's point positions.
    pub fn centroid(&self) -> Vector2 {
        let n = self.points.len() as f64;
        let sum_x: f64 = self.points.iter().map(|p| p.position().x).sum();
        let sum_y: f64 = self.points.iter().map(|p| p.position().y).sum();
        Vector2::new(sum_x / n, sum_y / n)
    }
}

/// Immutable snapshot of a session's points grouped by floor.
///
/// Derived on demand when analysis runs, never persisted and never mutated
/// in place. Re-deriving from the same frozen session yields the same
/// layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialLayout {
    floors: BTreeMap<u32, FloorLayout>,
    total_points: usize,
}

impl SpatialLayout {
    /// Snapshot a session into a per-floor layout.
    pub fn from_session(session: &CalibrationSession) -> Self {
        Self::from_points(session.points())
    }

    /// Build a layout from an ordered point slice.
    pub fn from_points(points: &[CalibrationPoint]) -> Self {
        let mut grouped: BTreeMap<u32, Vec<CalibrationPoint>> = BTreeMap::new();
        for point in points {
            grouped.entry(point.floor()).or_default().push(point.clone());
        }
        let floors = grouped
            .into_iter()
            .map(|(floor, pts)| (floor, FloorLayout::new(floor, pts)))
            .collect();
        Self {
            floors,
            total_points: points.len(),
        }
    }

    /// Per-floor layouts in ascending floor order.
    pub fn floors(&self) -> impl Iterator<Item = &FloorLayout> {
        self.floors.values()
    }

    /// Layout for a specific floor, if any point was captured there.
    pub fn floor(&self, floor: u32) -> Option<&FloorLayout> {
        self.floors.get(&floor)
    }

    /// Number of floors with at least one point.
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Total point count across floors.
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Whether the layout holds no points at all.
    pub fn is_empty(&self) -> bool {
        self.total_points == 0
    }

    /// All points across floors, ascending by floor then capture order.
    pub fn all_points(&self) -> impl Iterator<Item = &CalibrationPoint> {
        self.floors.values().flat_map(|f| f.points.iter())
    }
}
