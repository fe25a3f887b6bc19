//! Optimization result value objects.

use crate::domain::{CalibrationPoint, Vector2};

/// Per-floor statistics attached to an optimization result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorSummary {
    /// Floor number.
    pub floor: u32,
    /// Points captured on this floor.
    pub point_count: usize,
    /// Mean normalized strength on this floor.
    pub average_signal: f64,
    /// Points below the weak threshold on this floor.
    pub weak_count: usize,
    /// Score of this floor's best candidate (0.0 when the floor's
    /// geometry was degenerate).
    pub best_score: f64,
}

/// The outcome of one placement analysis.
///
/// A plain value object, recomputed from scratch on every analysis call
/// and owned by the caller; the core caches nothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// Floor the recommended access-point position lies on.
    pub recommended_floor: u32,
    /// Recommended position in that floor's local coordinates.
    pub recommended_position: Vector2,
    /// Advisory confidence in [0, 1]: sample count and sensor trust
    /// combined. Never gates the result.
    pub confidence_score: f64,
    /// Mean normalized strength across every captured point.
    pub average_signal: f64,
    /// Points below the weak threshold, worst first.
    pub weak_areas: Vec<CalibrationPoint>,
    /// Per-floor statistics, ascending floor order.
    pub per_floor: Vec<FloorSummary>,
}

impl OptimizationResult {
    /// Whether any under-served region was found.
    pub fn has_weak_areas(&self) -> bool {
        !self.weak_areas.is_empty()
    }

    /// Number of under-served points.
    pub fn weak_count(&self) -> usize {
        self.weak_areas.len()
    }

    /// Summary for a specific floor, if present.
    pub fn floor_summary(&self, floor: u32) -> Option<&FloorSummary> {
        self.per_floor.iter().find(|s| s.floor == floor)
    }
}
