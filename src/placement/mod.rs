//! Access-point placement optimization over a spatial layout snapshot.
//!
//! The optimizer lays a uniform candidate grid over each floor's expanded
//! bounding box and scores every candidate against that floor's points,
//! favoring candidates close to weak, trustworthy readings. The scan is
//! read-only over an immutable layout, deterministic, and cooperatively
//! cancellable.

pub mod result;

pub use result::{FloorSummary, OptimizationResult};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::Vector2;
use crate::spatial::{FloorLayout, SpatialLayout};
use crate::MIN_CALIBRATION_POINTS;

/// Two candidates within this score distance are considered tied and fall
/// through to the geometric tie-breaks.
const SCORE_EPSILON: f64 = 1e-12;

/// Below this diagonal a floor's geometry is degenerate: every point
/// coincides and distance-based weighting is meaningless.
const GEOMETRY_EPSILON: f64 = 1e-9;

/// Configuration for the placement scan.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Candidates per axis of each floor's grid.
    pub grid_resolution: usize,
    /// Strength below which a point counts as a weak area.
    pub weak_threshold: f64,
    /// Fraction of the bounding-box diagonal added to every side before
    /// laying the grid.
    pub margin_fraction: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 20,
            weak_threshold: 0.4,
            margin_fraction: 0.2,
        }
    }
}

/// Failures of the analysis path. All are recoverable: the caller may
/// capture more points, or simply retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Too few calibration points for optimization.
    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples {
        /// Minimum required points.
        required: usize,
        /// Points actually captured.
        actual: usize,
    },

    /// Every point coincides, so distance-based weighting is meaningless.
    /// Absorbed into a zero-confidence fallback at the top level; callers
    /// never observe it directly.
    #[error("degenerate layout: all points coincide")]
    DegenerateLayout,

    /// Analysis requested before the session ever started.
    #[error("session has no frozen point log to analyze")]
    SessionNotFrozen,

    /// The scan was cancelled before completing.
    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Analysis failures never corrupt the session; the caller may always
    /// capture more points and retry.
    pub const fn is_recoverable(&self) -> bool {
        true
    }
}

/// Cooperative cancellation flag for a running scan.
///
/// Cloning shares the flag; cancelling from any clone aborts the scan at
/// the next grid row without touching the session or the layout snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScanHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScanHandle {
    /// Create a fresh, un-cancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A floor's winning candidate.
#[derive(Debug, Clone, Copy)]
struct FloorCandidate {
    floor: u32,
    position: Vector2,
    score: f64,
    centroid_distance: f64,
}

/// Grid-search optimizer proposing an access-point position.
#[derive(Debug, Clone)]
pub struct PlacementOptimizer {
    config: PlacementConfig,
}

impl PlacementOptimizer {
    /// Create an optimizer with the given configuration.
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Create an optimizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlacementConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Run the scan over a layout snapshot.
    pub fn optimize(
        &self,
        layout: &SpatialLayout,
    ) -> Result<OptimizationResult, AnalysisError> {
        self.optimize_with_handle(layout, &ScanHandle::new())
    }

    /// Run the scan, checking the handle for cancellation between grid
    /// rows. The same frozen layout always produces the same result.
    pub fn optimize_with_handle(
        &self,
        layout: &SpatialLayout,
        handle: &ScanHandle,
    ) -> Result<OptimizationResult, AnalysisError> {
        let total = layout.total_points();
        if total < MIN_CALIBRATION_POINTS {
            return Err(AnalysisError::InsufficientSamples {
                required: MIN_CALIBRATION_POINTS,
                actual: total,
            });
        }

        tracing::debug!(
            points = total,
            floors = layout.floor_count(),
            resolution = self.config.grid_resolution,
            "placement scan started"
        );

        let mut best: Option<FloorCandidate> = None;
        let mut per_floor = Vec::with_capacity(layout.floor_count());

        for floor in layout.floors() {
            let candidate = match self.best_candidate(floor, handle) {
                Ok(candidate) => {
                    if Self::improves(&best, &candidate) {
                        best = Some(candidate);
                    }
                    Some(candidate)
                }
                Err(AnalysisError::DegenerateLayout) => None,
                Err(other) => return Err(other),
            };

            let weak_count = floor
                .points()
                .iter()
                .filter(|p| p.reading().is_weak(self.config.weak_threshold))
                .count();
            per_floor.push(FloorSummary {
                floor: floor.floor(),
                point_count: floor.points().len(),
                average_signal: floor.average_signal(),
                weak_count,
                best_score: candidate.map_or(0.0, |c| c.score),
            });
        }

        let average_signal = self.average_signal(layout);
        let weak_areas = self.weak_areas(layout);

        let result = match best {
            Some(winner) => OptimizationResult {
                recommended_floor: winner.floor,
                recommended_position: winner.position,
                confidence_score: self.confidence_score(layout),
                average_signal,
                weak_areas,
                per_floor,
            },
            None => {
                // Every floor is degenerate: all points share one position.
                // A single-point cluster is legitimate if unhelpful, so fall
                // back to that position with zero confidence instead of
                // failing.
                let shared = layout
                    .all_points()
                    .next()
                    .ok_or(AnalysisError::InsufficientSamples {
                        required: MIN_CALIBRATION_POINTS,
                        actual: 0,
                    })?;
                tracing::debug!("degenerate layout, falling back to shared position");
                OptimizationResult {
                    recommended_floor: shared.floor(),
                    recommended_position: shared.position().horizontal(),
                    confidence_score: 0.0,
                    average_signal,
                    weak_areas,
                    per_floor,
                }
            }
        };

        tracing::debug!(
            floor = result.recommended_floor,
            score_confidence = result.confidence_score,
            weak = result.weak_areas.len(),
            "placement scan finished"
        );
        Ok(result)
    }

    /// Scan one floor's candidate grid and return its best candidate.
    fn best_candidate(
        &self,
        floor: &FloorLayout,
        handle: &ScanHandle,
    ) -> Result<FloorCandidate, AnalysisError> {
        let bbox = floor.bounding_box();
        if bbox.diagonal() < GEOMETRY_EPSILON {
            return Err(AnalysisError::DegenerateLayout);
        }

        let expanded = bbox.expanded(self.config.margin_fraction);
        let max_distance = expanded.diagonal();
        let centroid = floor.centroid();
        let resolution = self.config.grid_resolution.max(2);
        let step = 1.0 / (resolution - 1) as f64;

        let mut best: Option<FloorCandidate> = None;

        for i in 0..resolution {
            if handle.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            let x = expanded.min_x + expanded.width() * (i as f64 * step);
            for j in 0..resolution {
                let y = expanded.min_y + expanded.height() * (j as f64 * step);
                let candidate_pos = Vector2::new(x, y);

                let mut score = 0.0;
                for point in floor.points() {
                    let reading = point.reading();
                    let weight = (1.0 - reading.strength()) * reading.confidence();
                    let distance =
                        candidate_pos.distance_to(&point.position().horizontal());
                    score += weight * (1.0 - distance / max_distance);
                }

                let candidate = FloorCandidate {
                    floor: floor.floor(),
                    position: candidate_pos,
                    score,
                    centroid_distance: candidate_pos.distance_to(&centroid),
                };
                if Self::improves(&best, &candidate) {
                    best = Some(candidate);
                }
            }
        }

        best.ok_or(AnalysisError::DegenerateLayout)
    }

    /// Whether `candidate` beats the incumbent: higher score first, then
    /// closer to the centroid, then whichever came first in scan order
    /// (which is ascending floor order across floors).
    fn improves(incumbent: &Option<FloorCandidate>, candidate: &FloorCandidate) -> bool {
        match incumbent {
            None => true,
            Some(best) => {
                if candidate.score > best.score + SCORE_EPSILON {
                    true
                } else if (candidate.score - best.score).abs() <= SCORE_EPSILON {
                    candidate.centroid_distance < best.centroid_distance - SCORE_EPSILON
                } else {
                    false
                }
            }
        }
    }

    /// Every point below the weak threshold, ascending by strength (worst
    /// first). The sort is stable, so equal strengths keep capture order.
    fn weak_areas(&self, layout: &SpatialLayout) -> Vec<crate::domain::CalibrationPoint> {
        let mut weak: Vec<_> = layout
            .all_points()
            .filter(|p| p.reading().is_weak(self.config.weak_threshold))
            .cloned()
            .collect();
        weak.sort_by(|a, b| {
            a.reading()
                .strength()
                .partial_cmp(&b.reading().strength())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        weak
    }

    /// Mean normalized strength across every point in the layout.
    fn average_signal(&self, layout: &SpatialLayout) -> f64 {
        let sum: f64 = layout.all_points().map(|p| p.reading().strength()).sum();
        sum / layout.total_points() as f64
    }

    /// `min(1, n/10) * mean(confidence)`: more samples and higher sensor
    /// trust raise confidence.
    fn confidence_score(&self, layout: &SpatialLayout) -> f64 {
        let n = layout.total_points();
        let mean_confidence: f64 = layout
            .all_points()
            .map(|p| p.reading().confidence())
            .sum::<f64>()
            / n as f64;
        (n as f64 / 10.0).min(1.0) * mean_confidence
    }
}
