//! # wifi-sitesurvey
//!
//! Spatial inference core for WiFi coverage surveys.
//!
//! Given a sparse, irregularly-sampled set of signal-strength measurements
//! captured by one operator walking a multi-floor space, this crate:
//!
//! - **Models the walk spatially** without absolute positioning, by
//!   dead-reckoning relative coordinates from heading, step count, and
//!   altitude deltas.
//! - **Identifies under-served regions** whose normalized strength falls
//!   below a configurable threshold.
//! - **Recommends an access-point placement** via a deterministic grid
//!   scan that favors candidates close to weak, trustworthy readings.
//!
//! Presentation, persistence, raw radio measurement, and catalog browsing
//! are external collaborators: they feed typed inputs in and consume typed
//! results out. The core performs no I/O, no retries, and keeps no state
//! beyond the current session.
//!
//! ## Example
//!
//! ```rust
//! use wifi_sitesurvey::prelude::*;
//!
//! fn main() -> Result<(), SurveyError> {
//!     let planner = SurveyPlanner::new(SurveyConfig::default());
//!     planner.start_session()?;
//!
//!     for (label, dbm, steps) in [
//!         ("Living Room", -45.0, 0u32),
//!         ("Kitchen", -78.0, 8),
//!         ("Bedroom", -85.0, 10),
//!     ] {
//!         planner.capture(CaptureRequest {
//!             label: label.to_string(),
//!             kind: Some(LocationKind::Room),
//!             floor: 1,
//!             raw_signal: RawSignal::Dbm(dbm),
//!             sensors: AuxiliarySensors::all_available(),
//!             motion: MotionSample {
//!                 heading_rad: 0.0,
//!                 step_count: steps,
//!                 altitude_delta_m: 0.0,
//!             },
//!         })?;
//!     }
//!     planner.end_session()?;
//!
//!     let result = planner.analyze()?;
//!     let recommendations = planner.recommend(&result, &Catalog::new());
//!     assert!(result.has_weak_areas() || recommendations.is_empty());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod domain;
pub mod placement;
pub mod recommend;
pub mod spatial;

pub use domain::{
    AuxiliarySensors, CalibrationPoint, CalibrationSession, CaptureError,
    CaptureRequest, LocationKind, MotionSample, NormalizerConfig, PointId,
    PointRecord, RawSignal, SessionExport, SessionId, SessionState, SignalReading,
    Vector2, Vector3,
};
pub use placement::{
    AnalysisError, FloorSummary, OptimizationResult, PlacementConfig,
    PlacementOptimizer, ScanHandle,
};
pub use recommend::{
    recommend, recommend_for_result, Catalog, ProductRef, Recommendation,
    RecommendationSet, RemediationCategory, Severity,
};
pub use spatial::{BoundingBox, DeadReckoner, FloorLayout, SpatialLayout};

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum calibration points before optimization is permitted.
pub const MIN_CALIBRATION_POINTS: usize = 3;

/// Common result type for survey operations.
pub type Result<T> = std::result::Result<T, SurveyError>;

/// Unified error type for survey operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurveyError {
    /// A failure of the capture path.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// A failure of the analysis path.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl SurveyError {
    /// Every survey error is recoverable: the operator corrects input,
    /// captures more points, or retries.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            SurveyError::Capture(e) => e.is_recoverable(),
            SurveyError::Analysis(e) => e.is_recoverable(),
        }
    }
}

/// Configuration for a survey session.
///
/// Normalization constants, stride length, and scan parameters are all
/// explicit, tunable inputs rather than hard-coded values.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Raw-signal normalization parameters.
    pub normalizer: NormalizerConfig,
    /// Meters covered per step during dead-reckoning.
    pub stride_length_m: f64,
    /// Placement scan parameters.
    pub placement: PlacementConfig,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            stride_length_m: 0.75,
            placement: PlacementConfig::default(),
        }
    }
}

impl SurveyConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SurveyConfigBuilder {
        SurveyConfigBuilder::default()
    }
}

/// Builder for [`SurveyConfig`] with clamped setters.
#[derive(Debug, Default)]
pub struct SurveyConfigBuilder {
    config: SurveyConfig,
}

impl SurveyConfigBuilder {
    /// Set the dBm level mapped to strength 0.0.
    pub fn dbm_floor(mut self, dbm: f64) -> Self {
        self.config.normalizer.dbm_floor = dbm;
        self
    }

    /// Set the dBm span mapped onto [0, 1]; at least 1 dB.
    pub fn dbm_range(mut self, range: f64) -> Self {
        self.config.normalizer.dbm_range = range.max(1.0);
        self
    }

    /// Set the per-missing-sensor confidence discount.
    pub fn sensor_discount(mut self, discount: f64) -> Self {
        self.config.normalizer.sensor_discount = discount.clamp(0.0, 1.0);
        self
    }

    /// Set the stride length in meters.
    pub fn stride_length_m(mut self, stride: f64) -> Self {
        self.config.stride_length_m = stride.max(0.0);
        self
    }

    /// Set candidates per grid axis; at least 2.
    pub fn grid_resolution(mut self, resolution: usize) -> Self {
        self.config.placement.grid_resolution = resolution.max(2);
        self
    }

    /// Set the weak-signal threshold.
    pub fn weak_threshold(mut self, threshold: f64) -> Self {
        self.config.placement.weak_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the bounding-box expansion margin.
    pub fn margin_fraction(mut self, fraction: f64) -> Self {
        self.config.placement.margin_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SurveyConfig {
        self.config
    }
}

/// Coordinator owning one calibration session and the analysis pipeline.
///
/// The session mutation path (`start_session`, `capture`, `end_session`)
/// is single-writer: a mutex owns the point log and captures serialize
/// through it. Analysis snapshots the session into an immutable
/// [`SpatialLayout`] and scans it read-only, so re-analysis is always safe
/// and idempotent, and a background scan can be cancelled without
/// corrupting anything.
pub struct SurveyPlanner {
    config: SurveyConfig,
    session: Mutex<CalibrationSession>,
}

impl SurveyPlanner {
    /// Create a planner with a fresh, not-yet-started session.
    pub fn new(config: SurveyConfig) -> Self {
        let session = CalibrationSession::new(config.clone());
        Self {
            config,
            session: Mutex::new(session),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Begin the calibration walk.
    pub fn start_session(&self) -> Result<SessionId> {
        let mut session = self.session.lock();
        session.start()?;
        Ok(*session.id())
    }

    /// Capture one calibration point, returning a copy of the appended
    /// point.
    pub fn capture(&self, request: CaptureRequest) -> Result<CalibrationPoint> {
        let mut session = self.session.lock();
        let point = session.capture(request)?;
        Ok(point.clone())
    }

    /// End the walk and freeze the point log.
    pub fn end_session(&self) -> Result<()> {
        self.session.lock().end()?;
        Ok(())
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        self.session.lock().state()
    }

    /// Number of points captured so far.
    pub fn point_count(&self) -> usize {
        self.session.lock().point_count()
    }

    /// Export the session as a flat record list for an external persister.
    pub fn export_session(&self) -> SessionExport {
        self.session.lock().export()
    }

    /// Snapshot the session into an immutable layout.
    ///
    /// An `Active` session may be snapshotted; the snapshot itself is the
    /// freeze. A session that never started has nothing to analyze.
    pub fn snapshot_layout(&self) -> Result<SpatialLayout> {
        let session = self.session.lock();
        if session.state() == SessionState::NotStarted {
            return Err(AnalysisError::SessionNotFrozen.into());
        }
        Ok(SpatialLayout::from_session(&session))
    }

    /// Run the placement analysis synchronously.
    ///
    /// The result is recomputed from scratch on every call and owned by
    /// the caller; nothing is cached.
    pub fn analyze(&self) -> Result<OptimizationResult> {
        let layout = self.snapshot_layout()?;
        let optimizer = PlacementOptimizer::new(self.config.placement.clone());
        Ok(optimizer.optimize(&layout)?)
    }

    /// Run the placement analysis on a blocking worker.
    ///
    /// Returns a cancellation handle and a one-shot receiver for the
    /// result. Cancelling aborts the scan at the next grid row; the
    /// session is untouched either way. Must be called from within a tokio
    /// runtime.
    pub fn analyze_background(
        &self,
    ) -> Result<(
        ScanHandle,
        oneshot::Receiver<std::result::Result<OptimizationResult, AnalysisError>>,
    )> {
        let layout = self.snapshot_layout()?;
        let optimizer = PlacementOptimizer::new(self.config.placement.clone());
        let handle = ScanHandle::new();
        let scan_handle = handle.clone();
        let (tx, rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let outcome = optimizer.optimize_with_handle(&layout, &scan_handle);
            // the receiver may have been dropped; nothing to do then
            let _ = tx.send(outcome);
        });

        Ok((handle, rx))
    }

    /// Map an optimization result to remediation suggestions using an
    /// externally supplied catalog.
    pub fn recommend(
        &self,
        result: &OptimizationResult,
        catalog: &Catalog,
    ) -> RecommendationSet {
        recommend_for_result(result, catalog)
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AnalysisError, AuxiliarySensors, CalibrationPoint, CaptureError,
        CaptureRequest, Catalog, FloorSummary, LocationKind, MotionSample,
        OptimizationResult, PlacementConfig, PlacementOptimizer, ProductRef,
        RawSignal, Recommendation, RecommendationSet, RemediationCategory,
        ScanHandle, SessionState, Severity, SignalReading, SpatialLayout,
        SurveyConfig, SurveyError, SurveyPlanner, Vector2, Vector3,
    };
}
