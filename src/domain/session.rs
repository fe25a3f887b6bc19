//! Calibration session entity: an append-only, ordered log of calibration
//! points with an explicit lifecycle state machine.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::spatial::DeadReckoner;
use crate::SurveyConfig;

use super::point::{CalibrationPoint, LocationKind};
use super::reading::{AuxiliarySensors, RawSignal, SignalReading};

/// Unique identifier for a calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a calibration session.
///
/// Transitions are one-way: `NotStarted -> Active -> Ended`. `Ended` is
/// terminal; a finished walk is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    /// Created but no walk started yet.
    NotStarted,
    /// Operator is walking and capturing.
    Active,
    /// Walk finished; the point log is frozen.
    Ended,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::NotStarted => "NotStarted",
            SessionState::Active => "Active",
            SessionState::Ended => "Ended",
        };
        write!(f, "{name}")
    }
}

/// Motion snapshot accompanying a capture, used for dead-reckoning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionSample {
    /// Compass heading in radians: 0 = north (+y), clockwise positive.
    pub heading_rad: f64,
    /// Steps taken since the previous capture.
    pub step_count: u32,
    /// Relative altitude change since the previous capture (meters).
    pub altitude_delta_m: f64,
}

/// Everything the presentation layer supplies for one capture.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRequest {
    /// User-facing label for the spot ("Kitchen", "Desk 12", ...).
    pub label: String,
    /// Optional location classification.
    pub kind: Option<LocationKind>,
    /// Floor number, >= 1. Ordinal; floors need not be contiguous.
    pub floor: u32,
    /// Raw radio measurement.
    pub raw_signal: RawSignal,
    /// Auxiliary sensor availability at capture time.
    pub sensors: AuxiliarySensors,
    /// Motion since the previous capture.
    pub motion: MotionSample,
}

/// Failures of the capture path. All are recoverable: the operator fixes
/// the input or restarts the session and captures again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The session is not in the state the operation requires.
    #[error("invalid session state: expected {expected}, found {actual}")]
    InvalidState {
        /// State the operation requires.
        expected: SessionState,
        /// State the session is actually in.
        actual: SessionState,
    },

    /// The point label was empty or whitespace-only.
    #[error("capture label must not be blank")]
    EmptyLabel,

    /// Floor numbers are positive; 0 is not a floor.
    #[error("invalid floor number {floor}: floors start at 1")]
    InvalidFloor {
        /// The rejected floor number.
        floor: u32,
    },

    /// The radio reported no usable sample.
    #[error("sensor unavailable: {sensor}")]
    SensorUnavailable {
        /// Which sensor failed to produce a sample.
        sensor: &'static str,
    },
}

impl CaptureError {
    /// Capture failures never poison the session; the caller may always
    /// correct the input and capture again.
    pub const fn is_recoverable(&self) -> bool {
        true
    }
}

/// An append-only, ordered log of calibration points captured in one
/// sitting by one operator.
///
/// The session exclusively owns its points. No point is ever removed or
/// edited in place; correcting a mistake means appending a new point or
/// restarting. This keeps the dead-reckoned position chain consistent and
/// auditable.
#[derive(Debug)]
pub struct CalibrationSession {
    id: SessionId,
    points: Vec<CalibrationPoint>,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    reckoner: DeadReckoner,
    config: SurveyConfig,
}

impl CalibrationSession {
    /// Create a session in the `NotStarted` state.
    pub fn new(config: SurveyConfig) -> Self {
        Self {
            id: SessionId::new(),
            points: Vec::new(),
            state: SessionState::NotStarted,
            started_at: None,
            ended_at: None,
            reckoner: DeadReckoner::new(config.stride_length_m),
            config,
        }
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the captured points, in append order.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Number of captured points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// When the walk started, if it has.
    pub fn started_at(&self) -> Option<&DateTime<Utc>> {
        self.started_at.as_ref()
    }

    /// When the walk ended, if it has.
    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    /// Begin the walk. Valid only from `NotStarted`.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::NotStarted {
            return Err(CaptureError::InvalidState {
                expected: SessionState::NotStarted,
                actual: self.state,
            });
        }
        self.state = SessionState::Active;
        self.started_at = Some(Utc::now());
        tracing::debug!(session = %self.id, "calibration session started");
        Ok(())
    }

    /// Capture one calibration point. Valid only while `Active`.
    ///
    /// The point's position is assigned by the dead-reckoner from the
    /// motion sample; the caller never supplies coordinates. Returns a
    /// reference to the appended point.
    pub fn capture(
        &mut self,
        request: CaptureRequest,
    ) -> Result<&CalibrationPoint, CaptureError> {
        if self.state != SessionState::Active {
            return Err(CaptureError::InvalidState {
                expected: SessionState::Active,
                actual: self.state,
            });
        }
        let label = request.label.trim();
        if label.is_empty() {
            return Err(CaptureError::EmptyLabel);
        }
        if request.floor == 0 {
            return Err(CaptureError::InvalidFloor { floor: 0 });
        }

        let reading = SignalReading::from_raw(
            request.raw_signal,
            request.sensors,
            &self.config.normalizer,
        )
        .ok_or(CaptureError::SensorUnavailable { sensor: "radio" })?;

        let position = self.reckoner.advance(request.floor, &request.motion);

        let point = CalibrationPoint::new(
            label.to_string(),
            request.kind,
            request.floor,
            reading,
            position,
        );
        tracing::debug!(
            session = %self.id,
            label = point.label(),
            floor = point.floor(),
            strength = point.reading().strength(),
            "calibration point captured"
        );
        let appended = self.points.len();
        self.points.push(point);
        Ok(&self.points[appended])
    }

    /// End the walk and freeze the point log. Valid only from `Active`.
    pub fn end(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Active {
            return Err(CaptureError::InvalidState {
                expected: SessionState::Active,
                actual: self.state,
            });
        }
        self.state = SessionState::Ended;
        self.ended_at = Some(Utc::now());
        tracing::debug!(
            session = %self.id,
            points = self.points.len(),
            "calibration session ended"
        );
        Ok(())
    }

    /// Export the session as a flat, append-ordered record list.
    ///
    /// The core persists nothing itself; this is the natural schema for an
    /// external collaborator that does.
    pub fn export(&self) -> SessionExport {
        SessionExport {
            session_id: self.id.to_string(),
            points: self
                .points
                .iter()
                .map(|p| PointRecord {
                    label: p.label().to_string(),
                    floor: p.floor(),
                    strength: p.reading().strength(),
                    confidence: p.reading().confidence(),
                    x: p.position().x,
                    y: p.position().y,
                    z: p.position().z,
                    captured_at: *p.captured_at(),
                })
                .collect(),
        }
    }
}

/// Flat, append-only export of a session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionExport {
    /// Session identifier.
    pub session_id: String,
    /// One record per captured point, in append order.
    pub points: Vec<PointRecord>,
}

/// One exported calibration point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointRecord {
    /// User-facing label.
    pub label: String,
    /// Floor number.
    pub floor: u32,
    /// Normalized strength.
    pub strength: f64,
    /// Measurement confidence.
    pub confidence: f64,
    /// Floor-local x (meters).
    pub x: f64,
    /// Floor-local y (meters).
    pub y: f64,
    /// Global vertical offset (meters).
    pub z: f64,
    /// Capture timestamp.
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(label: &str, floor: u32, strength: f64) -> CaptureRequest {
        CaptureRequest {
            label: label.to_string(),
            kind: None,
            floor,
            raw_signal: RawSignal::Fraction(strength),
            sensors: AuxiliarySensors::all_available(),
            motion: MotionSample {
                heading_rad: 0.0,
                step_count: 4,
                altitude_delta_m: 0.0,
            },
        }
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        assert_eq!(session.state(), SessionState::NotStarted);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.started_at().is_some());

        session.end().unwrap();
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.ended_at().is_some());
    }

    #[test]
    fn test_capture_before_start_fails() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        let err = session.capture(request("Kitchen", 1, 0.5)).unwrap_err();
        assert_eq!(
            err,
            CaptureError::InvalidState {
                expected: SessionState::Active,
                actual: SessionState::NotStarted,
            }
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_capture_after_end_fails_without_mutating() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();
        session.capture(request("Kitchen", 1, 0.5)).unwrap();
        session.end().unwrap();

        let err = session.capture(request("Bedroom", 1, 0.4)).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState { .. }));
        assert_eq!(session.point_count(), 1);
    }

    #[test]
    fn test_double_start_fails() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();
        assert!(matches!(
            session.start(),
            Err(CaptureError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_blank_label_rejected() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();
        let err = session.capture(request("   ", 1, 0.5)).unwrap_err();
        assert_eq!(err, CaptureError::EmptyLabel);
        assert_eq!(session.point_count(), 0);
    }

    #[test]
    fn test_zero_floor_rejected() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();
        let err = session.capture(request("Lobby", 0, 0.5)).unwrap_err();
        assert_eq!(err, CaptureError::InvalidFloor { floor: 0 });
    }

    #[test]
    fn test_missing_radio_sample_rejected() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();

        let mut req = request("Kitchen", 1, 0.5);
        req.raw_signal = RawSignal::Dbm(f64::NAN);
        let err = session.capture(req).unwrap_err();
        assert_eq!(err, CaptureError::SensorUnavailable { sensor: "radio" });
    }

    #[test]
    fn test_points_are_append_only_and_positioned() {
        let config = SurveyConfig::default();
        let stride = config.stride_length_m;
        let mut session = CalibrationSession::new(config);
        session.start().unwrap();

        session.capture(request("A", 1, 0.9)).unwrap();
        // heading 0 = north, so steps move along +y
        session.capture(request("B", 1, 0.8)).unwrap();

        let points = session.points();
        assert_eq!(points.len(), 2);
        // first point of a floor sits at the local origin
        assert!(points[0].position().x.abs() < 1e-9);
        assert!(points[0].position().y.abs() < 1e-9);
        // second point displaced by step_count * stride along +y
        assert!((points[1].position().y - 4.0 * stride).abs() < 1e-9);
        assert!(points[1].position().x.abs() < 1e-9);
    }

    #[test]
    fn test_export_mirrors_append_order() {
        let mut session = CalibrationSession::new(SurveyConfig::default());
        session.start().unwrap();
        session.capture(request("A", 1, 0.9)).unwrap();
        session.capture(request("B", 2, 0.4)).unwrap();
        session.end().unwrap();

        let export = session.export();
        assert_eq!(export.session_id, session.id().to_string());
        assert_eq!(export.points.len(), 2);
        assert_eq!(export.points[0].label, "A");
        assert_eq!(export.points[1].label, "B");
        assert_eq!(export.points[1].floor, 2);
    }
}
