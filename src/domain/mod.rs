//! Domain value objects and entities: readings, points, and the
//! calibration session.

pub mod point;
pub mod reading;
pub mod session;

pub use point::{CalibrationPoint, LocationKind, PointId, Vector2, Vector3};
pub use reading::{AuxiliarySensors, NormalizerConfig, RawSignal, SignalReading};
pub use session::{
    CalibrationSession, CaptureError, CaptureRequest, MotionSample, PointRecord,
    SessionExport, SessionId, SessionState,
};
