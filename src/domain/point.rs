//! Calibration point value objects and relative coordinates.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::reading::SignalReading;

/// Unique identifier for a calibration point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointId(Uuid);

impl PointId {
    /// Create a new random point ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PointId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Floor-local 2D position (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    /// East-West offset from the floor's local origin.
    pub x: f64,
    /// North-South offset from the floor's local origin.
    pub y: f64,
}

impl Vector2 {
    /// Create a new 2D vector.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Vector2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Relative 3D position: floor-local x/y plus a global vertical offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    /// Floor-local East-West offset (meters).
    pub x: f64,
    /// Floor-local North-South offset (meters).
    pub y: f64,
    /// Global vertical offset from the session start (meters).
    pub z: f64,
}

impl Vector3 {
    /// Create a new 3D vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The horizontal component.
    pub fn horizontal(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Horizontal (2D) distance to another position.
    pub fn horizontal_distance_to(&self, other: &Vector3) -> f64 {
        self.horizontal().distance_to(&other.horizontal())
    }
}

/// The kind of location a calibration point was captured in.
///
/// A closed set; matching is exhaustive so new kinds are a compile-time
/// concern, not a runtime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationKind {
    /// Living space or bedroom.
    Room,
    /// Corridor connecting rooms.
    Hallway,
    /// Work space.
    Office,
    /// Vertical circulation between floors.
    Stairwell,
    /// Anything else.
    Other,
}

impl LocationKind {
    /// Short glyph for presentation layers.
    pub const fn icon(&self) -> &'static str {
        match self {
            LocationKind::Room => "🛏",
            LocationKind::Hallway => "🚪",
            LocationKind::Office => "💼",
            LocationKind::Stairwell => "🪜",
            LocationKind::Other => "📍",
        }
    }

    /// Human-readable description.
    pub const fn description(&self) -> &'static str {
        match self {
            LocationKind::Room => "Living space or bedroom",
            LocationKind::Hallway => "Corridor connecting rooms",
            LocationKind::Office => "Work space",
            LocationKind::Stairwell => "Vertical circulation between floors",
            LocationKind::Other => "Unclassified location",
        }
    }
}

/// One labeled, floor-tagged signal measurement with a derived relative
/// position.
///
/// Immutable once created; corrections are made by capturing a new point,
/// never by editing an existing one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationPoint {
    id: PointId,
    label: String,
    kind: Option<LocationKind>,
    floor: u32,
    reading: SignalReading,
    position: Vector3,
    captured_at: DateTime<Utc>,
}

impl CalibrationPoint {
    /// Create a new point. Only the owning session constructs points; the
    /// position comes from the dead-reckoner, never from the caller.
    pub(crate) fn new(
        label: String,
        kind: Option<LocationKind>,
        floor: u32,
        reading: SignalReading,
        position: Vector3,
    ) -> Self {
        Self {
            id: PointId::new(),
            label,
            kind,
            floor,
            reading,
            position,
            captured_at: Utc::now(),
        }
    }

    /// Get the point ID.
    pub fn id(&self) -> &PointId {
        &self.id
    }

    /// Get the user-supplied label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the location kind, if tagged.
    pub fn kind(&self) -> Option<LocationKind> {
        self.kind
    }

    /// Get the floor number (always >= 1).
    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Get the normalized signal reading.
    pub fn reading(&self) -> &SignalReading {
        &self.reading
    }

    /// Get the derived relative position.
    pub fn position(&self) -> &Vector3 {
        &self.position
    }

    /// Get the capture timestamp.
    pub fn captured_at(&self) -> &DateTime<Utc> {
        &self.captured_at
    }
}
