//! Spatial model building: dead-reckoned positions and per-floor layout
//! snapshots.

pub mod layout;
pub mod reckoner;

pub use layout::{BoundingBox, FloorLayout, SpatialLayout};
pub use reckoner::DeadReckoner;
