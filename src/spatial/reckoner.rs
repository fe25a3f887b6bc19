//! Incremental dead-reckoning of relative positions.
//!
//! No absolute indoor coordinate system exists, so positions are derived
//! sequentially: heading plus step count give horizontal displacement,
//! relative altitude deltas accumulate into a global vertical offset.
//! Floors are independent 2D sheets stacked along z.

use std::collections::BTreeMap;

use crate::domain::{MotionSample, Vector2, Vector3};

/// Derives a relative position for each capture from the motion sample
/// that accompanied it.
///
/// Tracks the last horizontal position per floor: the first point captured
/// on a floor defines that floor's local origin regardless of the motion
/// sample; each later point on the same floor displaces from the previous
/// point on that floor. The vertical offset is cumulative across the whole
/// session and is carried through floor transitions.
#[derive(Debug)]
pub struct DeadReckoner {
    stride_length_m: f64,
    last_by_floor: BTreeMap<u32, Vector2>,
    z_offset: f64,
    any_point: bool,
}

impl DeadReckoner {
    /// Create a reckoner with the given stride length (meters per step).
    pub fn new(stride_length_m: f64) -> Self {
        Self {
            stride_length_m,
            last_by_floor: BTreeMap::new(),
            z_offset: 0.0,
            any_point: false,
        }
    }

    /// Advance the reckoner by one capture and return the derived position.
    ///
    /// The very first capture of the session anchors the vertical offset at
    /// zero; its altitude delta has nothing to be relative to.
    pub fn advance(&mut self, floor: u32, motion: &MotionSample) -> Vector3 {
        if self.any_point {
            self.z_offset += motion.altitude_delta_m;
        }
        self.any_point = true;

        let horizontal = match self.last_by_floor.get(&floor) {
            None => Vector2::default(),
            Some(previous) => {
                let distance = f64::from(motion.step_count) * self.stride_length_m;
                Vector2::new(
                    previous.x + distance * motion.heading_rad.sin(),
                    previous.y + distance * motion.heading_rad.cos(),
                )
            }
        };
        self.last_by_floor.insert(floor, horizontal);

        Vector3::new(horizontal.x, horizontal.y, self.z_offset)
    }

    /// Cumulative vertical offset so far (meters).
    pub fn z_offset(&self) -> f64 {
        self.z_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn motion(heading_rad: f64, step_count: u32, altitude_delta_m: f64) -> MotionSample {
        MotionSample {
            heading_rad,
            step_count,
            altitude_delta_m,
        }
    }

    #[test]
    fn test_first_point_sits_at_origin_regardless_of_motion() {
        let mut reckoner = DeadReckoner::new(0.75);
        let position = reckoner.advance(1, &motion(1.2, 30, 0.0));
        assert!(position.x.abs() < 1e-9);
        assert!(position.y.abs() < 1e-9);
        assert!(position.z.abs() < 1e-9);
    }

    #[test]
    fn test_heading_north_moves_along_y() {
        let mut reckoner = DeadReckoner::new(0.75);
        reckoner.advance(1, &motion(0.0, 0, 0.0));
        let position = reckoner.advance(1, &motion(0.0, 10, 0.0));
        assert!(position.x.abs() < 1e-9);
        assert!((position.y - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_heading_east_moves_along_x() {
        let mut reckoner = DeadReckoner::new(1.0);
        reckoner.advance(1, &motion(0.0, 0, 0.0));
        let position = reckoner.advance(1, &motion(FRAC_PI_2, 5, 0.0));
        assert!((position.x - 5.0).abs() < 1e-9);
        assert!(position.y.abs() < 1e-9);
    }

    #[test]
    fn test_displacements_chain_from_previous_point() {
        let mut reckoner = DeadReckoner::new(1.0);
        reckoner.advance(1, &motion(0.0, 0, 0.0));
        reckoner.advance(1, &motion(0.0, 3, 0.0));
        let position = reckoner.advance(1, &motion(FRAC_PI_2, 4, 0.0));
        assert!((position.x - 4.0).abs() < 1e-9);
        assert!((position.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_steps_collapses_to_same_position() {
        let mut reckoner = DeadReckoner::new(0.75);
        let a = reckoner.advance(1, &motion(0.0, 6, 0.0));
        let b = reckoner.advance(1, &motion(2.0, 0, 0.0));
        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
    }

    #[test]
    fn test_floor_transition_resets_horizontal_and_carries_z() {
        let mut reckoner = DeadReckoner::new(0.75);
        reckoner.advance(1, &motion(0.0, 0, 0.0));
        reckoner.advance(1, &motion(0.0, 10, 0.0));

        // climb the stairs: 3m up, new floor starts at its own origin
        let upstairs = reckoner.advance(2, &motion(0.0, 12, 3.0));
        assert!(upstairs.x.abs() < 1e-9);
        assert!(upstairs.y.abs() < 1e-9);
        assert!((upstairs.z - 3.0).abs() < 1e-9);
        assert!((reckoner.z_offset() - 3.0).abs() < 1e-9);

        // moving on floor 2 keeps the carried offset
        let next = reckoner.advance(2, &motion(0.0, 4, 0.0));
        assert!((next.y - 3.0).abs() < 1e-9);
        assert!((next.z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_returning_to_a_floor_resumes_its_chain() {
        let mut reckoner = DeadReckoner::new(1.0);
        reckoner.advance(1, &motion(0.0, 0, 0.0));
        reckoner.advance(1, &motion(0.0, 5, 0.0));
        reckoner.advance(2, &motion(0.0, 8, 3.0));

        // back down: displacement chains from the last floor-1 position
        let back = reckoner.advance(1, &motion(0.0, 2, -3.0));
        assert!((back.y - 7.0).abs() < 1e-9);
        assert!(back.z.abs() < 1e-9);
    }
}
