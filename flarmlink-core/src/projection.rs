//! Ownship velocity projection for the transmit path

use serde::{Deserialize, Serialize};

use crate::aircraft::Ownship;
use crate::units::MPS_PER_KNOT;

/// Spacing of the projected velocity samples
pub const SAMPLE_INTERVAL_SECS: f64 = 3.0;

/// Projected ground velocity at four future time points, as north/east
/// components in quarter-metres per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VelocityProjection {
    pub ns: [i16; 4],
    pub ew: [i16; 4],
}

impl VelocityProjection {
    /// Constant course and speed
    pub fn straight(course: f64, speed: f64) -> Self {
        Self::turning(course, speed, 0.0)
    }

    /// Constant speed with the course changing at `turnrate` deg/s
    pub fn turning(course: f64, speed: f64, turnrate: f64) -> Self {
        let quarter_mps = speed * MPS_PER_KNOT * 4.0;
        let mut projection = VelocityProjection::default();
        for i in 0..4 {
            let rad = (course + turnrate * SAMPLE_INTERVAL_SECS * i as f64).to_radians();
            projection.ns[i] = to_sample(quarter_mps * rad.cos());
            projection.ew[i] = to_sample(quarter_mps * rad.sin());
        }
        projection
    }

    /// Project from ownship's current course, speed and turn rate
    pub fn from_ownship(own: &Ownship) -> Self {
        Self::turning(own.course, own.speed, own.turnrate)
    }
}

fn to_sample(v: f64) -> i16 {
    v.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
