//! Unit conversion constants

/// Metres per degree of latitude used by the equirectangular approximation
pub const METERS_PER_DEGREE: f64 = 111_300.0;
pub const MPS_PER_KNOT: f64 = 0.514_444_44;
pub const FEET_PER_METER: f64 = 3.280_839_9;
pub const MILES_PER_METER: f64 = 0.000_621_371_12;
pub const MPH_PER_KNOT: f64 = 1.150_779_45;

/// Altitude change in metres over 10 seconds per ft/min of vertical speed
pub const METERS_PER_FPM_10S: f64 = 0.05;

#[inline]
pub fn knots_to_mps(knots: f64) -> f64 {
    knots * MPS_PER_KNOT
}

#[inline]
pub fn mps_to_knots(mps: f64) -> f64 {
    mps / MPS_PER_KNOT
}

#[inline]
pub fn fpm_to_mps(fpm: f64) -> f64 {
    fpm / (FEET_PER_METER * 60.0)
}
