//! Relative geometry between ownship and a contact
//!
//! Positions are projected onto a local flat plane (equirectangular,
//! scaled by the cosine of ownship latitude), which is accurate enough at
//! the few-kilometre ranges where collision alarms matter.

use nalgebra::Vector2;

use crate::aircraft::{Contact, Ownship};
use crate::settings::AlarmSettings;
use crate::units::{METERS_PER_DEGREE, METERS_PER_FPM_10S, MPS_PER_KNOT};

/// Horizontal distance, bearing and altitude difference to a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeGeometry {
    /// Metres
    pub distance: f64,
    /// Degrees true, 0-360
    pub bearing: f64,
    /// Metres, positive when the point is above ownship
    pub alt_diff: f64,
}

/// Closing motion of a contact relative to ownship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closure {
    /// Metres per second
    pub speed: f64,
    /// Direction the contact approaches from, degrees true
    pub direction: f64,
}

impl Closure {
    /// Seconds to cover `distance` at this closing speed, None when the
    /// speed does not exceed `min_speed`
    pub fn time_to_cover(&self, distance: f64, min_speed: f64) -> Option<f64> {
        if self.speed <= min_speed {
            return None;
        }
        Some(distance / self.speed)
    }
}

/// Bearing in degrees (0-360) of a north/east vector
pub fn bearing_deg(north: f64, east: f64) -> f64 {
    normalize_bearing(east.atan2(north).to_degrees())
}

/// Normalize bearing to 0-360 range
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing % 360.0;
    let b = if b < 0.0 { b + 360.0 } else { b };
    // Tiny negative inputs round up to exactly 360
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Absolute difference of two bearings, wrapped into 0-180
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = normalize_bearing(a - b);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Bearing relative to a track, wrapped into -180..180
pub fn relative_bearing(bearing: f64, track: f64) -> f64 {
    let diff = normalize_bearing(bearing - track);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// North/east offset in metres from ownship to a position
pub fn local_offset(own: &Ownship, latitude: f64, longitude: f64) -> Vector2<f64> {
    let north = (latitude - own.latitude) * METERS_PER_DEGREE;
    let east = (longitude - own.longitude) * METERS_PER_DEGREE * own.latitude.to_radians().cos();
    Vector2::new(north, east)
}

pub fn relative_geometry(
    own: &Ownship,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> RelativeGeometry {
    let offset = local_offset(own, latitude, longitude);
    RelativeGeometry {
        distance: offset.norm(),
        bearing: bearing_deg(offset.x, offset.y),
        alt_diff: altitude - own.altitude,
    }
}

/// Altitude difference projected 10 seconds ahead, less the vertical slack.
///
/// The projection only ever brings the two aircraft closer together and
/// never crosses zero. Relative vertical speeds above the configured
/// maximum are treated as noise.
pub fn adjusted_alt_diff(own: &Ownship, contact: &Contact, settings: &AlarmSettings) -> f64 {
    let alt_diff = contact.alt_diff;
    let mut vsr = contact.vs - own.vs;
    if vsr.abs() > settings.max_vertical_rate {
        vsr = 0.0;
    }
    let alt_change = vsr * METERS_PER_FPM_10S;

    let mut adjusted = alt_diff;
    if alt_diff > 0.0 && alt_change < 0.0 {
        adjusted += alt_change;
        if adjusted < 0.0 {
            return 0.0;
        }
    } else if alt_diff < 0.0 && alt_change > 0.0 {
        adjusted += alt_change;
        if adjusted > 0.0 {
            return 0.0;
        }
    }

    if adjusted > 0.0 {
        (adjusted - settings.vertical_slack).max(0.0)
    } else {
        (adjusted + settings.vertical_slack).min(0.0)
    }
}

/// Horizontal distance with the adjusted vertical distance folded in
pub fn adjusted_distance(own: &Ownship, contact: &Contact, settings: &AlarmSettings) -> f64 {
    contact.distance + settings.vertical_slope * adjusted_alt_diff(own, contact, settings).abs()
}

/// Ground velocity as a north/east vector in knots
pub fn ground_velocity(course: f64, speed: f64) -> Vector2<f64> {
    let rad = course.to_radians();
    Vector2::new(speed * rad.cos(), speed * rad.sin())
}

/// Velocity of ownship relative to the contact
pub fn closure(own: &Ownship, contact: &Contact) -> Closure {
    let rel = ground_velocity(own.course, own.speed) - ground_velocity(contact.course, contact.speed);
    Closure {
        speed: rel.norm() * MPS_PER_KNOT,
        direction: bearing_deg(rel.x, rel.y),
    }
}

/// Seconds until the contact reaches ownship along its closure vector,
/// counting vertical distance at the configured slope.
///
/// None when the closure speed is too low to be meaningful.
pub fn time_to_closest_approach(
    own: &Ownship,
    contact: &Contact,
    settings: &AlarmSettings,
) -> Option<f64> {
    closure(own, contact).time_to_cover(adjusted_distance(own, contact, settings), settings.vector_speed)
}

/// Refresh the relative geometry cached on a contact
pub fn update_geometry(own: &Ownship, contact: &mut Contact, settings: &AlarmSettings) {
    let rel = relative_geometry(own, contact.latitude, contact.longitude, contact.altitude);
    contact.distance = rel.distance;
    contact.bearing = rel.bearing;
    contact.alt_diff = rel.alt_diff;
    contact.adj_alt_diff = adjusted_alt_diff(own, contact, settings);
    contact.adj_distance =
        contact.distance + settings.vertical_slope * contact.adj_alt_diff.abs();
}
