//! Collision Alarm Engine
//!
//! Turns the relative geometry of a contact into an [`AlarmLevel`], using
//! one of several selectable algorithms, and tracks per-contact alert
//! hysteresis so that a contact is announced once per escalation.
//!
//! # Algorithms
//!
//! - **Distance**: buckets the horizontal distance, inflated by the
//!   rate-adjusted vertical distance, against fixed radii.
//! - **Vector**: estimates time to impact along the relative velocity
//!   vector and widens the thresholds the closer the contact's bearing is
//!   to the closure direction. Falls back to Distance while circling.
//! - **None** / **Legacy**: never alarm. Legacy is reserved for a
//!   multi-sample path predictor.
//!
//! Insufficient data always yields [`AlarmLevel::None`], never an error.

mod level;

pub use level::{AlarmLevel, AlertLevel};

use serde::{Deserialize, Serialize};

use crate::aircraft::{AlertFlags, Contact, Ownship};
use crate::geometry::{adjusted_alt_diff, adjusted_distance, angle_between, closure};
use crate::settings::AlarmSettings;
use crate::units::MPS_PER_KNOT;

/// Selectable alarm algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmAlgorithm {
    None,
    Distance,
    #[default]
    Vector,
    Legacy,
}

impl AlarmAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmAlgorithm::None => "none",
            AlarmAlgorithm::Distance => "distance",
            AlarmAlgorithm::Vector => "vector",
            AlarmAlgorithm::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for AlarmAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for AlarmAlgorithm {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AlarmAlgorithm::None),
            "distance" => Ok(AlarmAlgorithm::Distance),
            "vector" => Ok(AlarmAlgorithm::Vector),
            "legacy" => Ok(AlarmAlgorithm::Legacy),
            _ => Err(format!("Unknown alarm algorithm: {}", s)),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Computes alarm levels with the selected algorithm
#[derive(Debug, Clone)]
pub struct AlarmEngine {
    algorithm: AlarmAlgorithm,
    settings: AlarmSettings,
}

impl Default for AlarmEngine {
    fn default() -> Self {
        AlarmEngine::new(AlarmAlgorithm::default(), AlarmSettings::default())
    }
}

impl AlarmEngine {
    pub fn new(algorithm: AlarmAlgorithm, settings: AlarmSettings) -> Self {
        AlarmEngine {
            algorithm,
            settings,
        }
    }

    pub fn algorithm(&self) -> AlarmAlgorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: AlarmAlgorithm) {
        self.algorithm = algorithm;
    }

    pub fn settings(&self) -> &AlarmSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: AlarmSettings) {
        self.settings = settings;
    }

    /// Alarm level for a contact whose geometry is up to date
    pub fn evaluate(&self, own: &Ownship, contact: &Contact) -> AlarmLevel {
        match self.algorithm {
            AlarmAlgorithm::Distance => self.distance_level(own, contact),
            AlarmAlgorithm::Vector => self.vector_level(own, contact),
            AlarmAlgorithm::None | AlarmAlgorithm::Legacy => AlarmLevel::None,
        }
    }

    /// Coarse range gate shared by all geometric algorithms
    fn out_of_range(&self, contact: &Contact) -> bool {
        let s = &self.settings;
        contact.distance > 2.0 * s.zones.close
            || contact.alt_diff.abs() > 2.0 * s.vertical_separation
    }

    pub fn distance_level(&self, own: &Ownship, contact: &Contact) -> AlarmLevel {
        let s = &self.settings;
        if !own.has_prior_fix() || self.out_of_range(contact) {
            return AlarmLevel::None;
        }

        let abs_adj = adjusted_alt_diff(own, contact, s).abs();
        if abs_adj >= s.vertical_separation {
            return AlarmLevel::None;
        }

        s.zones.level_for(contact.distance + s.vertical_slope * abs_adj)
    }

    pub fn vector_level(&self, own: &Ownship, contact: &Contact) -> AlarmLevel {
        let s = &self.settings;
        if !own.has_prior_fix() {
            return AlarmLevel::None;
        }

        // Need two recent sightings of the contact
        match contact.prev_fix_ms {
            Some(prev) if contact.fix_ms.saturating_sub(prev) <= s.max_history_gap_ms => {}
            _ => return AlarmLevel::None,
        }

        if self.out_of_range(contact) {
            return AlarmLevel::None;
        }

        let closing_speed = (own.speed + contact.speed) * MPS_PER_KNOT;
        if closing_speed <= 0.0 || contact.distance / closing_speed > s.times.close {
            return AlarmLevel::None;
        }

        // Straight-line extrapolation is meaningless in a turn
        if own.circling
            || own.turnrate.abs() > s.turn_threshold
            || contact.turnrate.abs() > s.turn_threshold
        {
            return self.distance_level(own, contact);
        }

        if adjusted_alt_diff(own, contact, s).abs() >= s.vertical_separation {
            return AlarmLevel::None;
        }

        let closure = closure(own, contact);
        let Some(seconds) = closure.time_to_cover(adjusted_distance(own, contact, s), s.vector_speed)
        else {
            return AlarmLevel::None;
        };

        let offset = angle_between(closure.direction, contact.bearing);
        let by_time = s.times.level_for(seconds);

        if offset < s.vector_angle {
            by_time
        } else if offset < 2.0 * s.vector_angle {
            by_time.lower(1)
        } else if offset < 3.0 * s.vector_angle {
            by_time.lower(2)
        } else {
            AlarmLevel::None
        }
    }
}

// =============================================================================
// Alert hysteresis
// =============================================================================

/// Lower the alert watermark after the alarm level has dropped, so that a
/// later escalation is announced again
pub fn relax_alert(contact: &mut Contact) {
    if contact.alert_level.is_stale_for(contact.alarm_level) {
        contact.alert_level = AlertLevel::above(contact.alarm_level);
    }
}

/// True if the contact's alarm is above its watermark and worth announcing
pub fn wants_alert(contact: &Contact) -> bool {
    contact.alarm_level > AlarmLevel::Close && contact.alert_level.is_exceeded_by(contact.alarm_level)
}

/// Record that the contact was announced at its current alarm level
pub fn mark_alerted(contact: &mut Contact) {
    contact.alert_level = AlertLevel::above(contact.alarm_level);
    contact.alert |= AlertFlags::SOUND;
}
