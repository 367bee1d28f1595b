//! Spoken traffic announcements

use serde::{Deserialize, Serialize};

use crate::aircraft::Contact;
use crate::geometry::normalize_bearing;
use crate::units::{FEET_PER_METER, MILES_PER_METER, MPH_PER_KNOT};

/// Unit system for announcements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kilometres and metres
    #[default]
    Metric,
    /// Nautical miles and feet
    Imperial,
    /// Kilometres and feet
    Mixed,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "mixed" => Ok(Units::Mixed),
            _ => Err(format!("Unknown units: {}", s)),
        }
    }
}

const CLOCK: [&str; 12] = [
    "ahead", "1oclock", "2oclock", "3oclock", "4oclock", "5oclock", "6oclock", "7oclock",
    "8oclock", "9oclock", "10oclock", "11oclock",
];

/// Clock position of a bearing relative to the track
pub fn clock_position(bearing: f64, track: f64) -> &'static str {
    let relative = normalize_bearing(bearing - track) as u32;
    CLOCK[(((relative + 15) % 360) / 30) as usize]
}

/// Compose the phrase announcing a contact, e.g.
/// "traffic 2oclock distance 3 kms altitude 2 hundred metres above"
pub fn announcement(contact: &Contact, track: f64, units: Units) -> String {
    let (distance, distance_unit) = match units {
        Units::Imperial => (contact.distance * MILES_PER_METER / MPH_PER_KNOT, "miles"),
        Units::Metric | Units::Mixed => (contact.distance / 1000.0, "kms"),
    };
    let (altitude, altitude_unit) = match units {
        Units::Metric => ((contact.alt_diff as i32).abs(), "metres"),
        Units::Imperial | Units::Mixed => (((contact.alt_diff * FEET_PER_METER) as i32).abs(), "feet"),
    };

    let how_far = if distance < 1.0 {
        "near".to_string()
    } else {
        format!("{} {}", distance.min(9.0) as u32, distance_unit)
    };

    let elevation = if altitude < 100 {
        "near".to_string()
    } else {
        format!(
            "{} hundred {} {}",
            altitude.min(500) / 100,
            altitude_unit,
            if contact.alt_diff > 0.0 { "above" } else { "below" }
        )
    };

    format!(
        "traffic {} distance {} altitude {}",
        clock_position(contact.bearing, track),
        how_far,
        elevation
    )
}
