//! Alarm severity and alert watermark

use serde::{Deserialize, Serialize};

/// Collision alarm severity, ordered NONE < CLOSE < LOW < IMPORTANT < URGENT
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AlarmLevel {
    #[default]
    None = 0,
    /// Nearby traffic, advisory only
    Close = 1,
    /// Approx. 19 seconds to impact
    Low = 2,
    /// Approx. 13 seconds to impact
    Important = 3,
    /// Approx. 8 seconds to impact
    Urgent = 4,
}

impl AlarmLevel {
    pub fn from_value(v: u8) -> Self {
        match v {
            0 => AlarmLevel::None,
            1 => AlarmLevel::Close,
            2 => AlarmLevel::Low,
            3 => AlarmLevel::Important,
            _ => AlarmLevel::Urgent,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Step down by `steps` levels, bottoming out at NONE
    pub fn lower(self, steps: u8) -> Self {
        AlarmLevel::from_value(self.value().saturating_sub(steps))
    }

    /// Level in the 0..=3 range of the serial traffic sentences, where
    /// CLOSE has no representation of its own and folds into 0.
    pub fn nmea_value(self) -> u8 {
        self.value().saturating_sub(1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmLevel::None => "none",
            AlarmLevel::Close => "close",
            AlarmLevel::Low => "low",
            AlarmLevel::Important => "important",
            AlarmLevel::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Highest alarm level already announced for a contact, plus one.
///
/// The watermark can sit one step above URGENT, which no alarm level
/// reaches, so a contact that was alerted at URGENT stays quiet until
/// its alarm drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertLevel(u8);

impl AlertLevel {
    pub const NONE: AlertLevel = AlertLevel(0);

    /// Watermark that suppresses alerts at `level` and below
    pub fn above(level: AlarmLevel) -> Self {
        AlertLevel(level.value() + 1)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// True if `level` is strictly above the watermark
    pub fn is_exceeded_by(self, level: AlarmLevel) -> bool {
        level.value() > self.0
    }

    /// True if the watermark is more than one step above `level`
    pub fn is_stale_for(self, level: AlarmLevel) -> bool {
        self.0 > level.value() + 1
    }
}
