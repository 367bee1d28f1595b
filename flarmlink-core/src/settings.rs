//! Traffic processing settings
//!
//! All settings deserialize from camelCase JSON and fall back to defaults
//! for any missing field, so a partial config file is valid.

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmAlgorithm, AlarmLevel};

/// Distance thresholds in metres for the distance alarm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmZones {
    pub urgent: f64,
    pub important: f64,
    pub low: f64,
    pub close: f64,
}

impl Default for AlarmZones {
    fn default() -> Self {
        AlarmZones {
            urgent: 400.0,
            important: 700.0,
            low: 1000.0,
            close: 1500.0,
        }
    }
}

impl AlarmZones {
    pub fn level_for(&self, distance: f64) -> AlarmLevel {
        band(distance, [self.urgent, self.important, self.low, self.close])
    }
}

/// Time-to-impact thresholds in seconds for the vector alarm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmTimes {
    pub urgent: f64,
    pub important: f64,
    pub low: f64,
    pub close: f64,
}

impl Default for AlarmTimes {
    fn default() -> Self {
        AlarmTimes {
            urgent: 8.0,
            important: 13.0,
            low: 19.0,
            close: 30.0,
        }
    }
}

impl AlarmTimes {
    pub fn level_for(&self, seconds: f64) -> AlarmLevel {
        band(seconds, [self.urgent, self.important, self.low, self.close])
    }
}

fn band(value: f64, limits: [f64; 4]) -> AlarmLevel {
    const LEVELS: [AlarmLevel; 4] = [
        AlarmLevel::Urgent,
        AlarmLevel::Important,
        AlarmLevel::Low,
        AlarmLevel::Close,
    ];
    LEVELS
        .iter()
        .zip(limits)
        .find(|(_, limit)| value < *limit)
        .map(|(level, _)| *level)
        .unwrap_or(AlarmLevel::None)
}

/// Alarm engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmSettings {
    pub zones: AlarmZones,
    pub times: AlarmTimes,
    /// Width in degrees of each angular band of the vector alarm
    pub vector_angle: f64,
    /// Minimum closure speed in m/s for the vector alarm
    pub vector_speed: f64,
    /// Turn rate in deg/s above which the vector alarm defers to distance
    pub turn_threshold: f64,
    /// Contacts whose last two fixes are further apart than this have no
    /// usable velocity history
    pub max_history_gap_ms: u64,
    /// Vertical distance in metres beyond which no alarm is raised
    pub vertical_separation: f64,
    /// Weight of vertical distance when folded into horizontal distance
    pub vertical_slope: f64,
    /// Vertical distance in metres treated as zero
    pub vertical_slack: f64,
    /// Relative vertical speed in ft/min above which it is treated as noise
    pub max_vertical_rate: f64,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        AlarmSettings {
            zones: AlarmZones::default(),
            times: AlarmTimes::default(),
            vector_angle: 10.0,
            vector_speed: 2.0,
            turn_threshold: 3.0,
            max_history_gap_ms: 3000,
            vertical_separation: 300.0,
            vertical_slope: 5.0,
            vertical_slack: 60.0,
            max_vertical_rate: 1000.0,
        }
    }
}

/// Which side computes alarm levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSource {
    /// Alarm levels are computed here from geometry
    #[default]
    Computed,
    /// Alarm levels arrive with the contact from an external unit and are
    /// kept as received
    Trusted,
}

/// Traffic registry parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrySettings {
    /// Number of contact slots
    pub capacity: usize,
    /// Seconds without an update before a contact is dropped
    pub expiration_secs: u32,
    /// Minimum seconds between alarm re-evaluations of a stale contact
    pub reevaluate_secs: u32,
    pub alarm_source: AlarmSource,
    /// Drop contacts further than this many metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_range: Option<f64>,
    /// Drop contacts with at least this many metres of altitude difference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_filter: Option<f64>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        RegistrySettings {
            capacity: 8,
            expiration_secs: 10,
            reevaluate_secs: 2,
            alarm_source: AlarmSource::Computed,
            max_range: None,
            vertical_filter: None,
        }
    }
}

/// Traffic report parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSettings {
    /// Seconds after which a contact is left out of reports
    pub export_expiration_secs: u32,
    /// Horizontal range in metres for reporting contacts without alarm
    pub visibility_range: f64,
    /// Vertical range in metres for reporting contacts without alarm
    pub vertical_visibility: f64,
    /// Stealth contacts further than this are hidden unless alarming
    pub stealth_distance: f64,
    /// Stealth contacts with more altitude difference are hidden unless
    /// alarming
    pub stealth_vertical: f64,
    /// Contact always reported and listed first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_address: Option<u32>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            export_expiration_secs: 5,
            visibility_range: 10_000.0,
            vertical_visibility: 2_000.0,
            stealth_distance: 2_000.0,
            stealth_vertical: 300.0,
            follow_address: None,
        }
    }
}

/// Complete settings for traffic processing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrafficSettings {
    pub algorithm: AlarmAlgorithm,
    pub alarm: AlarmSettings,
    pub registry: RegistrySettings,
    pub report: ReportSettings,
    /// Address whose packets are discarded on receive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_address: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_bands() {
        let zones = AlarmZones::default();
        assert_eq!(zones.level_for(100.0), AlarmLevel::Urgent);
        assert_eq!(zones.level_for(400.0), AlarmLevel::Important);
        assert_eq!(zones.level_for(999.0), AlarmLevel::Low);
        assert_eq!(zones.level_for(1200.0), AlarmLevel::Close);
        assert_eq!(zones.level_for(1500.0), AlarmLevel::None);
    }

    #[test]
    fn test_time_bands() {
        let times = AlarmTimes::default();
        assert_eq!(times.level_for(5.0), AlarmLevel::Urgent);
        assert_eq!(times.level_for(12.9), AlarmLevel::Important);
        assert_eq!(times.level_for(29.0), AlarmLevel::Close);
        assert_eq!(times.level_for(31.0), AlarmLevel::None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"algorithm":"distance","registry":{"capacity":4}}"#;
        let settings: TrafficSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.algorithm, AlarmAlgorithm::Distance);
        assert_eq!(settings.registry.capacity, 4);
        assert_eq!(settings.registry.expiration_secs, 10);
        assert_eq!(settings.alarm.vertical_separation, 300.0);
        assert!(settings.ignore_address.is_none());
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let json = serde_json::to_value(TrafficSettings::default()).unwrap();
        assert_eq!(json["registry"]["expirationSecs"], 10);
        assert_eq!(json["alarm"]["verticalSlack"], 60.0);
        assert_eq!(json["registry"]["alarmSource"], "computed");
    }
}
