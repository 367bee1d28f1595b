//! Ownship and traffic contact records
//!
//! Units follow the radio protocol rather than SI: horizontal speed in
//! knots, vertical speed in ft/min, altitude in metres above the ellipsoid,
//! turn rate in degrees per second (positive is clockwise).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::address::{AddressType, Protocol};
use crate::alarm::{AlarmLevel, AlertLevel};

bitflags! {
    /// Status bits carried by a transmitting aircraft
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ContactFlags: u8 {
        const AIRBORNE = 0b0000_0001;
        /// Hide position from third-party displays unless close
        const STEALTH = 0b0000_0010;
        /// Do not forward to ground tracking networks
        const NO_TRACK = 0b0000_0100;
    }
}

bitflags! {
    /// Per-contact notification state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AlertFlags: u8 {
        /// Audible alert was raised
        const SOUND = 0b0000_0001;
        /// Spoken announcement was raised
        const VOICE = 0b0000_0010;
    }
}

/// Four velocity samples at 3-second spacing, quarter-metre/second units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VelocitySamples {
    pub ns: [i16; 4],
    pub ew: [i16; 4],
}

/// Our own aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ownship {
    pub address: u32,
    pub address_type: AddressType,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above the ellipsoid
    pub altitude: f64,
    /// Geoid separation at the current position, metres
    pub geoid_separation: f64,
    pub course: f64,
    /// Knots
    pub speed: f64,
    /// Feet per minute
    pub vs: f64,
    /// Degrees per second
    pub turnrate: f64,
    /// Unix seconds of the current fix, 0 before the first fix
    pub timestamp: u32,
    /// Milliseconds of the current fix
    pub fix_ms: u64,
    /// Milliseconds of the previous fix, if any
    pub prev_fix_ms: Option<u64>,
    pub flags: ContactFlags,
    pub aircraft_type: u8,
    /// Sustained turning, as determined by the flight computer
    pub circling: bool,
}

impl Default for Ownship {
    fn default() -> Self {
        Ownship {
            address: 0,
            address_type: AddressType::Icao,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            geoid_separation: 0.0,
            course: 0.0,
            speed: 0.0,
            vs: 0.0,
            turnrate: 0.0,
            timestamp: 0,
            fix_ms: 0,
            prev_fix_ms: None,
            flags: ContactFlags::empty(),
            aircraft_type: 1,
            circling: false,
        }
    }
}

impl Ownship {
    pub fn new(address: u32, address_type: AddressType) -> Self {
        Ownship {
            address,
            address_type,
            ..Default::default()
        }
    }

    /// True once at least two fixes have been recorded
    pub fn has_prior_fix(&self) -> bool {
        self.prev_fix_ms.is_some()
    }

    /// Record the time of a new GNSS fix, shifting the current one into
    /// `prev_fix_ms`.
    pub fn record_fix(&mut self, timestamp: u32, fix_ms: u64) {
        if self.timestamp != 0 {
            self.prev_fix_ms = Some(self.fix_ms);
        }
        self.timestamp = timestamp;
        self.fix_ms = fix_ms;
    }

    pub fn is_airborne(&self) -> bool {
        self.flags.contains(ContactFlags::AIRBORNE)
    }

    pub fn is_stealth(&self) -> bool {
        self.flags.contains(ContactFlags::STEALTH)
    }
}

/// A nearby aircraft as held in the traffic registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// 24-bit address, zero marks an empty record
    pub address: u32,
    pub address_type: AddressType,
    pub protocol: Protocol,

    pub latitude: f64,
    pub longitude: f64,
    /// Metres above the ellipsoid
    pub altitude: f64,

    // Geometry relative to ownship, refreshed on every update
    pub distance: f64,
    pub bearing: f64,
    pub alt_diff: f64,
    pub adj_alt_diff: f64,
    pub adj_distance: f64,

    pub course: f64,
    /// Knots
    pub speed: f64,
    /// Feet per minute
    pub vs: f64,
    /// Degrees per second
    pub turnrate: f64,
    pub velocity: VelocitySamples,

    pub flags: ContactFlags,
    pub aircraft_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,

    /// Unix seconds of the last update
    pub timestamp: u32,
    /// Milliseconds of the fix that produced the last update
    pub fix_ms: u64,
    /// Milliseconds of the fix before that, once the contact has history
    pub prev_fix_ms: Option<u64>,
    /// Course reported by the previous update
    pub prev_course: Option<f64>,

    pub alarm_level: AlarmLevel,
    pub alert_level: AlertLevel,
    pub alert: AlertFlags,
}

impl Contact {
    /// Create a contact with only an identity, everything else zeroed
    pub fn new(address: u32, address_type: AddressType, protocol: Protocol) -> Self {
        Contact {
            address,
            address_type,
            protocol,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            distance: 0.0,
            bearing: 0.0,
            alt_diff: 0.0,
            adj_alt_diff: 0.0,
            adj_distance: 0.0,
            course: 0.0,
            speed: 0.0,
            vs: 0.0,
            turnrate: 0.0,
            velocity: VelocitySamples::default(),
            flags: ContactFlags::empty(),
            aircraft_type: 0,
            callsign: None,
            rssi: None,
            timestamp: 0,
            fix_ms: 0,
            prev_fix_ms: None,
            prev_course: None,
            alarm_level: AlarmLevel::None,
            alert_level: AlertLevel::NONE,
            alert: AlertFlags::empty(),
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.flags.contains(ContactFlags::AIRBORNE)
    }

    pub fn is_stealth(&self) -> bool {
        self.flags.contains(ContactFlags::STEALTH)
    }

    /// Seconds since the last update, zero if the clock went backwards
    pub fn age(&self, now: u32) -> u32 {
        now.saturating_sub(self.timestamp)
    }

    /// Carry history from the record being replaced: the old fix time
    /// becomes the previous fix, and the notification state survives.
    pub(crate) fn inherit(&mut self, old: &Contact) {
        self.prev_fix_ms = Some(old.fix_ms);
        self.prev_course = Some(old.course);
        self.alert_level = old.alert_level;
        self.alert = old.alert;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fix() {
        let mut own = Ownship::new(0x123456, AddressType::Icao);
        assert!(!own.has_prior_fix());

        own.record_fix(1_700_000_000, 1_000);
        assert!(!own.has_prior_fix());

        own.record_fix(1_700_000_001, 2_000);
        assert_eq!(own.prev_fix_ms, Some(1_000));
        assert_eq!(own.fix_ms, 2_000);
        assert!(own.has_prior_fix());
    }

    #[test]
    fn test_inherit_preserves_alert_state() {
        let mut old = Contact::new(0xABCDEF, AddressType::Flarm, Protocol::Legacy);
        old.fix_ms = 5_000;
        old.course = 90.0;
        old.alert_level = AlertLevel::above(AlarmLevel::Low);
        old.alert = AlertFlags::SOUND;

        let mut fresh = Contact::new(0xABCDEF, AddressType::Flarm, Protocol::Legacy);
        fresh.fix_ms = 6_000;
        fresh.inherit(&old);

        assert_eq!(fresh.prev_fix_ms, Some(5_000));
        assert_eq!(fresh.prev_course, Some(90.0));
        assert_eq!(fresh.alert_level, AlertLevel::above(AlarmLevel::Low));
        assert_eq!(fresh.alert, AlertFlags::SOUND);
    }

    #[test]
    fn test_age_saturates() {
        let mut c = Contact::new(1, AddressType::Random, Protocol::Legacy);
        c.timestamp = 100;
        assert_eq!(c.age(105), 5);
        assert_eq!(c.age(90), 0);
    }
}
