//! Traffic report view
//!
//! Prepares registry contents for export to a navigation display: which
//! contacts to show, in what order, which one is the high-priority target,
//! and what must be masked for aircraft flying in stealth mode. Sentence
//! formatting is left to the transport.

use serde::{Deserialize, Serialize};

use crate::address::{AddressType, Protocol};
use crate::aircraft::{Contact, Ownship};
use crate::alarm::AlarmLevel;
use crate::geometry::relative_bearing;
use crate::registry::TrafficRegistry;
use crate::settings::ReportSettings;
use crate::units::{fpm_to_mps, MPS_PER_KNOT};

/// First of the substitute addresses shown for stealth contacts
pub const ANONYMOUS_ADDRESS_BASE: u32 = 0x00FF_FFF0;

/// Climb rates are reported within this many m/s
const MAX_CLIMB_RATE: f64 = 32.7;

/// One contact as it should be shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedContact {
    pub address: u32,
    pub address_type: AddressType,
    pub protocol: Protocol,
    pub alarm_level: AlarmLevel,
    /// Metres north of ownship
    pub relative_north: f64,
    /// Metres east of ownship
    pub relative_east: f64,
    pub distance: f64,
    /// Degrees relative to ownship track, -180..180
    pub relative_bearing: f64,
    /// Whole metres, positive above ownship
    pub alt_diff: i32,
    /// Degrees true, absent when masked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<f64>,
    /// Metres per second, absent when masked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Metres per second, absent when masked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climb_rate: Option<f64>,
    pub aircraft_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    pub anonymous: bool,
}

/// The single most relevant contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityTarget {
    pub address: u32,
    pub alarm_level: AlarmLevel,
    pub relative_bearing: f64,
    pub alt_diff: i32,
    pub distance: f64,
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficReport {
    /// Followed contact first, then by alarm level and adjusted distance
    pub contacts: Vec<ReportedContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityTarget>,
}

/// Blur an altitude difference to the nearest 256 m band
fn fuzz_altitude(alt_diff: i32) -> i32 {
    (alt_diff & !0xFF) + 128
}

struct Candidate<'a> {
    contact: &'a Contact,
    stealth: bool,
}

impl Candidate<'_> {
    /// Stealth contacts without an alarm lose their kinematics
    fn masked(&self) -> bool {
        self.stealth && self.contact.alarm_level <= AlarmLevel::Close
    }
}

/// Build the report for the current registry contents
pub fn priority_view(
    registry: &TrafficRegistry,
    own: &Ownship,
    settings: &ReportSettings,
    now: u32,
) -> TrafficReport {
    let follow = settings.follow_address;

    let mut candidates: Vec<Candidate> = registry
        .iter()
        .filter(|c| c.age(now) <= settings.export_expiration_secs)
        .map(|c| Candidate {
            contact: c,
            stealth: c.is_stealth() || own.is_stealth(),
        })
        .filter(|cand| {
            let c = cand.contact;
            let hidden = cand.masked()
                && (c.distance > settings.stealth_distance
                    || c.alt_diff.abs() > settings.stealth_vertical);
            let relevant = c.alarm_level > AlarmLevel::None
                || (c.distance < settings.visibility_range
                    && c.adj_alt_diff.abs() < settings.vertical_visibility)
                || Some(c.address) == follow;
            relevant && !hidden
        })
        .collect();

    candidates.sort_by(|a, b| {
        let (a, b) = (a.contact, b.contact);
        let followed = |c: &Contact| Some(c.address) == follow;
        followed(b)
            .cmp(&followed(a))
            .then(b.alarm_level.cmp(&a.alarm_level))
            .then(a.adj_distance.total_cmp(&b.adj_distance))
    });

    let contacts: Vec<ReportedContact> = candidates
        .iter()
        .enumerate()
        .map(|(i, cand)| report_contact(cand, i, own))
        .collect();

    let mut priority: Option<(usize, &Contact)> = None;
    for (i, cand) in candidates.iter().enumerate() {
        let c = cand.contact;
        let better = priority.map_or(true, |(_, hp)| {
            c.alarm_level > hp.alarm_level
                || (c.alarm_level == hp.alarm_level && c.adj_distance < hp.adj_distance)
        });
        if better {
            priority = Some((i, c));
        }
    }

    let priority = priority.map(|(i, _)| {
        let reported = &contacts[i];
        PriorityTarget {
            address: reported.address,
            alarm_level: reported.alarm_level,
            relative_bearing: reported.relative_bearing,
            alt_diff: reported.alt_diff,
            distance: reported.distance,
            anonymous: reported.anonymous,
        }
    });

    TrafficReport { contacts, priority }
}

fn report_contact(cand: &Candidate, position: usize, own: &Ownship) -> ReportedContact {
    let c = cand.contact;
    let rad = c.bearing.to_radians();

    let (address, address_type) = if cand.stealth {
        (ANONYMOUS_ADDRESS_BASE + position as u32, AddressType::Anonymous)
    } else {
        (c.address, c.address_type)
    };

    let alt_diff = c.alt_diff as i32;
    let masked = cand.masked();

    ReportedContact {
        address,
        address_type,
        protocol: c.protocol,
        alarm_level: c.alarm_level,
        relative_north: c.distance * rad.cos(),
        relative_east: c.distance * rad.sin(),
        distance: c.distance,
        relative_bearing: relative_bearing(c.bearing, own.course),
        alt_diff: if masked { fuzz_altitude(alt_diff) } else { alt_diff },
        course: (!masked).then_some(c.course),
        speed: (!masked).then_some(c.speed * MPS_PER_KNOT),
        climb_rate: (!masked).then(|| fpm_to_mps(c.vs).clamp(-MAX_CLIMB_RATE, MAX_CLIMB_RATE)),
        aircraft_type: c.aircraft_type,
        callsign: if cand.stealth { None } else { c.callsign.clone() },
        anonymous: cand.stealth,
    }
}
