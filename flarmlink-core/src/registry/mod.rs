//! Traffic Registry
//!
//! Bounded set of nearby aircraft. New sightings are merged by address;
//! when every slot is taken, a newcomer may displace an expired contact,
//! then a contact with a lower alarm level, then a contact further away.
//!
//! The registry owns the [`AlarmEngine`] so that geometry and alarm level
//! are always computed against the same ownship state that drives
//! eviction decisions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use flarmlink_core::{TrafficRegistry, TrafficSettings, TrafficEvent};
//!
//! let mut registry = TrafficRegistry::from_settings(&TrafficSettings::default());
//!
//! // On every received packet
//! registry.upsert(&ownship, contact, now);
//!
//! // Once per second
//! for event in registry.refresh(&ownship, now) {
//!     if let TrafficEvent::Alert(alert) = event {
//!         sound(alert.alarm_level);
//!     }
//! }
//! ```

mod slots;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use self::slots::SlotTable;
use crate::address::AddressType;
use crate::aircraft::{Contact, Ownship};
use crate::alarm::{mark_alerted, relax_alert, wants_alert, AlarmAlgorithm, AlarmEngine, AlarmLevel};
use crate::geometry::{adjusted_distance, update_geometry};
use crate::settings::{AlarmSettings, AlarmSource, RegistrySettings, TrafficSettings};

/// Why an existing contact was displaced by a newcomer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Not updated within the expiration time
    Expired,
    /// Lowest alarm level in the registry, below the newcomer's
    LowerAlarm,
    /// Furthest away, and the newcomer is nearer without a lower alarm
    Farther,
}

/// Result of merging a sighting into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// Existing contact with the same address was refreshed
    Updated { slot: usize },
    /// Contact took an empty slot
    Inserted { slot: usize },
    /// Contact displaced another
    Replaced {
        slot: usize,
        evicted: u32,
        reason: EvictionReason,
    },
    /// Rejected by the range or vertical display filters
    Filtered,
    /// No room and nothing to displace
    Dropped,
}

impl UpsertOutcome {
    /// True if the contact is now held in the registry
    pub fn is_stored(&self) -> bool {
        !matches!(self, UpsertOutcome::Filtered | UpsertOutcome::Dropped)
    }
}

/// A contact that should be announced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficAlert {
    pub address: u32,
    pub address_type: AddressType,
    pub alarm_level: AlarmLevel,
    pub distance: f64,
    pub bearing: f64,
    pub alt_diff: f64,
}

impl From<&Contact> for TrafficAlert {
    fn from(c: &Contact) -> Self {
        TrafficAlert {
            address: c.address,
            address_type: c.address_type,
            alarm_level: c.alarm_level,
            distance: c.distance,
            bearing: c.bearing,
            alt_diff: c.alt_diff,
        }
    }
}

/// Events emitted by [`TrafficRegistry::refresh`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrafficEvent {
    /// Contact dropped after its expiration time
    Expired { address: u32 },
    /// The single contact to announce this cycle
    Alert(TrafficAlert),
}

/// Fixed-capacity collection of tracked contacts
#[derive(Debug, Clone)]
pub struct TrafficRegistry {
    slots: SlotTable,
    engine: AlarmEngine,
    settings: RegistrySettings,
}

impl Default for TrafficRegistry {
    fn default() -> Self {
        TrafficRegistry::from_settings(&TrafficSettings::default())
    }
}

/// Fill in geometry and, unless the alarm arrives with the contact, the
/// alarm level
fn assess(engine: &AlarmEngine, source: AlarmSource, own: &Ownship, contact: &mut Contact) {
    update_geometry(own, contact, engine.settings());
    if source == AlarmSource::Computed {
        contact.alarm_level = engine.evaluate(own, contact);
    }
}

impl TrafficRegistry {
    pub fn new(engine: AlarmEngine, settings: RegistrySettings) -> Self {
        TrafficRegistry {
            slots: SlotTable::new(settings.capacity),
            engine,
            settings,
        }
    }

    pub fn from_settings(settings: &TrafficSettings) -> Self {
        TrafficRegistry::new(
            AlarmEngine::new(settings.algorithm, settings.alarm.clone()),
            settings.registry.clone(),
        )
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn alarm_settings(&self) -> &AlarmSettings {
        self.engine.settings()
    }

    pub fn algorithm(&self) -> AlarmAlgorithm {
        self.engine.algorithm()
    }

    /// Switch alarm algorithm; takes effect on the next evaluation
    pub fn set_algorithm(&mut self, algorithm: AlarmAlgorithm) {
        info!("Alarm algorithm set to {}", algorithm);
        self.engine.set_algorithm(algorithm);
    }

    fn is_expired(&self, contact: &Contact, now: u32) -> bool {
        contact.age(now) > self.settings.expiration_secs
    }

    fn is_filtered(&self, contact: &Contact) -> bool {
        if let Some(max_range) = self.settings.max_range {
            if contact.distance > max_range {
                return true;
            }
        }
        if let Some(vertical) = self.settings.vertical_filter {
            if contact.alt_diff.abs() > vertical {
                return true;
            }
        }
        false
    }

    /// Merge a sighting into the registry
    pub fn upsert(&mut self, own: &Ownship, mut candidate: Contact, now: u32) -> UpsertOutcome {
        if candidate.address == 0 {
            trace!("Ignoring contact without address");
            return UpsertOutcome::Dropped;
        }

        // Re-sighting: carry history and notification state over before
        // assessing, the vector algorithm needs the previous fix
        let existing = self.slots.find(candidate.address);
        if let Some(old) = existing.and_then(|slot| self.slots.get(slot)) {
            candidate.inherit(old);
        }

        assess(&self.engine, self.settings.alarm_source, own, &mut candidate);

        if self.is_filtered(&candidate) {
            trace!(
                "Filtered {:06X} at {:.0} m, {:.0} m vertical",
                candidate.address,
                candidate.distance,
                candidate.alt_diff
            );
            return UpsertOutcome::Filtered;
        }

        if let Some(slot) = existing {
            self.slots.put(slot, candidate);
            return UpsertOutcome::Updated { slot };
        }

        let address = candidate.address;

        // Empty or expired slot
        let reusable = (0..self.slots.capacity()).find(|&i| match self.slots.get(i) {
            None => true,
            Some(c) => self.is_expired(c, now),
        });
        if let Some(slot) = reusable {
            return match self.slots.put(slot, candidate) {
                None => {
                    debug!("New contact {:06X} in slot {}", address, slot);
                    UpsertOutcome::Inserted { slot }
                }
                Some(old) => {
                    debug!("New contact {:06X} replaces expired {:06X}", address, old.address);
                    UpsertOutcome::Replaced {
                        slot,
                        evicted: old.address,
                        reason: EvictionReason::Expired,
                    }
                }
            };
        }

        // Lowest alarm level, first among ties
        let mut lowest: Option<(usize, AlarmLevel)> = None;
        for (slot, c) in self.slots.iter() {
            if lowest.map_or(true, |(_, level)| c.alarm_level < level) {
                lowest = Some((slot, c.alarm_level));
            }
        }
        if let Some((slot, level)) = lowest {
            if candidate.alarm_level > level {
                return self.evict(slot, candidate, EvictionReason::LowerAlarm);
            }
        }

        // Furthest contact, if the newcomer is nearer and at least as urgent
        let mut farthest: Option<(usize, f64)> = None;
        for (slot, c) in self.slots.iter() {
            let d = adjusted_distance(own, c, self.engine.settings());
            if farthest.map_or(true, |(_, max)| d > max) {
                farthest = Some((slot, d));
            }
        }
        if let Some((slot, max)) = farthest {
            let at_least_as_urgent = self
                .slots
                .get(slot)
                .map_or(false, |c| candidate.alarm_level >= c.alarm_level);
            if candidate.adj_distance < max && at_least_as_urgent {
                return self.evict(slot, candidate, EvictionReason::Farther);
            }
        }

        trace!("No room for contact {:06X}", address);
        UpsertOutcome::Dropped
    }

    fn evict(&mut self, slot: usize, candidate: Contact, reason: EvictionReason) -> UpsertOutcome {
        let address = candidate.address;
        let evicted = self.slots.put(slot, candidate).map_or(0, |old| old.address);
        debug!("Contact {:06X} evicts {:06X} ({:?})", address, evicted, reason);
        UpsertOutcome::Replaced {
            slot,
            evicted,
            reason,
        }
    }

    /// Periodic update: drop expired contacts, re-evaluate stale ones,
    /// and pick at most one contact to announce.
    pub fn refresh(&mut self, own: &Ownship, now: u32) -> Vec<TrafficEvent> {
        let mut events = Vec::new();

        for slot in self.slots.occupied() {
            let expired = self.slots.get(slot).map_or(false, |c| self.is_expired(c, now));
            if expired {
                if let Some(old) = self.slots.clear(slot) {
                    debug!("Contact {:06X} expired", old.address);
                    events.push(TrafficEvent::Expired {
                        address: old.address,
                    });
                }
                continue;
            }

            let reevaluate_secs = self.settings.reevaluate_secs;
            let source = self.settings.alarm_source;
            if let Some(contact) = self.slots.get_mut(slot) {
                if contact.age(now) >= reevaluate_secs {
                    assess(&self.engine, source, own, contact);
                }
                relax_alert(contact);
            }
        }

        let mut best: Option<(usize, AlarmLevel)> = None;
        for (slot, c) in self.slots.iter() {
            if wants_alert(c) && best.map_or(true, |(_, level)| c.alarm_level > level) {
                best = Some((slot, c.alarm_level));
            }
        }
        if let Some(contact) = best.and_then(|(slot, _)| self.slots.get_mut(slot)) {
            mark_alerted(contact);
            info!(
                "Traffic alert {} for {:06X} at {:.0} m, bearing {:.0}, {:+.0} m",
                contact.alarm_level, contact.address, contact.distance, contact.bearing, contact.alt_diff
            );
            events.push(TrafficEvent::Alert(TrafficAlert::from(&*contact)));
        }

        events
    }

    /// Drop expired contacts without re-evaluating the rest
    pub fn clear_expired(&mut self, now: u32) -> Vec<u32> {
        let expired: Vec<usize> = self
            .slots
            .iter()
            .filter(|(_, c)| self.is_expired(c, now))
            .map(|(slot, _)| slot)
            .collect();
        expired
            .into_iter()
            .filter_map(|slot| self.slots.clear(slot))
            .map(|c| c.address)
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear_all();
    }

    pub fn get(&self, address: u32) -> Option<&Contact> {
        self.slots.find(address).and_then(|slot| self.slots.get(slot))
    }

    /// Live contacts in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.slots.iter().map(|(_, c)| c)
    }

    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Live contacts, nearest first
    pub fn by_distance(&self) -> Vec<&Contact> {
        let mut contacts: Vec<&Contact> = self.iter().collect();
        contacts.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        contacts
    }

    /// Owned copy of all live contacts, for serialization
    pub fn snapshot(&self) -> Vec<Contact> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Protocol;
    use crate::aircraft::AlertFlags;
    use crate::alarm::AlertLevel;
    use crate::units::METERS_PER_DEGREE;
    use std::collections::HashSet;

    const NOW: u32 = 1_700_000_100;

    fn test_ownship() -> Ownship {
        let mut own = Ownship::new(0xDD0001, AddressType::Flarm);
        own.latitude = 47.0;
        own.longitude = 8.0;
        own.altitude = 1000.0;
        own.record_fix(NOW - 1, 99_000);
        own.record_fix(NOW, 100_000);
        own
    }

    fn contact_at(own: &Ownship, address: u32, distance: f64, bearing: f64) -> Contact {
        let rad = bearing.to_radians();
        let mut c = Contact::new(address, AddressType::Flarm, Protocol::Legacy);
        c.latitude = own.latitude + distance * rad.cos() / METERS_PER_DEGREE;
        c.longitude = own.longitude
            + distance * rad.sin() / (METERS_PER_DEGREE * own.latitude.to_radians().cos());
        c.altitude = own.altitude;
        c.timestamp = NOW;
        c.fix_ms = 100_000;
        c
    }

    fn registry(algorithm: AlarmAlgorithm) -> TrafficRegistry {
        TrafficRegistry::from_settings(&TrafficSettings {
            algorithm,
            ..Default::default()
        })
    }

    #[test]
    fn test_insert_and_get() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        let outcome = reg.upsert(&own, contact_at(&own, 0xA1, 300.0, 90.0), NOW);
        assert_eq!(outcome, UpsertOutcome::Inserted { slot: 0 });
        assert_eq!(reg.count(), 1);

        let c = reg.get(0xA1).unwrap();
        assert!((c.distance - 300.0).abs() < 0.5);
        assert!((c.bearing - 90.0).abs() < 0.1);
        assert_eq!(c.alarm_level, AlarmLevel::Urgent);
    }

    #[test]
    fn test_null_address_rejected() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        assert_eq!(
            reg.upsert(&own, contact_at(&own, 0, 300.0, 0.0), NOW),
            UpsertOutcome::Dropped
        );
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn test_resighting_preserves_history() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        let mut first = contact_at(&own, 0xA1, 800.0, 0.0);
        first.course = 170.0;
        reg.upsert(&own, first, NOW);
        reg.refresh(&own, NOW);

        let before = reg.get(0xA1).unwrap().clone();
        assert!(before.alert.contains(AlertFlags::SOUND));
        assert_eq!(before.alert_level, AlertLevel::above(AlarmLevel::Low));

        let mut second = contact_at(&own, 0xA1, 780.0, 0.0);
        second.fix_ms = 101_000;
        second.course = 175.0;
        assert_eq!(reg.upsert(&own, second.clone(), NOW), UpsertOutcome::Updated { slot: 0 });
        assert_eq!(reg.upsert(&own, second, NOW), UpsertOutcome::Updated { slot: 0 });

        let after = reg.get(0xA1).unwrap();
        assert_eq!(after.alert, before.alert);
        assert_eq!(after.alert_level, before.alert_level);
        assert_eq!(after.prev_fix_ms, Some(101_000));
        assert_eq!(after.prev_course, Some(175.0));
        assert_eq!(after.course, 175.0);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn test_vector_alarm_on_repeated_sightings() {
        let mut own = test_ownship();
        own.course = 0.0;
        own.speed = 60.0;
        let mut reg = registry(AlarmAlgorithm::default());

        // Head-on at 120 kn closure, heard once a second
        let mut levels = Vec::new();
        let mut alerts = Vec::new();
        for i in 0..6u32 {
            let mut c = contact_at(&own, 0xB7, 600.0 - 60.0 * i as f64, 0.0);
            c.course = 180.0;
            c.speed = 60.0;
            c.fix_ms = 100_000 + 1000 * i as u64;
            reg.upsert(&own, c, NOW);
            levels.push(reg.get(0xB7).unwrap().alarm_level);

            for event in reg.refresh(&own, NOW) {
                if let TrafficEvent::Alert(alert) = event {
                    alerts.push(alert.alarm_level);
                }
            }
        }

        // First sighting has no history; 540 m is about 8.7 s out
        assert_eq!(levels[0], AlarmLevel::None);
        assert_eq!(levels[1], AlarmLevel::Important);
        assert_eq!(levels[5], AlarmLevel::Urgent);
        assert_eq!(alerts, vec![AlarmLevel::Important]);
    }

    #[test]
    fn test_addresses_stay_unique() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        let mut seed: u32 = 12345;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let address = 1 + (seed >> 16) % 20;
            let distance = 100.0 + ((seed >> 4) % 3000) as f64;
            let bearing = (seed % 360) as f64;
            reg.upsert(&own, contact_at(&own, address, distance, bearing), NOW);

            let addresses: HashSet<u32> = reg.iter().map(|c| c.address).collect();
            assert_eq!(addresses.len(), reg.count());
            assert!(reg.count() <= reg.capacity());
            assert!(!addresses.contains(&0));
        }
    }

    #[test]
    fn test_expired_slot_reused() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        for i in 0..8 {
            let mut c = contact_at(&own, 0x100 + i, 500.0, i as f64 * 10.0);
            c.timestamp = if i == 3 { NOW - 11 } else { NOW };
            reg.upsert(&own, c, NOW);
        }
        let outcome = reg.upsert(&own, contact_at(&own, 0x200, 5000.0, 0.0), NOW);
        assert_eq!(
            outcome,
            UpsertOutcome::Replaced {
                slot: 3,
                evicted: 0x103,
                reason: EvictionReason::Expired
            }
        );
        assert!(reg.get(0x103).is_none());
    }

    #[test]
    fn test_lowest_alarm_evicted_first() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        // One LOW, then two CLOSE, then LOW
        let distances = [900.0, 1200.0, 1300.0, 800.0, 800.0, 850.0, 900.0, 950.0];
        for (i, d) in distances.iter().enumerate() {
            reg.upsert(&own, contact_at(&own, 0x100 + i as u32, *d, i as f64 * 40.0), NOW);
        }
        assert_eq!(reg.get(0x101).unwrap().alarm_level, AlarmLevel::Close);

        let outcome = reg.upsert(&own, contact_at(&own, 0x200, 300.0, 0.0), NOW);
        assert_eq!(
            outcome,
            UpsertOutcome::Replaced {
                slot: 1,
                evicted: 0x101,
                reason: EvictionReason::LowerAlarm
            }
        );
        assert_eq!(reg.get(0x200).unwrap().alarm_level, AlarmLevel::Urgent);
        assert!(reg.get(0x102).is_some());
    }

    #[test]
    fn test_farthest_evicted_when_alarms_equal() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::None);
        for i in 0..8u32 {
            let d = 1000.0 * (i + 1) as f64;
            reg.upsert(&own, contact_at(&own, 0x100 + i, d, 0.0), NOW);
        }

        let outcome = reg.upsert(&own, contact_at(&own, 0x200, 500.0, 180.0), NOW);
        assert_eq!(
            outcome,
            UpsertOutcome::Replaced {
                slot: 7,
                evicted: 0x107,
                reason: EvictionReason::Farther
            }
        );

        // Further than everything held
        let outcome = reg.upsert(&own, contact_at(&own, 0x201, 9000.0, 180.0), NOW);
        assert_eq!(outcome, UpsertOutcome::Dropped);
        assert_eq!(reg.count(), 8);
    }

    #[test]
    fn test_refresh_expires() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        reg.upsert(&own, contact_at(&own, 0xA1, 5000.0, 0.0), NOW);

        assert!(reg.refresh(&own, NOW + 10).is_empty());
        assert_eq!(reg.count(), 1);

        let events = reg.refresh(&own, NOW + 11);
        assert_eq!(events, vec![TrafficEvent::Expired { address: 0xA1 }]);
        assert_eq!(reg.count(), 0);
        assert!(reg.get(0xA1).is_none());
    }

    #[test]
    fn test_single_alert_per_refresh() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        reg.upsert(&own, contact_at(&own, 0xA1, 600.0, 0.0), NOW);
        reg.upsert(&own, contact_at(&own, 0xA2, 300.0, 90.0), NOW);
        reg.upsert(&own, contact_at(&own, 0xA3, 1200.0, 180.0), NOW);

        let alerts = |events: Vec<TrafficEvent>| -> Vec<(u32, AlarmLevel)> {
            events
                .into_iter()
                .filter_map(|e| match e {
                    TrafficEvent::Alert(a) => Some((a.address, a.alarm_level)),
                    _ => None,
                })
                .collect()
        };

        assert_eq!(alerts(reg.refresh(&own, NOW)), vec![(0xA2, AlarmLevel::Urgent)]);
        assert_eq!(alerts(reg.refresh(&own, NOW)), vec![(0xA1, AlarmLevel::Important)]);
        // CLOSE never alerts
        assert!(alerts(reg.refresh(&own, NOW)).is_empty());
    }

    #[test]
    fn test_stale_contact_reevaluated() {
        let mut own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::Distance);
        reg.upsert(&own, contact_at(&own, 0xA1, 300.0, 0.0), NOW);
        assert_eq!(reg.get(0xA1).unwrap().alarm_level, AlarmLevel::Urgent);

        // Ownship moves 1 km south; contact not heard for 2 s
        own.latitude -= 1000.0 / METERS_PER_DEGREE;
        reg.refresh(&own, NOW + 1);
        assert_eq!(reg.get(0xA1).unwrap().alarm_level, AlarmLevel::Urgent);

        reg.refresh(&own, NOW + 2);
        let c = reg.get(0xA1).unwrap();
        assert!((c.distance - 1300.0).abs() < 1.0);
        assert_eq!(c.alarm_level, AlarmLevel::Close);
    }

    #[test]
    fn test_trusted_alarm_kept() {
        let own = test_ownship();
        let mut reg = TrafficRegistry::from_settings(&TrafficSettings {
            algorithm: AlarmAlgorithm::Distance,
            registry: RegistrySettings {
                alarm_source: AlarmSource::Trusted,
                ..Default::default()
            },
            ..Default::default()
        });
        let mut c = contact_at(&own, 0xA1, 5000.0, 0.0);
        c.alarm_level = AlarmLevel::Important;
        reg.upsert(&own, c, NOW);

        let events = reg.refresh(&own, NOW + 3);
        let stored = reg.get(0xA1).unwrap();
        assert!((stored.distance - 5000.0).abs() < 1.0);
        assert_eq!(stored.alarm_level, AlarmLevel::Important);
        assert!(matches!(events.as_slice(), [TrafficEvent::Alert(a)] if a.address == 0xA1));
    }

    #[test]
    fn test_display_filters() {
        let own = test_ownship();
        let mut reg = TrafficRegistry::from_settings(&TrafficSettings {
            registry: RegistrySettings {
                max_range: Some(2000.0),
                vertical_filter: Some(500.0),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(
            reg.upsert(&own, contact_at(&own, 0xA1, 2500.0, 0.0), NOW),
            UpsertOutcome::Filtered
        );
        let mut high = contact_at(&own, 0xA2, 1000.0, 0.0);
        high.altitude += 600.0;
        assert_eq!(reg.upsert(&own, high, NOW), UpsertOutcome::Filtered);
        assert!(reg.upsert(&own, contact_at(&own, 0xA3, 1000.0, 0.0), NOW).is_stored());
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn test_by_distance_and_clear_expired() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::None);
        for (addr, d) in [(0xA1, 3000.0), (0xA2, 1000.0), (0xA3, 2000.0)] {
            reg.upsert(&own, contact_at(&own, addr, d, 0.0), NOW);
        }
        let order: Vec<u32> = reg.by_distance().iter().map(|c| c.address).collect();
        assert_eq!(order, vec![0xA2, 0xA3, 0xA1]);

        let mut stale = contact_at(&own, 0xA4, 100.0, 0.0);
        stale.timestamp = NOW - 30;
        reg.upsert(&own, stale, NOW - 25);
        assert_eq!(reg.clear_expired(NOW), vec![0xA4]);
        assert_eq!(reg.snapshot().len(), 3);
    }

    #[test]
    fn test_set_algorithm() {
        let own = test_ownship();
        let mut reg = registry(AlarmAlgorithm::None);
        reg.upsert(&own, contact_at(&own, 0xA1, 300.0, 0.0), NOW);
        assert_eq!(reg.get(0xA1).unwrap().alarm_level, AlarmLevel::None);

        reg.set_algorithm(AlarmAlgorithm::Distance);
        assert_eq!(reg.algorithm(), AlarmAlgorithm::Distance);
        reg.upsert(&own, contact_at(&own, 0xA1, 300.0, 0.0), NOW);
        assert_eq!(reg.get(0xA1).unwrap().alarm_level, AlarmLevel::Urgent);
    }
}
