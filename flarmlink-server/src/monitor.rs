//! Traffic monitor: ties ownship state, the radio codec and the registry
//! together, and drives them from recorded events in real time.

use std::time::Duration;

use flarmlink_core::protocol::legacy::{self, Frame};
use flarmlink_core::{
    announcement, priority_view, DecodeError, Ownship, TrafficEvent, TrafficRegistry,
    TrafficReport, TrafficSettings, UpsertOutcome, Units, VelocityProjection,
};
use log::{debug, info, trace, warn};
use serde::Serialize;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::error::HostError;
use crate::recording::{FixRecord, RecordedEvent};

/// Refresh cadence of the registry
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Running totals, reported when a replay ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStats {
    pub fixes: u32,
    pub frames: u32,
    pub accepted: u32,
    pub rejected: u32,
    pub dropped: u32,
    pub alerts: u32,
    pub expired: u32,
    pub address_changes: u32,
}

pub struct TrafficMonitor {
    own: Ownship,
    registry: TrafficRegistry,
    settings: TrafficSettings,
    units: Units,
    stats: MonitorStats,
    announcements: Vec<String>,
}

impl TrafficMonitor {
    pub fn new(settings: TrafficSettings, own: Ownship, units: Units) -> Self {
        TrafficMonitor {
            own,
            registry: TrafficRegistry::from_settings(&settings),
            settings,
            units,
            stats: MonitorStats::default(),
            announcements: Vec::new(),
        }
    }

    pub fn ownship(&self) -> &Ownship {
        &self.own
    }

    pub fn registry(&self) -> &TrafficRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Everything announced so far, oldest first
    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn update_fix(&mut self, fix: &FixRecord) {
        fix.apply(&mut self.own);
        self.stats.fixes += 1;
        if let Some(frame) = self.transmit() {
            trace!("TX {}", hex::encode(frame));
        }
    }

    /// Handle a received frame
    pub fn receive(&mut self, frame: Frame, rssi: Option<i16>) -> Option<UpsertOutcome> {
        self.stats.frames += 1;
        if self.own.timestamp == 0 {
            debug!("Frame received before first fix, ignored");
            self.stats.rejected += 1;
            return None;
        }

        let mut contact = match legacy::decode(frame, &self.own, self.settings.ignore_address) {
            Ok(contact) => contact,
            Err(DecodeError::OwnAddress(address)) => {
                self.stats.rejected += 1;
                self.stats.address_changes += 1;
                let seed = (self.own.fix_ms as u32) ^ address;
                self.own.regenerate_address(seed);
                return None;
            }
            Err(e) => {
                trace!("Frame rejected: {}", e);
                self.stats.rejected += 1;
                return None;
            }
        };
        contact.rssi = rssi;

        let outcome = self.registry.upsert(&self.own, contact, self.own.timestamp);
        if outcome.is_stored() {
            self.stats.accepted += 1;
        } else {
            self.stats.dropped += 1;
        }
        Some(outcome)
    }

    /// Periodic registry refresh, logging what it reports
    pub fn tick(&mut self) -> Vec<TrafficEvent> {
        let events = self.registry.refresh(&self.own, self.own.timestamp);
        for event in &events {
            match event {
                TrafficEvent::Expired { address } => {
                    debug!("{:06X} is gone", address);
                    self.stats.expired += 1;
                }
                TrafficEvent::Alert(alert) => {
                    self.stats.alerts += 1;
                    if let Some(contact) = self.registry.get(alert.address) {
                        let text = announcement(contact, self.own.course, self.units);
                        warn!("{}: {}", alert.alarm_level, text);
                        self.announcements.push(text);
                    }
                }
            }
        }
        events
    }

    /// The frame ownship would send now, once there is a fix
    pub fn transmit(&self) -> Option<Frame> {
        if self.own.timestamp == 0 {
            return None;
        }
        Some(legacy::encode(
            &self.own,
            &VelocityProjection::from_ownship(&self.own),
        ))
    }

    pub fn report(&self) -> TrafficReport {
        priority_view(
            &self.registry,
            &self.own,
            &self.settings.report,
            self.own.timestamp,
        )
    }

    pub fn handle(&mut self, event: &RecordedEvent) -> Result<(), HostError> {
        match event {
            RecordedEvent::Fix(fix) => self.update_fix(fix),
            RecordedEvent::Frame(record) => {
                let frame = record.frame()?;
                if let Some(outcome) = self.receive(frame, record.rssi) {
                    trace!("{} ms: {:?}", record.time_ms, outcome);
                }
            }
        }
        Ok(())
    }

    /// Replay recorded events at `speed` times real time, refreshing the
    /// registry on the scaled 1 s cadence. Stops early on shutdown.
    pub async fn replay(
        &mut self,
        events: &[RecordedEvent],
        speed: f64,
        subsys: &SubsystemHandle,
    ) -> Result<(), HostError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(HostError::InvalidSpeed(speed));
        }

        let start = Instant::now();
        let first_ms = events.first().map_or(0, |e| e.time_ms());
        let period = REFRESH_INTERVAL.div_f64(speed).max(Duration::from_millis(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Replaying {} events at {}x with the {} alarm algorithm",
            events.len(),
            speed,
            self.registry.algorithm()
        );

        for event in events {
            let offset = Duration::from_millis(event.time_ms().saturating_sub(first_ms));
            let deadline = start + offset.div_f64(speed);
            loop {
                tokio::select! { biased;
                    _ = subsys.on_shutdown_requested() => {
                        info!("Replay interrupted");
                        return Ok(());
                    },
                    _ = sleep_until(deadline) => break,
                    _ = ticker.tick() => {
                        self.tick();
                    },
                }
            }
            self.handle(event)?;
        }

        // Final refresh so the last frames are evaluated
        self.tick();
        info!("Replay finished: {:?}", self.stats);
        Ok(())
    }
}
