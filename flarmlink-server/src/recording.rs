//! Recorded traffic sessions.
//!
//! A recording is a JSON-lines file. Each line is one event, ordered by
//! `timeMs` (milliseconds since the start of the session):
//!
//! ```text
//! {"type":"fix","timeMs":0,"timestamp":1700000000,"latitude":46.5,"longitude":7.9,"altitude":2100,"course":90,"speed":50,"airborne":true}
//! {"type":"frame","timeMs":420,"data":"5f3a10...","rssi":-72}
//! ```
//!
//! `fix` lines carry ownship GNSS state, `frame` lines carry a received
//! 24-byte Legacy frame as hex. Blank lines and lines starting with `#`
//! are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flarmlink_core::protocol::legacy::{Frame, PAYLOAD_SIZE};
use flarmlink_core::{ContactFlags, Ownship};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Ownship GNSS state at one point of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRecord {
    pub time_ms: u64,
    /// Unix seconds
    pub timestamp: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(default)]
    pub geoid_separation: f64,
    #[serde(default)]
    pub course: f64,
    /// Knots
    #[serde(default)]
    pub speed: f64,
    /// Feet per minute
    #[serde(default)]
    pub vs: f64,
    /// Degrees per second
    #[serde(default)]
    pub turnrate: f64,
    #[serde(default)]
    pub airborne: bool,
    #[serde(default)]
    pub stealth: bool,
    #[serde(default)]
    pub circling: bool,
}

impl FixRecord {
    /// Move ownship to this fix
    pub fn apply(&self, own: &mut Ownship) {
        own.latitude = self.latitude;
        own.longitude = self.longitude;
        own.altitude = self.altitude;
        own.geoid_separation = self.geoid_separation;
        own.course = self.course;
        own.speed = self.speed;
        own.vs = self.vs;
        own.turnrate = self.turnrate;
        own.circling = self.circling;
        own.flags.set(ContactFlags::AIRBORNE, self.airborne);
        own.flags.set(ContactFlags::STEALTH, self.stealth);
        own.record_fix(self.timestamp, self.time_ms);
    }
}

/// A frame heard on the radio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub time_ms: u64,
    /// Hex encoded frame
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,
}

impl FrameRecord {
    pub fn frame(&self) -> Result<Frame, HostError> {
        parse_frame(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    Fix(FixRecord),
    Frame(FrameRecord),
}

impl RecordedEvent {
    pub fn time_ms(&self) -> u64 {
        match self {
            RecordedEvent::Fix(fix) => fix.time_ms,
            RecordedEvent::Frame(frame) => frame.time_ms,
        }
    }
}

/// Parse a hex string into a Legacy frame
pub fn parse_frame(text: &str) -> Result<Frame, HostError> {
    let bytes = hex::decode(text.trim())?;
    Frame::try_from(bytes.as_slice()).map_err(|_| HostError::FrameLength {
        expected: PAYLOAD_SIZE,
        actual: bytes.len(),
    })
}

/// Read a whole recording, checking that events are in time order
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedEvent>, HostError> {
    let mut events: Vec<RecordedEvent> = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: RecordedEvent =
            serde_json::from_str(line).map_err(|e| HostError::Recording {
                line: n + 1,
                message: e.to_string(),
            })?;

        if let Some(last) = events.last() {
            if event.time_ms() < last.time_ms() {
                return Err(HostError::Recording {
                    line: n + 1,
                    message: format!(
                        "time {} ms goes back from {} ms",
                        event.time_ms(),
                        last.time_ms()
                    ),
                });
            }
        }
        events.push(event);
    }

    debug!("Read {} recorded events", events.len());
    Ok(events)
}

pub fn load_recording(path: &Path) -> Result<Vec<RecordedEvent>, HostError> {
    let file = File::open(path)?;
    read_recording(BufReader::new(file))
}
