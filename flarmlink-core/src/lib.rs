//! # FlarmLink Core
//!
//! Platform-independent traffic awareness and collision alarm library for
//! FLARM-compatible airborne proximity-warning transceivers.
//!
//! This crate contains pure protocol and decision logic with **zero I/O
//! dependencies**: radio drivers, GNSS receivers, displays and speakers
//! all live in the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  flarmlink-core (platform-independent, no tokio/async deps)  │
//! │  ├── protocol/legacy  (packet codec, key schedule, XXTEA)    │
//! │  ├── registry/        (bounded contact table, eviction)      │
//! │  ├── alarm/           (alarm algorithms, alert hysteresis)   │
//! │  ├── geometry         (relative position and closure)        │
//! │  └── report, voice    (display and announcement views)       │
//! └──────────────────────────────────────────────────────────────┘
//!                              ▲
//!                 ┌────────────┴────────────┐
//!                 │  flarmlink-server       │
//!                 │  (replay, tokio timer)  │
//!                 └─────────────────────────┘
//! ```
//!
//! Frames flow in through [`protocol::legacy::decode`], become [`Contact`]s
//! in the [`TrafficRegistry`], and once per second
//! [`TrafficRegistry::refresh`] expires old contacts, re-evaluates alarm
//! levels and picks at most one contact to announce.
//!
//! ## Key Modules
//!
//! - [`protocol`] - Legacy radio packet encode/decode
//! - [`registry`] - Fixed-capacity contact registry
//! - [`alarm`] - Alarm levels and algorithms
//! - [`geometry`] - Distance, bearing, vertical and closure computations
//! - [`report`] - Ordered, masked view for navigation displays
//! - [`voice`] - Spoken announcement text
//! - [`settings`] - Serde-friendly configuration
//!
//! ## Example: Receiving Traffic
//!
//! ```rust,no_run
//! use flarmlink_core::protocol::legacy;
//! use flarmlink_core::{Ownship, TrafficEvent, TrafficRegistry};
//!
//! let own = Ownship::default();
//! let mut registry = TrafficRegistry::default();
//!
//! let frame = [0u8; legacy::PAYLOAD_SIZE]; // From the radio
//! if let Ok(contact) = legacy::decode(frame, &own, None) {
//!     registry.upsert(&own, contact, own.timestamp);
//! }
//!
//! for event in registry.refresh(&own, own.timestamp) {
//!     if let TrafficEvent::Alert(alert) = event {
//!         println!("{} traffic at {:.0} m", alert.alarm_level, alert.distance);
//!     }
//! }
//! ```

pub mod address;
pub mod aircraft;
pub mod alarm;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod projection;
pub mod protocol;
pub mod registry;
pub mod report;
pub mod settings;
pub mod units;
pub mod voice;

// Re-export commonly used types
pub use address::{AddressType, Protocol};
pub use aircraft::{AlertFlags, Contact, ContactFlags, Ownship, VelocitySamples};
pub use alarm::{AlarmAlgorithm, AlarmEngine, AlarmLevel, AlertLevel};
pub use error::DecodeError;
pub use identity::random_address;
pub use projection::VelocityProjection;
pub use registry::{EvictionReason, TrafficAlert, TrafficEvent, TrafficRegistry, UpsertOutcome};
pub use report::{priority_view, PriorityTarget, ReportedContact, TrafficReport};
pub use settings::{
    AlarmSettings, AlarmSource, AlarmTimes, AlarmZones, RegistrySettings, ReportSettings,
    TrafficSettings,
};
pub use voice::{announcement, Units};
