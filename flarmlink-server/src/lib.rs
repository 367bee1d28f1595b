//! # FlarmLink Server
//!
//! Host for [`flarmlink_core`]: feeds ownship fixes and received Legacy
//! frames into the traffic registry, runs the 1 Hz refresh on a tokio
//! timer and logs the resulting alerts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   flarmlink-server                       │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ recording    │──▶│ TrafficMon.  │──▶│ log / stdout │  │
//! │  │ (JSON lines) │   │ (1 s ticker) │   │ (alerts)     │  │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘  │
//! │                            │                             │
//! │                            ▼                             │
//! │  ┌─────────────────────────────────────────────────────┐ │
//! │  │ flarmlink-core: legacy codec, registry, alarms      │ │
//! │  └─────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example: Replaying a Session
//!
//! ```rust,no_run
//! use flarmlink_core::{Ownship, TrafficSettings, Units};
//! use flarmlink_server::{monitor::TrafficMonitor, recording::load_recording};
//! use std::path::Path;
//! use std::time::Duration;
//! use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let events = load_recording(Path::new("session.jsonl")).unwrap();
//!     let mut monitor =
//!         TrafficMonitor::new(TrafficSettings::default(), Ownship::default(), Units::Metric);
//!
//!     Toplevel::new(move |s| async move {
//!         s.start(SubsystemBuilder::new("Replay", move |subsys| async move {
//!             monitor.replay(&events, 1.0, &subsys).await
//!         }));
//!     })
//!     .catch_signals()
//!     .handle_shutdown_requests(Duration::from_secs(5))
//!     .await
//!     .unwrap();
//! }
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-c, --config` - Settings file (JSON)
//! - `-a, --algorithm` - Alarm algorithm, overriding the settings file
//! - `-v` - Increase verbosity (use multiple times)
//! - `replay <file>` - Replay a recorded session
//! - `encode` / `decode` - Build or inspect a single Legacy frame

extern crate tokio;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use flarmlink_core::address::ADDRESS_MASK;
use flarmlink_core::{AddressType, AlarmAlgorithm, ContactFlags, Ownship, TrafficSettings, Units};

pub mod config;
pub mod error;
pub mod monitor;
pub mod recording;

use error::HostError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(name = "flarmlink-server", version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Settings file, defaults to traffic.json in the config directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Alarm algorithm: none, distance, vector or legacy
    #[arg(short, long, value_parser = parse_algorithm)]
    pub algorithm: Option<AlarmAlgorithm>,

    /// Units for announcements: metric, imperial or mixed
    #[arg(short, long, default_value = "metric", value_parser = parse_units)]
    pub units: Units,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Replay a recorded session of fixes and frames
    Replay {
        /// JSON-lines recording
        file: PathBuf,

        /// Playback speed relative to real time
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,

        /// Our own address, hex; random if not given
        #[arg(long, value_parser = parse_address)]
        address: Option<u32>,

        /// Print the final traffic report as JSON
        #[arg(long, default_value_t = false)]
        report: bool,
    },

    /// Print the Legacy frame ownship would transmit, as hex
    Encode(OwnshipArgs),

    /// Decode a hex Legacy frame as heard by ownship
    Decode {
        frame: String,

        #[clap(flatten)]
        own: OwnshipArgs,
    },
}

/// Ownship state given on the command line
#[derive(Args, Clone, Debug)]
pub struct OwnshipArgs {
    /// Address, hex
    #[arg(long, value_parser = parse_address, default_value = "DD0001")]
    pub address: u32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Metres
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub altitude: f64,

    /// Degrees true
    #[arg(long, default_value_t = 0.0)]
    pub course: f64,

    /// Knots
    #[arg(long, default_value_t = 0.0)]
    pub speed: f64,

    /// Feet per minute
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub vs: f64,

    /// Degrees per second, positive to the right
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub turnrate: f64,

    /// Unix seconds; the current time if not given
    #[arg(long)]
    pub timestamp: Option<u32>,

    #[arg(long, default_value_t = false)]
    pub stealth: bool,

    /// On the ground
    #[arg(long, default_value_t = false)]
    pub ground: bool,
}

impl OwnshipArgs {
    pub fn to_ownship(&self) -> Ownship {
        let mut own = Ownship::new(self.address, AddressType::Flarm);
        own.latitude = self.latitude;
        own.longitude = self.longitude;
        own.altitude = self.altitude;
        own.course = self.course;
        own.speed = self.speed;
        own.vs = self.vs;
        own.turnrate = self.turnrate;
        own.flags.set(ContactFlags::AIRBORNE, !self.ground);
        own.flags.set(ContactFlags::STEALTH, self.stealth);
        let timestamp = self.timestamp.unwrap_or_else(unix_time);
        own.record_fix(timestamp, timestamp as u64 * 1000);
        own
    }
}

impl Cli {
    /// Settings from the config file with command-line overrides applied
    pub fn settings(&self) -> Result<TrafficSettings, HostError> {
        let mut settings = config::load_settings(self.config.as_deref())?;
        if let Some(algorithm) = self.algorithm {
            settings.algorithm = algorithm;
        }
        Ok(settings)
    }
}

pub fn unix_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as u32)
}

fn parse_algorithm(s: &str) -> Result<AlarmAlgorithm, String> {
    AlarmAlgorithm::try_from(s)
}

fn parse_units(s: &str) -> Result<Units, String> {
    Units::try_from(s)
}

fn parse_address(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    match u32::from_str_radix(digits, 16) {
        Ok(address) if address & !ADDRESS_MASK == 0 => Ok(address),
        Ok(_) => Err(format!("Address {} does not fit in 24 bits", s)),
        Err(e) => Err(format!("Invalid address {}: {}", s, e)),
    }
}
