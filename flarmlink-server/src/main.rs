use std::time::Duration;

use clap::Parser;
use flarmlink_core::protocol::legacy;
use flarmlink_core::{random_address, AddressType, Ownship, TrafficRegistry, VelocityProjection};
use flarmlink_server::error::HostError;
use flarmlink_server::monitor::TrafficMonitor;
use flarmlink_server::recording::{load_recording, parse_frame, RecordedEvent};
use flarmlink_server::{unix_time, Cli, Command, VERSION};
use log::info;
use miette::Result;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    info!("flarmlink-server {}", VERSION);

    let settings = args.settings()?;

    match args.command {
        Command::Replay {
            file,
            speed,
            address,
            report,
        } => {
            let events = load_recording(&file)?;
            let own = match address {
                Some(address) => Ownship::new(address, AddressType::Flarm),
                None => {
                    let address = random_address(unix_time(), AddressType::Random);
                    Ownship::new(address, AddressType::Random)
                }
            };
            info!("Ownship address {:06X}", own.address);
            let monitor = TrafficMonitor::new(settings, own, args.units);

            Toplevel::new(move |s| async move {
                s.start(SubsystemBuilder::new("Replay", move |subsys| {
                    replay(subsys, monitor, events, speed, report)
                }));
            })
            .catch_signals()
            .handle_shutdown_requests(Duration::from_millis(1000))
            .await
            .map_err(Into::into)
        }
        Command::Encode(own) => {
            let own = own.to_ownship();
            let frame = legacy::encode(&own, &VelocityProjection::from_ownship(&own));
            println!("{}", hex::encode(frame));
            Ok(())
        }
        Command::Decode { frame, own } => {
            let frame = parse_frame(&frame)?;
            let own = own.to_ownship();
            let contact =
                legacy::decode(frame, &own, settings.ignore_address).map_err(HostError::from)?;

            // Run it through a registry so geometry and alarm are filled in
            let mut registry = TrafficRegistry::from_settings(&settings);
            let outcome = registry.upsert(&own, contact.clone(), own.timestamp);
            let contact = registry.get(contact.address).cloned().unwrap_or(contact);
            info!("{:?}", outcome);

            let text = serde_json::to_string_pretty(&contact).map_err(HostError::from)?;
            println!("{}", text);
            Ok(())
        }
    }
}

async fn replay(
    subsys: SubsystemHandle,
    mut monitor: TrafficMonitor,
    events: Vec<RecordedEvent>,
    speed: f64,
    report: bool,
) -> Result<(), HostError> {
    monitor.replay(&events, speed, &subsys).await?;

    if report {
        println!("{}", serde_json::to_string_pretty(&monitor.report())?);
    }
    println!("{}", serde_json::to_string(monitor.stats())?);

    subsys.request_shutdown();
    Ok(())
}
