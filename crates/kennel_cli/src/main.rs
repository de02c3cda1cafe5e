//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, store and controller the way a host would.
//! - Run one expiration pass and print the resulting occupancy.
//!
//! Usage: `kennel_cli [--config <path>]`

use clap::Parser;
use kennel_core::{
    init_from_config, open_store, BookingController, KennelConfig, SizeClass, SystemClock,
};
use std::path::PathBuf;
use std::process::exit;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = "kennel_cli")]
#[command(about = "Run one kennel expiration pass and print occupancy")]
struct Cli {
    /// TOML config file; built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(&cli) {
        eprintln!("kennel_cli error: {message}");
        exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config =
        KennelConfig::load_or_default(cli.config.as_deref()).map_err(|err| err.to_string())?;

    if !init_from_config(&config.logging)? {
        log::debug!("event=logging_init module=cli status=skipped reason=no_log_dir");
    }

    let store = open_store(&config.storage).map_err(|err| err.to_string())?;
    let mut controller =
        BookingController::new(store, Rc::new(SystemClock), &config.inventory)
            .map_err(|err| err.to_string())?;

    let today = controller.today();
    let report = controller.expire_overdue(today);
    println!(
        "kennel_core version={} scan_date={} expired={} degraded={}",
        kennel_core::core_version(),
        report.scan_date,
        report.expired_slots.len(),
        report.failures.len()
    );

    for size in SizeClass::ALL {
        let slots = controller.inventory().list_slots(size);
        let occupied = slots.iter().filter(|slot| slot.is_occupied()).count();
        println!("{size} kennels: {occupied}/{} occupied", slots.len());
        for slot in slots {
            match slot.booking() {
                Some(booking) => println!(
                    "  {} {} {}..{}",
                    slot.id(),
                    booking.dog_name,
                    booking.check_in_date,
                    booking.check_out_date
                ),
                None => println!("  {} vacant", slot.id()),
            }
        }
    }
    Ok(())
}
