//! Booking lifecycle and kennel synchronization core for a dog trainer.
//! This crate is the single source of truth for occupancy invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    ConfigError, InventoryConfig, KennelConfig, LoggingConfig, ScanConfig, StorageBackend,
    StorageConfig,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::calendar_event::{CalendarEvent, EventId};
pub use model::client::{Client, ClientUpdate, NewClient};
pub use model::history::HistoryRecord;
pub use model::kennel::{Booking, BookingValidationError, KennelSlot, SizeClass, SlotId, SlotState};
pub use service::booking::{BookingController, BookingError, BookingResult};
pub use service::calendar_sync::{CalendarDeletion, CalendarSync, SyncOutcome};
pub use service::client_roster::{ClientRoster, RosterError, RosterResult};
pub use service::history::HistoryLedger;
pub use service::inventory::{InventoryError, InventoryResult, KennelInventory};
pub use service::report::{ScanReport, SideEffect, SideEffectFailure, TransitionReport};
pub use service::scanner::{find_expiring, ExpirationScanner, ScanHandle};
pub use store::{open_store, KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
