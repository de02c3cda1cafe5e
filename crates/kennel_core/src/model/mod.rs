//! Domain model for kennel occupancy, calendar projections and stay history.
//!
//! # Responsibility
//! - Define the canonical records shared by inventory, calendar and ledger.
//! - Keep the persisted JSON shape stable (camelCase field names).
//!
//! # Invariants
//! - A kennel slot is occupied exactly when it carries a booking.
//! - Cross-store links (`calendarEventId`) are weak references and may dangle.

pub mod calendar_event;
pub mod client;
pub mod history;
pub mod kennel;
