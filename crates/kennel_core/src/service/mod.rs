//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into kennel, calendar, history and roster
//!   use-cases.
//! - Keep callers decoupled from the storage backend.

pub mod booking;
pub mod calendar_sync;
pub mod client_roster;
pub mod history;
pub mod inventory;
pub mod report;
pub mod scanner;
