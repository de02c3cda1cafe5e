//! SQLite bootstrap for the persistent key/value backend.
//!
//! Opening a connection always runs the migrations in `migrations`; schema
//! and connection failures surface as `StoreError`, the same error callers
//! see from every other storage operation.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
