//! Storage port consumed by the booking core.
//!
//! # Responsibility
//! - Define the generic key/value + set-membership contract (`KeyValueStore`).
//! - Provide typed JSON helpers and the catalogue of keys the core owns.
//! - Resolve the configured backend once at startup (`open_store`).
//!
//! # Invariants
//! - Values are whole JSON documents; callers always read-modify-write the
//!   full document, there are no partial updates.
//! - Set-membership operations are used by the client roster only.

use crate::config::{StorageBackend, StorageConfig};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport or encoding failure at the storage boundary.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Encode {
        key: String,
        source: serde_json::Error,
    },
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// Backend refused or could not serve the request.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "kennel store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Decode { key, source } => write!(f, "failed to decode `{key}`: {source}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Generic key/value store with set membership.
///
/// Implementations are used from one cooperative execution domain and need
/// no internal locking; concurrent writers from other sessions race with
/// last-writer-wins semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Returns whether a value was present.
    fn delete(&self, key: &str) -> StoreResult<bool>;
    /// Returns whether `member` was newly added.
    fn add_to_set(&self, key: &str, member: &str) -> StoreResult<bool>;
    /// Returns whether `member` was present.
    fn remove_from_set(&self, key: &str, member: &str) -> StoreResult<bool>;
    /// Members in insertion order.
    fn list_set_members(&self, key: &str) -> StoreResult<Vec<String>>;
}

/// Keys owned by the kennel core and its collaborators.
pub mod keys {
    use crate::model::kennel::SizeClass;

    pub const SMALL_KENNELS: &str = "smallKennels";
    pub const LARGE_KENNELS: &str = "largeKennels";
    pub const BOOKING_HISTORY: &str = "bookingHistory";
    /// Shared with the plain calendar feature.
    pub const CALENDAR_EVENTS: &str = "calendarEvents";
    pub const CLIENT_IDS: &str = "dogTrainer:clients";

    /// Whole ordered slot list for one size class.
    pub fn kennels(size: SizeClass) -> &'static str {
        match size {
            SizeClass::Small => SMALL_KENNELS,
            SizeClass::Large => LARGE_KENNELS,
        }
    }

    pub fn client(id: &str) -> String {
        format!("dogTrainer:client:{id}")
    }
}

/// Reads and decodes one JSON document; `None` when the key is absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes and writes one JSON document, replacing any previous value.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Opens the backend named by configuration.
///
/// Called once at startup; the returned handle is injected into every
/// service that needs persistence.
pub fn open_store(config: &StorageConfig) -> StoreResult<Rc<dyn KeyValueStore>> {
    let store: Rc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Rc::new(MemoryStore::new()),
        StorageBackend::Sqlite => Rc::new(SqliteStore::open(&config.path)?),
    };
    info!(
        "event=store_open module=store status=ok backend={}",
        config.backend.as_str()
    );
    Ok(store)
}
