//! Client roster record.

use serde::{Deserialize, Serialize};

/// One training client and their dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub client_name: String,
    pub pet_name: String,
    pub pet_breed: String,
    pub address: String,
    /// Completed training sessions; never negative.
    pub session_count: u32,
}

/// Input for registering a new client; the roster assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewClient {
    pub client_name: String,
    pub pet_name: String,
    pub pet_breed: String,
    pub address: String,
    pub session_count: u32,
}

/// Partial edit of a client; `None` fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientUpdate {
    pub client_name: Option<String>,
    pub pet_name: Option<String>,
    pub pet_breed: Option<String>,
    pub address: Option<String>,
    pub session_count: Option<u32>,
}

impl Client {
    /// Overlays the fields set in `update`; the id never changes.
    pub fn apply(&mut self, update: ClientUpdate) {
        if let Some(value) = update.client_name {
            self.client_name = value;
        }
        if let Some(value) = update.pet_name {
            self.pet_name = value;
        }
        if let Some(value) = update.pet_breed {
            self.pet_breed = value;
        }
        if let Some(value) = update.address {
            self.address = value;
        }
        if let Some(value) = update.session_count {
            self.session_count = value;
        }
    }
}
