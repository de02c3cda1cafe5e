//! Client roster service.
//!
//! # Responsibility
//! - Register, read, edit and remove training clients.
//! - Track completed session counts.
//!
//! # Invariants
//! - The id set (`dogTrainer:clients`) and per-client documents are written
//!   independently; an id whose document is missing is skipped on list.
//! - `session_count` never goes below zero.

use crate::model::client::{Client, ClientUpdate, NewClient};
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug)]
pub enum RosterError {
    ClientNotFound(String),
    /// Session counts move by exactly one step at a time.
    InvalidIncrement(i32),
    Store(StoreError),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientNotFound(id) => write!(f, "client not found: {id}"),
            Self::InvalidIncrement(value) => {
                write!(f, "invalid session increment {value}; expected 1 or -1")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RosterError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub struct ClientRoster {
    store: Rc<dyn KeyValueStore>,
}

impl ClientRoster {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn add_client(&self, input: NewClient) -> RosterResult<Client> {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            client_name: input.client_name,
            pet_name: input.pet_name,
            pet_breed: input.pet_breed,
            address: input.address,
            session_count: input.session_count,
        };
        save_json(self.store.as_ref(), &keys::client(&client.id), &client)?;
        self.store.add_to_set(keys::CLIENT_IDS, &client.id)?;
        info!(
            "event=client_add module=client_roster status=ok client_id={}",
            client.id
        );
        Ok(client)
    }

    pub fn get_client(&self, id: &str) -> RosterResult<Option<Client>> {
        Ok(load_json(self.store.as_ref(), &keys::client(id))?)
    }

    /// Clients in registration order.
    pub fn list_clients(&self) -> RosterResult<Vec<Client>> {
        let mut clients = Vec::new();
        for id in self.store.list_set_members(keys::CLIENT_IDS)? {
            if let Some(client) = self.get_client(&id)? {
                clients.push(client);
            }
        }
        Ok(clients)
    }

    /// Merges `update` into the stored client and writes it back.
    pub fn update_client(&self, id: &str, update: ClientUpdate) -> RosterResult<Client> {
        let mut client = self
            .get_client(id)?
            .ok_or_else(|| RosterError::ClientNotFound(id.to_string()))?;
        client.apply(update);
        save_json(self.store.as_ref(), &keys::client(id), &client)?;
        info!(
            "event=client_update module=client_roster status=ok client_id={}",
            id
        );
        Ok(client)
    }

    /// Removes a client. Removing an unknown id is a no-op.
    pub fn delete_client(&self, id: &str) -> RosterResult<()> {
        self.store.delete(&keys::client(id))?;
        self.store.remove_from_set(keys::CLIENT_IDS, id)?;
        info!(
            "event=client_delete module=client_roster status=ok client_id={}",
            id
        );
        Ok(())
    }

    /// Adds or removes one completed session, clamped at zero.
    pub fn adjust_session_count(&self, id: &str, increment: i32) -> RosterResult<Client> {
        if increment != 1 && increment != -1 {
            return Err(RosterError::InvalidIncrement(increment));
        }
        let mut client = self
            .get_client(id)?
            .ok_or_else(|| RosterError::ClientNotFound(id.to_string()))?;
        client.session_count = if increment > 0 {
            client.session_count.saturating_add(1)
        } else {
            client.session_count.saturating_sub(1)
        };
        save_json(self.store.as_ref(), &keys::client(id), &client)?;
        Ok(client)
    }
}
