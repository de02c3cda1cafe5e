//! Process-local store backend.

use super::{KeyValueStore, StoreResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory `KeyValueStore`; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    sets: RefCell<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.values.borrow_mut().remove(key).is_some())
    }

    fn add_to_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut sets = self.sets.borrow_mut();
        let members = sets.entry(key.to_string()).or_default();
        if members.iter().any(|existing| existing == member) {
            return Ok(false);
        }
        members.push(member.to_string());
        Ok(true)
    }

    fn remove_from_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut sets = self.sets.borrow_mut();
        let Some(members) = sets.get_mut(key) else {
            return Ok(false);
        };
        let before = members.len();
        members.retain(|existing| existing != member);
        Ok(members.len() != before)
    }

    fn list_set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(self.sets.borrow().get(key).cloned().unwrap_or_default())
    }
}
