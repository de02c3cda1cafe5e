//! Kennel inventory manager.
//!
//! # Responsibility
//! - Own the ordered slot list of each size class.
//! - Add and remove slots; write the whole class list back on every change.
//!
//! # Invariants
//! - Insertion order is significant: it drives removal target and display.
//! - An occupied slot is never removed.
//! - A failed write is logged and reported; in-memory state is kept.

use crate::config::InventoryConfig;
use crate::model::kennel::{KennelSlot, SizeClass};
use crate::service::report::{SideEffect, SideEffectFailure, TransitionReport};
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type InventoryResult<T> = Result<T, InventoryError>;

#[derive(Debug)]
pub enum InventoryError {
    /// No unoccupied slot of this class is left to remove.
    Busy { size: SizeClass, occupied: usize },
    /// Loading the persisted slot lists failed.
    Store(StoreError),
}

impl Display for InventoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy { size, occupied } => write!(
                f,
                "cannot remove a {size} kennel: all {occupied} {size} kennels are occupied"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InventoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Busy { .. } => None,
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// In-memory slot lists backed by one store key per size class.
pub struct KennelInventory {
    store: Rc<dyn KeyValueStore>,
    small: Vec<KennelSlot>,
    large: Vec<KennelSlot>,
}

impl KennelInventory {
    /// Loads both slot lists, seeding a class that was never persisted.
    pub fn load(store: Rc<dyn KeyValueStore>, seed: &InventoryConfig) -> InventoryResult<Self> {
        let mut inventory = Self {
            store,
            small: Vec::new(),
            large: Vec::new(),
        };

        for size in SizeClass::ALL {
            match inventory.read_class(size)? {
                Some(slots) => *inventory.slots_mut(size) = slots,
                None => {
                    let count = seed.seed_for(size);
                    *inventory.slots_mut(size) = (0..count).map(|_| KennelSlot::new(size)).collect();
                    if let Err(failure) = inventory.persist(size) {
                        warn!(
                            "event=inventory_seed module=inventory status=degraded size={} effect={}",
                            size,
                            failure.effect.as_str()
                        );
                    }
                    info!(
                        "event=inventory_seed module=inventory status=ok size={} count={}",
                        size, count
                    );
                }
            }
        }

        Ok(inventory)
    }

    /// Re-reads both classes from the store, picking up other sessions' writes.
    ///
    /// A class whose key has disappeared keeps its in-memory list.
    pub fn reload(&mut self) -> InventoryResult<()> {
        for size in SizeClass::ALL {
            if let Some(slots) = self.read_class(size)? {
                *self.slots_mut(size) = slots;
            }
        }
        Ok(())
    }

    pub fn list_slots(&self, size: SizeClass) -> &[KennelSlot] {
        match size {
            SizeClass::Small => &self.small,
            SizeClass::Large => &self.large,
        }
    }

    pub fn slot(&self, slot_id: &str) -> Option<&KennelSlot> {
        self.small
            .iter()
            .chain(self.large.iter())
            .find(|slot| slot.id() == slot_id)
    }

    /// Occupied slots of both classes, small first, each in list order.
    pub fn occupied_slots(&self) -> impl Iterator<Item = &KennelSlot> {
        self.small
            .iter()
            .chain(self.large.iter())
            .filter(|slot| slot.is_occupied())
    }

    /// Appends a fresh vacant slot.
    pub fn add_slot(&mut self, size: SizeClass) -> TransitionReport {
        let slot = KennelSlot::new(size);
        let slot_id = slot.id().to_string();
        self.slots_mut(size).push(slot);

        info!(
            "event=slot_add module=inventory status=ok size={} slot_id={}",
            size, slot_id
        );
        TransitionReport {
            slot_id,
            linked_event_id: None,
            failures: self.persist(size).err().into_iter().collect(),
        }
    }

    /// Removes the most recently added vacant slot of `size`.
    ///
    /// # Errors
    /// - `InventoryError::Busy` when no vacant slot exists; nothing changes.
    pub fn remove_slot(&mut self, size: SizeClass) -> InventoryResult<TransitionReport> {
        let slots = self.slots_mut(size);
        let Some(index) = slots.iter().rposition(|slot| !slot.is_occupied()) else {
            let occupied = slots.len();
            warn!(
                "event=slot_remove module=inventory status=rejected size={} error_code=inventory_busy occupied={}",
                size, occupied
            );
            return Err(InventoryError::Busy { size, occupied });
        };

        let removed = slots.remove(index);
        info!(
            "event=slot_remove module=inventory status=ok size={} slot_id={}",
            size,
            removed.id()
        );
        Ok(TransitionReport {
            slot_id: removed.id().to_string(),
            linked_event_id: None,
            failures: self.persist(size).err().into_iter().collect(),
        })
    }

    pub(crate) fn slot_mut(&mut self, slot_id: &str) -> Option<&mut KennelSlot> {
        self.small
            .iter_mut()
            .chain(self.large.iter_mut())
            .find(|slot| slot.id() == slot_id)
    }

    /// Writes the whole list of `size` back to the store.
    pub(crate) fn persist(&self, size: SizeClass) -> Result<(), SideEffectFailure> {
        let key = keys::kennels(size);
        save_json(self.store.as_ref(), key, self.list_slots(size)).map_err(|error| {
            warn!(
                "event=store_write module=inventory status=error key={} error_code=persistence_write_failed error={}",
                key, error
            );
            SideEffectFailure {
                effect: SideEffect::SlotPersist,
                error,
            }
        })
    }

    fn read_class(&self, size: SizeClass) -> InventoryResult<Option<Vec<KennelSlot>>> {
        Ok(load_json::<Vec<KennelSlot>>(
            self.store.as_ref(),
            keys::kennels(size),
        )?)
    }

    fn slots_mut(&mut self, size: SizeClass) -> &mut Vec<KennelSlot> {
        match size {
            SizeClass::Small => &mut self.small,
            SizeClass::Large => &mut self.large,
        }
    }
}
