#![allow(dead_code)]

use chrono::NaiveDate;
use kennel_core::{
    Booking, BookingController, FixedClock, InventoryConfig, KeyValueStore, MemoryStore,
    StoreError, StoreResult,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn booking(dog: &str, check_in: &str, check_out: &str) -> Booking {
    Booking {
        dog_name: dog.to_string(),
        contact_person: "Jordan".to_string(),
        contact_number: "555-0199".to_string(),
        check_in_date: date(check_in),
        check_out_date: date(check_out),
    }
}

/// Memory store whose writes to selected keys fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: RefCell<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing.borrow_mut().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self.failing.borrow().contains(key) {
            return Err(StoreError::Unavailable(format!("write to {key} refused")));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.check(key)?;
        self.inner.delete(key)
    }

    fn add_to_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check(key)?;
        self.inner.add_to_set(key, member)
    }

    fn remove_from_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check(key)?;
        self.inner.remove_from_set(key, member)
    }

    fn list_set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        self.inner.list_set_members(key)
    }
}

pub struct Harness {
    pub store: Rc<dyn KeyValueStore>,
    pub clock: Rc<FixedClock>,
    pub controller: BookingController,
}

pub fn harness(today: &str) -> Harness {
    harness_on(Rc::new(MemoryStore::new()), today)
}

pub fn harness_on(store: Rc<dyn KeyValueStore>, today: &str) -> Harness {
    let clock = Rc::new(FixedClock::new(date(today)));
    let controller = BookingController::new(
        Rc::clone(&store),
        clock.clone(),
        &InventoryConfig::default(),
    )
    .unwrap();
    Harness {
        store,
        clock,
        controller,
    }
}

/// Id of the `index`-th slot of a class.
pub fn slot_id(controller: &BookingController, size: kennel_core::SizeClass, index: usize) -> String {
    controller.inventory().list_slots(size)[index].id().to_string()
}
