//! Calendar synchronization adapter.
//!
//! # Responsibility
//! - Create, refresh and remove the hotel projection of a booking in the
//!   shared calendar event list.
//! - Serve the read and delete paths of the calendar surface.
//!
//! # Invariants
//! - Every operation is a full read of the shared list followed by a full
//!   rewrite; nothing is cached between calls.
//! - A missing target is a silent no-op (`SyncOutcome::Missing`), never an
//!   error and never a re-create.
//! - Plain events written by the calendar feature are preserved untouched.

use crate::model::calendar_event::{CalendarEvent, EventId};
use crate::model::kennel::{Booking, KennelSlot};
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreResult};
use chrono::NaiveDate;
use log::{debug, info};
use std::rc::Rc;

/// Whether an update/delete found its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    Missing,
}

/// Result of a calendar-surface delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarDeletion {
    Deleted,
    /// Hotel projection kept because the user declined the prompt.
    Declined,
    Missing,
}

/// Read-modify-write adapter over the `calendarEvents` document.
pub struct CalendarSync {
    store: Rc<dyn KeyValueStore>,
}

impl CalendarSync {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the whole shared list in stored order.
    pub fn list_events(&self) -> StoreResult<Vec<CalendarEvent>> {
        Ok(load_json(self.store.as_ref(), keys::CALENDAR_EVENTS)?.unwrap_or_default())
    }

    pub fn find_event(&self, event_id: &str) -> StoreResult<Option<CalendarEvent>> {
        Ok(self
            .list_events()?
            .into_iter()
            .find(|event| event.id == event_id))
    }

    /// Events on one day, ordered by start time.
    pub fn events_on(&self, date: NaiveDate) -> StoreResult<Vec<CalendarEvent>> {
        let mut events: Vec<CalendarEvent> = self
            .list_events()?
            .into_iter()
            .filter(|event| event.date == date)
            .collect();
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(events)
    }

    /// Appends the hotel projection of `booking` in `slot` and returns its id.
    pub fn create_event(&self, slot: &KennelSlot, booking: &Booking) -> StoreResult<EventId> {
        let mut events = self.list_events()?;
        let event = CalendarEvent::hotel_projection(slot.id(), slot.size(), booking);
        let event_id = event.id.clone();
        events.push(event);
        self.save_events(&events)?;

        info!(
            "event=calendar_create module=calendar_sync status=ok slot_id={} event_id={}",
            slot.id(),
            event_id
        );
        Ok(event_id)
    }

    /// Refreshes an existing projection; a missing event is left missing.
    pub fn update_event(
        &self,
        event_id: &str,
        slot: &KennelSlot,
        booking: &Booking,
    ) -> StoreResult<SyncOutcome> {
        let mut events = self.list_events()?;
        let Some(event) = events.iter_mut().find(|event| event.id == event_id) else {
            debug!(
                "event=calendar_update module=calendar_sync status=skipped reason=not_found event_id={}",
                event_id
            );
            return Ok(SyncOutcome::Missing);
        };

        event.refresh_projection(slot.id(), slot.size(), booking);
        self.save_events(&events)?;
        info!(
            "event=calendar_update module=calendar_sync status=ok slot_id={} event_id={}",
            slot.id(),
            event_id
        );
        Ok(SyncOutcome::Applied)
    }

    /// Removes one event by id. Idempotent.
    pub fn delete_event(&self, event_id: &str) -> StoreResult<SyncOutcome> {
        let removed = self.remove_where(|event| event.id == event_id)?;
        if removed == 0 {
            debug!(
                "event=calendar_delete module=calendar_sync status=skipped reason=not_found event_id={}",
                event_id
            );
            return Ok(SyncOutcome::Missing);
        }
        info!(
            "event=calendar_delete module=calendar_sync status=ok event_id={}",
            event_id
        );
        Ok(SyncOutcome::Applied)
    }

    /// Removes several events with one read and at most one write.
    ///
    /// Returns how many were found and removed.
    pub fn delete_events(&self, event_ids: &[EventId]) -> StoreResult<usize> {
        if event_ids.is_empty() {
            return Ok(0);
        }
        let removed = self.remove_where(|event| event_ids.contains(&event.id))?;
        info!(
            "event=calendar_delete_batch module=calendar_sync status=ok requested={} removed={}",
            event_ids.len(),
            removed
        );
        Ok(removed)
    }

    /// Deletes an event from the calendar surface.
    ///
    /// Hotel projections are only removed when `confirm` agrees: removing
    /// one here leaves the kennel booking in place with a dangling link.
    pub fn delete_from_calendar(
        &self,
        event_id: &str,
        confirm: impl FnOnce(&CalendarEvent) -> bool,
    ) -> StoreResult<CalendarDeletion> {
        let mut events = self.list_events()?;
        let Some(index) = events.iter().position(|event| event.id == event_id) else {
            return Ok(CalendarDeletion::Missing);
        };

        if events[index].is_hotel_booking && !confirm(&events[index]) {
            info!(
                "event=calendar_surface_delete module=calendar_sync status=declined event_id={}",
                event_id
            );
            return Ok(CalendarDeletion::Declined);
        }

        let removed = events.remove(index);
        self.save_events(&events)?;
        info!(
            "event=calendar_surface_delete module=calendar_sync status=ok event_id={} hotel={}",
            event_id, removed.is_hotel_booking
        );
        Ok(CalendarDeletion::Deleted)
    }

    fn remove_where(&self, predicate: impl Fn(&CalendarEvent) -> bool) -> StoreResult<usize> {
        let mut events = self.list_events()?;
        let before = events.len();
        events.retain(|event| !predicate(event));
        let removed = before - events.len();
        if removed > 0 {
            self.save_events(&events)?;
        }
        Ok(removed)
    }

    fn save_events(&self, events: &[CalendarEvent]) -> StoreResult<()> {
        save_json(self.store.as_ref(), keys::CALENDAR_EVENTS, events)
    }
}
