//! Booking lifecycle controller.
//!
//! # Responsibility
//! - Drive the per-slot `Vacant -> Occupied -> Vacant` state machine.
//! - Keep the calendar projection and the history ledger in step with it.
//!
//! # Invariants
//! - Slot occupancy is the primary effect and always commits once input is
//!   accepted; calendar, history and persistence writes are secondary and
//!   their failures are reported, never raised.
//! - A booking leaves a slot only through archival: every release appends
//!   exactly one `HistoryRecord`.
//! - No optimistic-concurrency check: concurrent sessions are
//!   last-writer-wins.

use crate::clock::Clock;
use crate::config::InventoryConfig;
use crate::model::calendar_event::EventId;
use crate::model::history::HistoryRecord;
use crate::model::kennel::{Booking, BookingValidationError, SlotId};
use crate::service::calendar_sync::{CalendarSync, SyncOutcome};
use crate::service::history::HistoryLedger;
use crate::service::inventory::{InventoryError, KennelInventory};
use crate::service::report::{ScanReport, SideEffect, SideEffectFailure, TransitionReport};
use crate::service::scanner::find_expiring;
use crate::store::{KeyValueStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type BookingResult<T> = Result<T, BookingError>;

/// Caller errors rejected before any state change.
#[derive(Debug)]
pub enum BookingError {
    SlotNotFound(SlotId),
    /// Release requested on a slot without a booking.
    SlotVacant(SlotId),
    InvalidStay(BookingValidationError),
    Inventory(InventoryError),
}

impl Display for BookingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotNotFound(id) => write!(f, "kennel slot not found: {id}"),
            Self::SlotVacant(id) => write!(f, "kennel slot has no active booking: {id}"),
            Self::InvalidStay(err) => write!(f, "{err}"),
            Self::Inventory(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidStay(err) => Some(err),
            Self::Inventory(err) => Some(err),
            Self::SlotNotFound(_) | Self::SlotVacant(_) => None,
        }
    }
}

impl From<InventoryError> for BookingError {
    fn from(value: InventoryError) -> Self {
        Self::Inventory(value)
    }
}

impl From<BookingValidationError> for BookingError {
    fn from(value: BookingValidationError) -> Self {
        Self::InvalidStay(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum ReleaseReason {
    Checkout,
    Expired,
}

impl ReleaseReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Expired => "expired",
        }
    }
}

struct Released {
    slot_ids: Vec<SlotId>,
    records: Vec<HistoryRecord>,
    failures: Vec<SideEffectFailure>,
}

/// Orchestrates slot transitions over inventory, calendar and ledger.
pub struct BookingController {
    inventory: KennelInventory,
    calendar: CalendarSync,
    ledger: HistoryLedger,
    clock: Rc<dyn Clock>,
}

impl BookingController {
    /// Builds the controller over one injected store.
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        inventory_config: &InventoryConfig,
    ) -> BookingResult<Self> {
        let inventory = KennelInventory::load(Rc::clone(&store), inventory_config)?;
        Ok(Self {
            inventory,
            calendar: CalendarSync::new(Rc::clone(&store)),
            ledger: HistoryLedger::new(store),
            clock,
        })
    }

    pub fn inventory(&self) -> &KennelInventory {
        &self.inventory
    }

    /// Slot add/remove never touch bookings, so they go straight to inventory.
    pub fn inventory_mut(&mut self) -> &mut KennelInventory {
        &mut self.inventory
    }

    pub fn calendar(&self) -> &CalendarSync {
        &self.calendar
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Books a vacant slot, or replaces the booking of an occupied one.
    ///
    /// # Contract
    /// - Vacant slot: creates the calendar projection and links it.
    /// - Occupied slot: refreshes the linked projection and replaces the
    ///   booking wholesale. A dangling link stays dangling.
    /// - Occupied slot without a link: creates a projection.
    ///
    /// # Errors
    /// - `SlotNotFound` for an unknown id.
    /// - `InvalidStay` when check-out precedes check-in.
    pub fn create_or_update_booking(
        &mut self,
        slot_id: &str,
        booking: Booking,
    ) -> BookingResult<TransitionReport> {
        booking.validate()?;
        let slot = self
            .inventory
            .slot(slot_id)
            .ok_or_else(|| BookingError::SlotNotFound(slot_id.to_string()))?;
        let size = slot.size();
        let was_occupied = slot.is_occupied();
        let mut failures = Vec::new();

        let new_link: Option<EventId> = match slot.linked_event_id() {
            Some(event_id) => {
                match self.calendar.update_event(event_id, slot, &booking) {
                    Ok(SyncOutcome::Applied) | Ok(SyncOutcome::Missing) => {}
                    Err(error) => {
                        failures.push(self.tolerate(SideEffect::CalendarUpdate, slot_id, error));
                    }
                }
                None
            }
            None => match self.calendar.create_event(slot, &booking) {
                Ok(event_id) => Some(event_id),
                Err(error) => {
                    failures.push(self.tolerate(SideEffect::CalendarCreate, slot_id, error));
                    None
                }
            },
        };

        let slot = self
            .inventory
            .slot_mut(slot_id)
            .ok_or_else(|| BookingError::SlotNotFound(slot_id.to_string()))?;
        slot.occupy(booking, new_link);
        let linked_event_id = slot.linked_event_id().map(str::to_string);

        if let Err(failure) = self.inventory.persist(size) {
            failures.push(failure);
        }

        info!(
            "event={} module=booking status=ok slot_id={} size={} linked={} degraded={}",
            if was_occupied { "booking_update" } else { "booking_create" },
            slot_id,
            size,
            linked_event_id.is_some(),
            failures.len()
        );
        Ok(TransitionReport {
            slot_id: slot_id.to_string(),
            linked_event_id,
            failures,
        })
    }

    /// Checks a booking out: archives it dated today and frees the slot.
    ///
    /// # Errors
    /// - `SlotNotFound` for an unknown id; `SlotVacant` when nothing is booked.
    pub fn delete_booking(&mut self, slot_id: &str) -> BookingResult<TransitionReport> {
        let today = self.clock.today();
        self.release_one(slot_id, today, ReleaseReason::Checkout)
    }

    /// Expires one booking, archiving it under `scan_date` instead of today.
    pub fn expire_booking(
        &mut self,
        slot_id: &str,
        scan_date: NaiveDate,
    ) -> BookingResult<TransitionReport> {
        self.release_one(slot_id, scan_date, ReleaseReason::Expired)
    }

    /// Expires every occupied slot whose check-out date is on or before
    /// `today`, as one pass with one history batch.
    pub fn expire_overdue(&mut self, today: NaiveDate) -> ScanReport {
        let due = find_expiring(self.inventory.occupied_slots(), today);
        if due.is_empty() {
            return ScanReport {
                scan_date: today,
                expired_slots: Vec::new(),
                records: Vec::new(),
                failures: Vec::new(),
            };
        }

        let released = self.release(&due, today, ReleaseReason::Expired);
        ScanReport {
            scan_date: today,
            expired_slots: released.slot_ids,
            records: released.records,
            failures: released.failures,
        }
    }

    /// Re-reads slot lists written by other sessions.
    pub fn reload(&mut self) -> BookingResult<()> {
        Ok(self.inventory.reload()?)
    }

    fn release_one(
        &mut self,
        slot_id: &str,
        completed_date: NaiveDate,
        reason: ReleaseReason,
    ) -> BookingResult<TransitionReport> {
        let slot = self
            .inventory
            .slot(slot_id)
            .ok_or_else(|| BookingError::SlotNotFound(slot_id.to_string()))?;
        if !slot.is_occupied() {
            return Err(BookingError::SlotVacant(slot_id.to_string()));
        }

        let released = self.release(&[slot_id.to_string()], completed_date, reason);
        Ok(TransitionReport {
            slot_id: slot_id.to_string(),
            linked_event_id: None,
            failures: released.failures,
        })
    }

    /// Vacates `slot_ids`, then removes their projections, appends their
    /// records as one batch and persists the touched classes.
    fn release(
        &mut self,
        slot_ids: &[SlotId],
        completed_date: NaiveDate,
        reason: ReleaseReason,
    ) -> Released {
        let mut released_ids = Vec::new();
        let mut records = Vec::new();
        let mut event_ids = Vec::new();
        let mut touched = BTreeSet::new();

        for slot_id in slot_ids {
            let Some(slot) = self.inventory.slot_mut(slot_id) else {
                continue;
            };
            let size = slot.size();
            let Some((booking, linked_event_id)) = slot.vacate() else {
                continue;
            };
            if let Some(event_id) = &linked_event_id {
                event_ids.push(event_id.clone());
            }
            records.push(HistoryRecord::archive(
                booking,
                size,
                completed_date,
                linked_event_id,
            ));
            released_ids.push(slot_id.clone());
            touched.insert(size);
        }

        let mut failures = Vec::new();
        if let Err(error) = self.calendar.delete_events(&event_ids) {
            failures.push(self.tolerate(SideEffect::CalendarDelete, "batch", error));
        }
        if let Err(error) = self.ledger.append(&records) {
            failures.push(self.tolerate(SideEffect::HistoryAppend, "batch", error));
        }
        for size in touched {
            if let Err(failure) = self.inventory.persist(size) {
                failures.push(failure);
            }
        }

        info!(
            "event=booking_release module=booking status=ok reason={} released={} completed_date={} degraded={}",
            reason.as_str(),
            released_ids.len(),
            completed_date,
            failures.len()
        );
        Released {
            slot_ids: released_ids,
            records,
            failures,
        }
    }

    fn tolerate(
        &self,
        effect: SideEffect,
        target: &str,
        error: StoreError,
    ) -> SideEffectFailure {
        warn!(
            "event=side_effect module=booking status=error effect={} target={} error={}",
            effect.as_str(),
            target,
            error
        );
        SideEffectFailure { effect, error }
    }
}
