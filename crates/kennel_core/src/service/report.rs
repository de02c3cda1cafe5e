//! Outcome reports for state transitions.
//!
//! A transition always commits its primary effect (slot occupancy); the
//! secondary writes it could not complete are listed here instead of being
//! raised as errors.

use crate::model::calendar_event::EventId;
use crate::model::history::HistoryRecord;
use crate::model::kennel::SlotId;
use crate::store::StoreError;
use chrono::NaiveDate;

/// Secondary write attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    SlotPersist,
    CalendarCreate,
    CalendarUpdate,
    CalendarDelete,
    HistoryAppend,
}

impl SideEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SlotPersist => "slot_persist",
            Self::CalendarCreate => "calendar_create",
            Self::CalendarUpdate => "calendar_update",
            Self::CalendarDelete => "calendar_delete",
            Self::HistoryAppend => "history_append",
        }
    }
}

/// A tolerated secondary-write failure.
#[derive(Debug)]
pub struct SideEffectFailure {
    pub effect: SideEffect,
    pub error: StoreError,
}

/// Result of one slot-level transition.
#[derive(Debug)]
pub struct TransitionReport {
    pub slot_id: SlotId,
    /// Calendar link held by the slot after the transition.
    pub linked_event_id: Option<EventId>,
    pub failures: Vec<SideEffectFailure>,
}

impl TransitionReport {
    /// True when every secondary write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, effect: SideEffect) -> bool {
        self.failures.iter().any(|failure| failure.effect == effect)
    }
}

/// Result of one expiration pass.
#[derive(Debug)]
pub struct ScanReport {
    pub scan_date: NaiveDate,
    pub expired_slots: Vec<SlotId>,
    /// Archive entries created by this pass, in slot order.
    pub records: Vec<HistoryRecord>,
    pub failures: Vec<SideEffectFailure>,
}

impl ScanReport {
    pub fn is_noop(&self) -> bool {
        self.expired_slots.is_empty()
    }

    pub fn failed(&self, effect: SideEffect) -> bool {
        self.failures.iter().any(|failure| failure.effect == effect)
    }
}
