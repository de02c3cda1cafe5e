//! Kennel slot and booking domain model.
//!
//! # Responsibility
//! - Define the boarding unit (`KennelSlot`) and the stay it carries (`Booking`).
//! - Provide the only state transitions a slot supports.
//!
//! # Invariants
//! - `KennelSlot::is_occupied()` is derived from booking presence, never stored.
//! - A slot `id` is stable and never reused for another slot.
//! - Persisted slots whose `isOccupied` flag disagrees with `bookingInfo` are
//!   rejected on decode instead of being silently repaired.

use crate::model::calendar_event::EventId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable kennel slot identifier, e.g. `small-<uuid>`.
pub type SlotId = String;

/// Physical size class of a boarding unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    /// Every size class in display order.
    pub const ALL: [SizeClass; 2] = [SizeClass::Small, SizeClass::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

impl Display for SizeClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stay record attached to an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub dog_name: String,
    pub contact_person: String,
    pub contact_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

impl Booking {
    /// Validates the stay range.
    ///
    /// Same-day stays (`check_out_date == check_in_date`) are allowed.
    pub fn validate(&self) -> Result<(), BookingValidationError> {
        if self.check_out_date < self.check_in_date {
            return Err(BookingValidationError::CheckOutBeforeCheckIn {
                check_in: self.check_in_date,
                check_out: self.check_out_date,
            });
        }
        Ok(())
    }

    /// Returns whether the stay is over as of `today` (calendar-day granularity).
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.check_out_date <= today
    }
}

/// Booking input rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingValidationError {
    CheckOutBeforeCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

impl Display for BookingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckOutBeforeCheckIn {
                check_in,
                check_out,
            } => write!(
                f,
                "check-out date {check_out} is earlier than check-in date {check_in}"
            ),
        }
    }
}

impl Error for BookingValidationError {}

/// Occupancy state of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Vacant,
    Occupied {
        booking: Booking,
        /// Weak reference into the shared calendar event list.
        linked_event_id: Option<EventId>,
    },
}

/// One physical boarding unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KennelSlotDocument", into = "KennelSlotDocument")]
pub struct KennelSlot {
    id: SlotId,
    size: SizeClass,
    state: SlotState,
}

impl KennelSlot {
    /// Creates a vacant slot with a generated stable id.
    pub fn new(size: SizeClass) -> Self {
        Self::with_id(format!("{}-{}", size.as_str(), Uuid::new_v4()), size)
    }

    /// Creates a vacant slot with a caller-provided id.
    pub fn with_id(id: impl Into<SlotId>, size: SizeClass) -> Self {
        Self {
            id: id.into(),
            size,
            state: SlotState::Vacant,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> SizeClass {
        self.size
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self.state, SlotState::Occupied { .. })
    }

    pub fn booking(&self) -> Option<&Booking> {
        match &self.state {
            SlotState::Occupied { booking, .. } => Some(booking),
            SlotState::Vacant => None,
        }
    }

    pub fn linked_event_id(&self) -> Option<&str> {
        match &self.state {
            SlotState::Occupied {
                linked_event_id, ..
            } => linked_event_id.as_deref(),
            SlotState::Vacant => None,
        }
    }

    /// Moves a slot to `Occupied`, or replaces the booking wholesale when it
    /// already is. An existing link is kept unless `linked_event_id` is set.
    pub(crate) fn occupy(&mut self, booking: Booking, linked_event_id: Option<EventId>) {
        let linked_event_id = match (&self.state, linked_event_id) {
            (_, Some(id)) => Some(id),
            (
                SlotState::Occupied {
                    linked_event_id, ..
                },
                None,
            ) => linked_event_id.clone(),
            (SlotState::Vacant, None) => None,
        };
        self.state = SlotState::Occupied {
            booking,
            linked_event_id,
        };
    }

    /// Moves a slot to `Vacant` and hands back what it carried.
    ///
    /// Returns `None` when the slot was already vacant.
    pub(crate) fn vacate(&mut self) -> Option<(Booking, Option<EventId>)> {
        match std::mem::replace(&mut self.state, SlotState::Vacant) {
            SlotState::Occupied {
                booking,
                linked_event_id,
            } => Some((booking, linked_event_id)),
            SlotState::Vacant => None,
        }
    }
}

/// Persisted slot shape stored under the kennel list keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KennelSlotDocument {
    id: SlotId,
    size: SizeClass,
    is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    booking_info: Option<Booking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar_event_id: Option<EventId>,
}

/// Persisted slot document violates the occupancy invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSlotDocument {
    pub slot_id: SlotId,
    pub reason: &'static str,
}

impl Display for InvalidSlotDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid kennel slot `{}`: {}", self.slot_id, self.reason)
    }
}

impl Error for InvalidSlotDocument {}

impl TryFrom<KennelSlotDocument> for KennelSlot {
    type Error = InvalidSlotDocument;

    fn try_from(value: KennelSlotDocument) -> Result<Self, Self::Error> {
        let state = match (value.is_occupied, value.booking_info) {
            (true, Some(booking)) => SlotState::Occupied {
                booking,
                linked_event_id: value.calendar_event_id,
            },
            (false, None) if value.calendar_event_id.is_none() => SlotState::Vacant,
            (false, None) => {
                return Err(InvalidSlotDocument {
                    slot_id: value.id,
                    reason: "vacant slot still references a calendar event",
                });
            }
            (true, None) => {
                return Err(InvalidSlotDocument {
                    slot_id: value.id,
                    reason: "occupied slot has no booking",
                });
            }
            (false, Some(_)) => {
                return Err(InvalidSlotDocument {
                    slot_id: value.id,
                    reason: "vacant slot still carries a booking",
                });
            }
        };

        Ok(Self {
            id: value.id,
            size: value.size,
            state,
        })
    }
}

impl From<KennelSlot> for KennelSlotDocument {
    fn from(value: KennelSlot) -> Self {
        let (is_occupied, booking_info, calendar_event_id) = match value.state {
            SlotState::Vacant => (false, None, None),
            SlotState::Occupied {
                booking,
                linked_event_id,
            } => (true, Some(booking), linked_event_id),
        };
        Self {
            id: value.id,
            size: value.size,
            is_occupied,
            booking_info,
            calendar_event_id,
        }
    }
}
