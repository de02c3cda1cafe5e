//! Calendar event records stored in the shared event list.
//!
//! # Responsibility
//! - Define the event shape shared by hotel projections and plain entries.
//! - Build and refresh the hotel projection of a booking.
//!
//! # Invariants
//! - A hotel projection covers only the check-in day, not the full stay.
//! - Plain (non-hotel) events are read as-is; optional hotel fields default.
//! - Fields this crate does not model are kept in `extra` and written back
//!   unchanged, so the calendar feature's own data survives a rewrite.

use crate::model::kennel::{Booking, SizeClass, SlotId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Calendar event identifier. Hotel projections use `hotel-<uuid>`.
pub type EventId = String;

/// Default check-in time stamped on hotel projections.
pub const HOTEL_START_TIME: &str = "09:00";
/// Default check-out time stamped on hotel projections.
pub const HOTEL_END_TIME: &str = "17:00";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    /// `HH:MM`, compared lexically for ordering.
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hotel_booking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kennel_id: Option<SlotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kennel_size: Option<SizeClass>,
    /// Fields owned by other writers of the shared list.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    /// Builds a fresh hotel projection with a generated id.
    pub fn hotel_projection(slot_id: &str, size: SizeClass, booking: &Booking) -> Self {
        Self {
            id: format!("hotel-{}", Uuid::new_v4()),
            title: hotel_title(booking, size),
            description: hotel_description(booking),
            date: booking.check_in_date,
            start_time: HOTEL_START_TIME.to_string(),
            end_time: HOTEL_END_TIME.to_string(),
            is_hotel_booking: true,
            kennel_id: Some(slot_id.to_string()),
            kennel_size: Some(size),
            extra: Map::new(),
        }
    }

    /// Rewrites the booking-derived fields in place.
    ///
    /// Times, id and the hotel flag are left untouched.
    pub fn refresh_projection(&mut self, slot_id: &str, size: SizeClass, booking: &Booking) {
        self.title = hotel_title(booking, size);
        self.description = hotel_description(booking);
        self.date = booking.check_in_date;
        self.kennel_id = Some(slot_id.to_string());
        self.kennel_size = Some(size);
    }
}

fn hotel_title(booking: &Booking, size: SizeClass) -> String {
    format!("Hotel: {} ({})", booking.dog_name, size)
}

fn hotel_description(booking: &Booking) -> String {
    format!(
        "Dog Hotel Booking\nContact: {} ({})",
        booking.contact_person, booking.contact_number
    )
}

fn is_false(value: &bool) -> bool {
    !*value
}
