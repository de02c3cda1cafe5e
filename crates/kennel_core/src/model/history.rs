//! Completed-stay snapshot kept by the history ledger.

use crate::model::calendar_event::EventId;
use crate::model::kennel::{Booking, SizeClass};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable archive entry for one finished stay.
///
/// `calendar_event_id` is kept for traceability even though the event it
/// names has normally been removed by the time the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    #[serde(flatten)]
    pub booking: Booking,
    pub kennel_size: SizeClass,
    pub completed_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_id: Option<EventId>,
}

impl HistoryRecord {
    /// Snapshots a released booking under a fresh `history-<uuid>` id.
    pub fn archive(
        booking: Booking,
        kennel_size: SizeClass,
        completed_date: NaiveDate,
        calendar_event_id: Option<EventId>,
    ) -> Self {
        Self {
            id: format!("history-{}", Uuid::new_v4()),
            booking,
            kennel_size,
            completed_date,
            calendar_event_id,
        }
    }
}
