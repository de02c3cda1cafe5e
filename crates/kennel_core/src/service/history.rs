//! Append-only ledger of completed stays.
//!
//! # Invariants
//! - Records are only ever appended; there is no update or delete path.
//! - No deduplication: archiving the same stay twice yields two entries.

use crate::model::history::HistoryRecord;
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreResult};
use log::info;
use std::rc::Rc;

pub struct HistoryLedger {
    store: Rc<dyn KeyValueStore>,
}

impl HistoryLedger {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Appends a batch with one read-modify-write. An empty batch writes nothing.
    pub fn append(&self, records: &[HistoryRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut history = self.read_all()?;
        history.extend_from_slice(records);
        save_json(self.store.as_ref(), keys::BOOKING_HISTORY, &history)?;
        info!(
            "event=history_append module=history status=ok appended={} total={}",
            records.len(),
            history.len()
        );
        Ok(())
    }

    /// Newest `completed_date` first; equal dates list the later append first.
    pub fn list_recent(&self) -> StoreResult<Vec<HistoryRecord>> {
        let mut history = self.read_all()?;
        history.reverse();
        history.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
        Ok(history)
    }

    fn read_all(&self) -> StoreResult<Vec<HistoryRecord>> {
        Ok(load_json(self.store.as_ref(), keys::BOOKING_HISTORY)?.unwrap_or_default())
    }
}
