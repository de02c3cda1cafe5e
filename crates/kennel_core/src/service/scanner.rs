//! Expiration scanner.
//!
//! # Responsibility
//! - Find occupied slots whose stay has ended (`find_expiring`).
//! - Run the controller's expiration pass on a fixed period as a cancellable
//!   task on a caller-supplied current-thread `LocalSet`.
//!
//! # Invariants
//! - Comparison is by calendar day: a stay ends on its check-out date.
//! - The first pass runs immediately; later ticks on the same day are no-ops
//!   for slots already released.
//! - A tick that finds the controller busy is skipped, not queued.
//! - Dropping or cancelling the `ScanHandle` stops the task.

use crate::model::kennel::{KennelSlot, SlotId};
use crate::service::booking::BookingController;
use crate::service::report::ScanReport;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::{JoinHandle, LocalSet};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Ids of occupied slots whose check-out date is on or before `today`.
pub fn find_expiring<'a>(
    slots: impl IntoIterator<Item = &'a KennelSlot>,
    today: NaiveDate,
) -> Vec<SlotId> {
    slots
        .into_iter()
        .filter(|slot| slot.booking().is_some_and(|booking| booking.is_due(today)))
        .map(|slot| slot.id().to_string())
        .collect()
}

/// Periodic driver of `BookingController::expire_overdue`.
pub struct ExpirationScanner {
    controller: Rc<RefCell<BookingController>>,
    period: Duration,
}

impl ExpirationScanner {
    pub fn new(controller: Rc<RefCell<BookingController>>, period: Duration) -> Self {
        Self { controller, period }
    }

    /// Runs one pass dated by the controller's clock.
    ///
    /// Returns `None` when the controller is borrowed elsewhere.
    pub fn scan_once(&self) -> Option<ScanReport> {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            warn!("event=expiration_scan module=scanner status=skipped reason=controller_busy");
            return None;
        };
        let today = controller.today();
        let report = controller.expire_overdue(today);
        if report.is_noop() {
            debug!(
                "event=expiration_scan module=scanner status=ok scan_date={} expired=0",
                today
            );
        } else {
            info!(
                "event=expiration_scan module=scanner status=ok scan_date={} expired={} degraded={}",
                today,
                report.expired_slots.len(),
                report.failures.len()
            );
        }
        Some(report)
    }

    /// Starts the periodic task on `local`.
    ///
    /// The task only makes progress while `local` is being driven.
    pub fn spawn(self, local: &LocalSet) -> ScanHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = local.spawn_local(async move {
            self.run(task_cancel).await;
        });
        ScanHandle {
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, cancel: CancellationToken) {
        info!(
            "event=scanner_start module=scanner status=ok period_ms={}",
            self.period.as_millis()
        );
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.scan_once();
                }
            }
        }
        info!("event=scanner_stop module=scanner status=ok");
    }
}

/// Owner handle of a running scan task.
pub struct ScanHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ScanHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels the task and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(
                    "event=scanner_stop module=scanner status=error error={}",
                    err
                );
            }
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
