mod common;

use common::{booking, date, harness, harness_on, slot_id, FlakyStore, Harness};
use kennel_core::store::{keys, load_json};
use kennel_core::{
    BookingError, ExpirationScanner, HistoryRecord, KennelSlot, SideEffect, SizeClass,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

#[test]
fn overdue_stay_is_released_into_history() {
    let mut h = harness("2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    let stay = booking("Milo", "2023-12-28", "2024-01-01");
    let event_id = h
        .controller
        .create_or_update_booking(&id, stay.clone())
        .unwrap()
        .linked_event_id
        .unwrap();

    let report = h.controller.expire_overdue(date("2024-01-02"));

    assert_eq!(report.expired_slots, vec![id.clone()]);
    assert!(report.failures.is_empty());
    assert!(!h.controller.inventory().slot(&id).unwrap().is_occupied());
    assert!(h.controller.calendar().find_event(&event_id).unwrap().is_none());

    let history = h.controller.history().list_recent().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].booking, stay);
    assert_eq!(history[0].completed_date, date("2024-01-02"));
    assert_eq!(history[0].kennel_size, SizeClass::Small);
    assert_eq!(report.records, history);
}

#[test]
fn future_checkout_is_left_alone() {
    let mut h = harness("2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    h.controller
        .create_or_update_booking(&id, booking("Milo", "2023-12-28", "2024-01-05"))
        .unwrap();

    let report = h.controller.expire_overdue(date("2024-01-02"));

    assert!(report.is_noop());
    assert!(h.controller.inventory().slot(&id).unwrap().is_occupied());
    assert!(h.controller.history().list_recent().unwrap().is_empty());
    assert_eq!(h.controller.calendar().list_events().unwrap().len(), 1);
}

#[test]
fn checkout_day_itself_counts_as_due() {
    let mut h = harness("2024-01-05");
    let id = slot_id(&h.controller, SizeClass::Large, 1);
    h.controller
        .create_or_update_booking(&id, booking("Milo", "2024-01-01", "2024-01-05"))
        .unwrap();

    let report = h.controller.expire_overdue(date("2024-01-05"));

    assert_eq!(report.expired_slots, vec![id]);
}

#[test]
fn one_pass_releases_every_due_slot_in_one_batch() {
    let mut h = harness("2024-01-10");
    let small_a = slot_id(&h.controller, SizeClass::Small, 0);
    let small_b = slot_id(&h.controller, SizeClass::Small, 3);
    let large = slot_id(&h.controller, SizeClass::Large, 2);
    let staying = slot_id(&h.controller, SizeClass::Large, 4);
    for (id, dog, out) in [
        (&small_a, "Milo", "2024-01-08"),
        (&small_b, "Pip", "2024-01-10"),
        (&large, "Bruno", "2024-01-09"),
        (&staying, "Ace", "2024-01-20"),
    ] {
        h.controller
            .create_or_update_booking(id, booking(dog, "2024-01-01", out))
            .unwrap();
    }

    let report = h.controller.expire_overdue(date("2024-01-10"));

    assert_eq!(report.expired_slots, vec![small_a, small_b, large]);
    assert_eq!(report.records.len(), 3);
    assert!(report
        .records
        .iter()
        .all(|record| record.completed_date == date("2024-01-10")));
    assert_eq!(h.controller.history().list_recent().unwrap().len(), 3);
    assert!(h.controller.inventory().slot(&staying).unwrap().is_occupied());
    assert_eq!(h.controller.calendar().list_events().unwrap().len(), 1);
}

#[test]
fn second_pass_on_the_same_day_archives_nothing_new() {
    let mut h = harness("2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    h.controller
        .create_or_update_booking(&id, booking("Milo", "2023-12-28", "2024-01-01"))
        .unwrap();

    h.controller.expire_overdue(date("2024-01-02"));
    let again = h.controller.expire_overdue(date("2024-01-02"));

    assert!(again.is_noop());
    assert_eq!(h.controller.history().list_recent().unwrap().len(), 1);
}

#[test]
fn expire_booking_archives_under_the_scan_date() {
    let mut h = harness("2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    h.controller
        .create_or_update_booking(&id, booking("Milo", "2023-12-28", "2024-01-01"))
        .unwrap();

    h.controller.expire_booking(&id, date("2024-01-04")).unwrap();

    let history = h.controller.history().list_recent().unwrap();
    assert_eq!(history[0].completed_date, date("2024-01-04"));
    assert!(matches!(
        h.controller.expire_booking(&id, date("2024-01-04")),
        Err(BookingError::SlotVacant(_))
    ));
}

#[test]
fn scan_tolerates_history_write_failure() {
    let flaky = Rc::new(FlakyStore::new());
    let mut h = harness_on(flaky.clone(), "2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    h.controller
        .create_or_update_booking(&id, booking("Milo", "2023-12-28", "2024-01-01"))
        .unwrap();
    flaky.fail_writes_to(keys::BOOKING_HISTORY);

    let report = h.controller.expire_overdue(date("2024-01-02"));

    assert_eq!(report.expired_slots, vec![id.clone()]);
    assert!(report.failed(SideEffect::HistoryAppend));
    assert!(!report.failed(SideEffect::CalendarDelete));
    assert!(!h.controller.inventory().slot(&id).unwrap().is_occupied());
}

#[test]
fn scan_still_archives_when_calendar_removal_fails() {
    let flaky = Rc::new(FlakyStore::new());
    let mut h = harness_on(flaky.clone(), "2024-01-02");
    let id = slot_id(&h.controller, SizeClass::Small, 0);
    let stay = booking("Milo", "2023-12-28", "2024-01-01");
    let event_id = h
        .controller
        .create_or_update_booking(&id, stay.clone())
        .unwrap()
        .linked_event_id
        .unwrap();
    flaky.fail_writes_to(keys::CALENDAR_EVENTS);

    let report = h.controller.expire_overdue(date("2024-01-02"));

    assert_eq!(report.expired_slots, vec![id.clone()]);
    assert!(report.failed(SideEffect::CalendarDelete));
    assert!(!report.failed(SideEffect::HistoryAppend));
    assert!(!report.failed(SideEffect::SlotPersist));
    assert!(!h.controller.inventory().slot(&id).unwrap().is_occupied());

    let persisted: Vec<HistoryRecord> = load_json(flaky.as_ref(), keys::BOOKING_HISTORY)
        .unwrap()
        .unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].booking, stay);
    assert_eq!(persisted[0].completed_date, date("2024-01-02"));
    assert_eq!(persisted[0].calendar_event_id.as_deref(), Some(event_id.as_str()));

    let slots: Vec<KennelSlot> = load_json(flaky.as_ref(), keys::SMALL_KENNELS)
        .unwrap()
        .unwrap();
    assert!(!slots[0].is_occupied());
    assert!(h.controller.calendar().find_event(&event_id).unwrap().is_some());
}

#[test]
fn scan_once_skips_while_controller_is_borrowed() {
    let h = harness("2024-01-02");
    let controller = Rc::new(RefCell::new(h.controller));
    let scanner = ExpirationScanner::new(Rc::clone(&controller), Duration::from_secs(60));

    let guard = controller.borrow();
    assert!(scanner.scan_once().is_none());
    drop(guard);

    assert!(scanner.scan_once().unwrap().is_noop());
}

#[tokio::test(start_paused = true)]
async fn scheduled_scanner_runs_immediately_then_periodically_until_cancelled() {
    let Harness {
        clock, controller, ..
    } = harness("2024-01-02");
    let controller = Rc::new(RefCell::new(controller));
    let first = slot_id(&controller.borrow(), SizeClass::Small, 0);
    let second = slot_id(&controller.borrow(), SizeClass::Small, 1);
    let third = slot_id(&controller.borrow(), SizeClass::Small, 2);
    controller
        .borrow_mut()
        .create_or_update_booking(&first, booking("Milo", "2023-12-28", "2024-01-01"))
        .unwrap();

    let local = LocalSet::new();
    local
        .run_until(async {
            let handle = ExpirationScanner::new(Rc::clone(&controller), Duration::from_secs(60))
                .spawn(&local);

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(!controller.borrow().inventory().slot(&first).unwrap().is_occupied());

            controller
                .borrow_mut()
                .create_or_update_booking(&second, booking("Pip", "2024-01-02", "2024-01-03"))
                .unwrap();
            clock.set(date("2024-01-03"));
            tokio::time::sleep(Duration::from_secs(61)).await;
            assert!(!controller.borrow().inventory().slot(&second).unwrap().is_occupied());

            handle.shutdown().await;

            controller
                .borrow_mut()
                .create_or_update_booking(&third, booking("Ace", "2024-01-02", "2024-01-03"))
                .unwrap();
            tokio::time::sleep(Duration::from_secs(300)).await;
            assert!(controller.borrow().inventory().slot(&third).unwrap().is_occupied());
        })
        .await;

    let history = controller.borrow().history().list_recent().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].completed_date, date("2024-01-03"));
    assert_eq!(history[1].completed_date, date("2024-01-02"));
}

#[test]
fn scanner_spawned_before_the_runtime_starts_runs_once_driven() {
    let Harness { controller, .. } = harness("2024-01-02");
    let controller = Rc::new(RefCell::new(controller));
    let id = slot_id(&controller.borrow(), SizeClass::Large, 0);
    controller
        .borrow_mut()
        .create_or_update_booking(&id, booking("Bruno", "2023-12-30", "2024-01-01"))
        .unwrap();

    let local = LocalSet::new();
    let handle = ExpirationScanner::new(Rc::clone(&controller), Duration::from_secs(60))
        .spawn(&local);
    assert!(controller.borrow().inventory().slot(&id).unwrap().is_occupied());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap();
    runtime.block_on(local.run_until(async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.shutdown().await;
    }));

    assert!(!controller.borrow().inventory().slot(&id).unwrap().is_occupied());
}
