use crate::helpers::{opening_day, spawn_library, TestLibrary};
use chrono::Duration;
use claim::{assert_matches, assert_none, assert_ok, assert_ok_eq, assert_some};
use elibrary::domain::{Borrowing, NewNotification, NotificationKind};
use elibrary::store::{LendingStore, StoreError};
use rust_decimal::Decimal;
use uuid::Uuid;

fn open_borrowing(library: &TestLibrary) -> Borrowing {
    let book_id = library.book("Imago", 1);
    let borrowing = Borrowing::open(
        Uuid::new_v4(),
        book_id,
        opening_day(),
        opening_day() + Duration::days(30),
    );
    let mut tx = library.store.begin().unwrap();
    tx.insert_borrowing(&borrowing).unwrap();
    tx.commit().unwrap();
    borrowing
}

#[test]
fn dropping_a_transaction_rolls_back_its_writes() {
    let library = spawn_library();
    let book_id = library.book("Imago", 1);
    let borrowing = Borrowing::open(
        Uuid::new_v4(),
        book_id,
        opening_day(),
        opening_day() + Duration::days(30),
    );

    {
        let mut tx = library.store.begin().unwrap();
        assert_ok!(tx.insert_borrowing(&borrowing));
        assert_ok!(tx.set_copies_available(book_id, 0));
    }

    let mut tx = library.store.begin().unwrap();
    assert_none!(tx.find_borrowing(borrowing.id, borrowing.user_id).unwrap());
    assert_eq!(library.copies_available(book_id), 1);
}

#[test]
fn a_second_unreturned_borrowing_of_the_same_book_is_a_conflict() {
    let library = spawn_library();
    let first = open_borrowing(&library);
    let second = Borrowing::open(first.user_id, first.book_id, opening_day(), first.due_at);

    let mut tx = library.store.begin().unwrap();

    assert_matches!(tx.insert_borrowing(&second), Err(StoreError::Conflict(_)));
}

#[test]
fn keyed_notifications_are_inserted_once() {
    let library = spawn_library();
    let borrowing = open_borrowing(&library);
    let notice = NewNotification {
        user_id: borrowing.user_id,
        kind: NotificationKind::DueSoon,
        title: "Due soon".into(),
        message: "Imago is due in two days.".into(),
        borrowing_id: Some(borrowing.id),
        created_at: opening_day(),
    };

    let mut tx = library.store.begin().unwrap();
    assert_ok_eq!(tx.insert_notification(notice.clone()), true);
    assert_ok_eq!(tx.insert_notification(notice), false);
    assert_ok!(tx.commit());

    assert_eq!(library.notification_count(borrowing.user_id), 1);
}

#[test]
fn a_fine_computed_before_a_return_does_not_reopen_the_borrowing() {
    let library = spawn_library();
    let borrowing = open_borrowing(&library);
    let stale = Borrowing {
        fine_amount: Decimal::new(150, 2),
        fine_paid: false,
        ..borrowing.clone()
    };
    let returned = Borrowing {
        returned_at: Some(borrowing.due_at),
        ..borrowing.clone()
    };

    let mut tx = library.store.begin().unwrap();
    assert_ok_eq!(tx.record_return(&returned), true);
    assert_ok!(tx.commit());
    let mut tx = library.store.begin().unwrap();
    assert_ok_eq!(tx.record_fine(&stale), false);
    assert_ok_eq!(tx.record_return(&returned), false);
    assert_ok!(tx.commit());

    let mut tx = library.store.begin().unwrap();
    let stored = assert_some!(tx.find_borrowing(borrowing.id, borrowing.user_id).unwrap());
    assert_eq!(stored.borrowing.returned_at, Some(borrowing.due_at));
    assert_eq!(stored.borrowing.fine_amount, Decimal::ZERO);
    assert!(stored.borrowing.fine_paid);
}

#[test]
fn an_outstanding_fine_is_settled_once() {
    let library = spawn_library();
    let borrowing = open_borrowing(&library);
    let fined = Borrowing {
        fine_amount: Decimal::new(250, 2),
        fine_paid: false,
        ..borrowing.clone()
    };

    let mut tx = library.store.begin().unwrap();
    assert_ok_eq!(tx.record_fine(&fined), true);
    assert_ok_eq!(tx.settle_fine(borrowing.id), Some(Decimal::new(250, 2)));
    assert_ok_eq!(tx.settle_fine(borrowing.id), None);
}
