use crate::helpers::{opening_day, spawn_library};
use chrono::Duration;
use claim::{assert_matches, assert_ok};
use elibrary::lending::LendingError;
use rust_decimal::Decimal;

#[test]
fn a_late_return_frees_the_copy_and_leaves_a_fine_to_pay() {
    // Arrange
    let library = spawn_library();
    let reader = library.subscriber(90);
    let book_id = library.book("Kindred", 1);

    // Act
    let receipt = assert_ok!(library.service.borrow(&reader, book_id));
    assert_eq!(library.copies_available(book_id), 0);
    library.clock.set(receipt.due_at + Duration::days(3));
    let returned = assert_ok!(library.service.return_book(reader.user_id, receipt.borrowing_id));

    // Assert
    assert!(returned.fine_amount > Decimal::ZERO);
    assert!(!returned.fine_paid);
    assert_eq!(library.copies_available(book_id), 1);
    let history = assert_ok!(library.service.list_history(reader.user_id));
    assert_eq!(history.len(), 1);
    assert!(history[0].was_overdue);
    assert_eq!(history[0].returned_at, Some(receipt.due_at + Duration::days(3)));

    let payment = assert_ok!(library.service.pay_all_fines(reader.user_id));
    assert_eq!(payment.paid, returned.fine_amount);
    let summary = assert_ok!(library.service.fine_summary(reader.user_id));
    assert_eq!(summary.count, 0);
    // Borrowed, Fine and the payment receipt.
    assert_eq!(library.notification_count(reader.user_id), 3);
}

#[test]
fn two_concurrent_returns_give_the_copy_back_once() {
    let library = spawn_library();
    let reader = library.subscriber(90);
    let book_id = library.book("Parable of the Sower", 2);
    let receipt = assert_ok!(library.service.borrow(&reader, book_id));
    library.clock.set(opening_day() + Duration::days(5));

    let outcomes = std::thread::scope(|s| {
        let returns: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(|| {
                    library
                        .service
                        .return_book(reader.user_id, receipt.borrowing_id)
                })
            })
            .collect();
        returns
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Err(LendingError::AlreadyReturned))));
    assert_eq!(library.copies_available(book_id), 2);
}

#[test]
fn a_sweep_racing_a_return_cannot_reopen_the_borrowing() {
    let library = spawn_library();
    let reader = library.subscriber(90);
    let book_id = library.book("Dawn", 1);
    let receipt = assert_ok!(library.service.borrow(&reader, book_id));
    library.clock.set(receipt.due_at + Duration::days(2));

    std::thread::scope(|s| {
        let sweep = s.spawn(|| library.service.sweep_fines(reader.user_id));
        let returned = s.spawn(|| library.service.return_book(reader.user_id, receipt.borrowing_id));
        assert_ok!(sweep.join().unwrap());
        assert_ok!(returned.join().unwrap());
    });

    let history = assert_ok!(library.service.list_history(reader.user_id));
    assert!(history[0].returned_at.is_some());
    assert_eq!(library.copies_available(book_id), 1);
    assert_matches!(
        library.service.return_book(reader.user_id, receipt.borrowing_id),
        Err(LendingError::AlreadyReturned)
    );
}

#[test]
fn books_with_very_long_titles_can_be_borrowed_and_returned() {
    let library = spawn_library();
    let reader = library.subscriber(90);
    let title = "A Very Long Title ".repeat(60);
    let book_id = library.book(&title, 1);

    let receipt = assert_ok!(library.service.borrow(&reader, book_id));
    assert_ok!(library.service.return_book(reader.user_id, receipt.borrowing_id));

    assert_eq!(library.notification_count(reader.user_id), 2);
}

#[test]
fn a_second_loan_of_the_same_book_is_refused() {
    let library = spawn_library();
    let reader = library.subscriber(90);
    let book_id = library.book("Wild Seed", 3);

    assert_ok!(library.service.borrow(&reader, book_id));

    assert_matches!(
        library.service.borrow(&reader, book_id),
        Err(LendingError::AlreadyBorrowed)
    );
    assert_eq!(library.copies_available(book_id), 2);
}
