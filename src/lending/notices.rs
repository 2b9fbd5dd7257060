use crate::domain::{Borrowing, NewNotification, NotificationKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn about(
    borrowing: &Borrowing,
    kind: NotificationKind,
    title: &str,
    message: String,
    now: DateTime<Utc>,
) -> NewNotification {
    NewNotification {
        user_id: borrowing.user_id,
        kind,
        title: title.to_string(),
        message,
        borrowing_id: Some(borrowing.id),
        created_at: now,
    }
}

pub fn borrowed(borrowing: &Borrowing, book_title: &str, now: DateTime<Utc>) -> NewNotification {
    about(
        borrowing,
        NotificationKind::Borrowed,
        "Book borrowed",
        format!(
            "You borrowed \"{}\". Please return it by {}.",
            book_title,
            format_instant(borrowing.due_at)
        ),
        now,
    )
}

pub fn returned(borrowing: &Borrowing, book_title: &str, now: DateTime<Utc>) -> NewNotification {
    about(
        borrowing,
        NotificationKind::Returned,
        "Book returned",
        format!("Thank you for returning \"{}\" on time.", book_title),
        now,
    )
}

pub fn fined(
    borrowing: &Borrowing,
    book_title: &str,
    overdue_days: i64,
    now: DateTime<Utc>,
) -> NewNotification {
    about(
        borrowing,
        NotificationKind::Fine,
        "Overdue fine",
        format!(
            "\"{}\" was returned {} day(s) late. A fine of {:.2} is due.",
            book_title, overdue_days, borrowing.fine_amount
        ),
        now,
    )
}

pub fn due_soon(borrowing: &Borrowing, book_title: &str, now: DateTime<Utc>) -> NewNotification {
    about(
        borrowing,
        NotificationKind::DueSoon,
        "Return date approaching",
        format!(
            "\"{}\" is due on {}.",
            book_title,
            format_instant(borrowing.due_at)
        ),
        now,
    )
}

pub fn overdue(borrowing: &Borrowing, book_title: &str, now: DateTime<Utc>) -> NewNotification {
    about(
        borrowing,
        NotificationKind::Overdue,
        "Book overdue",
        format!(
            "\"{}\" was due on {}. A fine accrues for every day until it is returned.",
            book_title,
            format_instant(borrowing.due_at)
        ),
        now,
    )
}

pub fn fines_paid(user_id: Uuid, total: Decimal, now: DateTime<Utc>) -> NewNotification {
    NewNotification {
        user_id,
        kind: NotificationKind::Info,
        title: "Fines paid".to_string(),
        message: format!("You paid fines totalling {:.2}.", total),
        borrowing_id: None,
        created_at: now,
    }
}
