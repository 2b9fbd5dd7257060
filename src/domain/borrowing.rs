use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One loan of one book copy to one user. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrowing {
    pub id: Uuid,
    pub book_id: i32,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Decimal,
    pub fine_paid: bool,
}

impl Borrowing {
    pub fn open(user_id: Uuid, book_id: i32, borrowed_at: DateTime<Utc>, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            borrowed_at,
            due_at,
            returned_at: None,
            fine_amount: Decimal::ZERO,
            fine_paid: true,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned() && self.due_at < now
    }

    pub fn has_unpaid_fine(&self) -> bool {
        self.fine_amount > Decimal::ZERO && !self.fine_paid
    }
}

/// A borrowing joined with the catalogue fields the lending views display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingDetails {
    pub borrowing: Borrowing,
    pub book_title: String,
    pub book_author: Option<String>,
}
