use crate::domain::{Borrowing, BorrowingDetails};
use crate::schema::borrowings;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Queryable, Debug)]
pub struct BorrowingRow {
    pub id: Uuid,
    pub book_id: i32,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Decimal,
    pub fine_paid: bool,
}

impl From<BorrowingRow> for Borrowing {
    fn from(row: BorrowingRow) -> Self {
        Borrowing {
            id: row.id,
            book_id: row.book_id,
            user_id: row.user_id,
            borrowed_at: row.borrowed_at,
            due_at: row.due_at,
            returned_at: row.returned_at,
            fine_amount: row.fine_amount,
            fine_paid: row.fine_paid,
        }
    }
}

/// A borrowing row joined with the title and author of its book.
pub type BorrowingWithBookRow = (BorrowingRow, String, Option<String>);

pub fn into_details((row, book_title, book_author): BorrowingWithBookRow) -> BorrowingDetails {
    BorrowingDetails {
        borrowing: row.into(),
        book_title,
        book_author,
    }
}

#[derive(Insertable)]
#[diesel(table_name = borrowings)]
pub struct NewBorrowingRow {
    pub id: Uuid,
    pub book_id: i32,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Decimal,
    pub fine_paid: bool,
}

impl From<&Borrowing> for NewBorrowingRow {
    fn from(borrowing: &Borrowing) -> Self {
        NewBorrowingRow {
            id: borrowing.id,
            book_id: borrowing.book_id,
            user_id: borrowing.user_id,
            borrowed_at: borrowing.borrowed_at,
            due_at: borrowing.due_at,
            returned_at: borrowing.returned_at,
            fine_amount: borrowing.fine_amount,
            fine_paid: borrowing.fine_paid,
        }
    }
}
