//! The persistence boundary of the lending core.
//!
//! Every lending operation opens exactly one transaction through
//! [`LendingStore::begin`], works against the returned [`LendingTx`] and either
//! commits it or drops it. Dropping an uncommitted transaction rolls it back.
mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{establish_connection_pool, run_migrations, DbPool, PgStore};

use crate::domain::{Book, Borrowing, BorrowingDetails, NewNotification, Notification};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to get a connection from the pool.")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("A database query failed.")]
    Query(#[from] diesel::result::Error),
    #[error("A uniqueness constraint was violated: {0}")]
    Conflict(String),
    #[error("Stored data could not be read back: {0}")]
    Corrupt(String),
    #[error("The in-memory store was poisoned by a panicking writer.")]
    Poisoned,
}

pub trait LendingStore: Send + Sync {
    fn begin(&self) -> Result<Box<dyn LendingTx + '_>, StoreError>;
}

/// One open transaction. Reads observe the transaction's own writes.
pub trait LendingTx {
    /// Latest end date among the user's subscriptions that are flagged active and end after `now`.
    fn active_subscription_end(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Reads a book and holds a write lock on it until the transaction ends.
    fn lock_book(&mut self, book_id: i32) -> Result<Option<Book>, StoreError>;

    fn set_copies_available(&mut self, book_id: i32, copies: i32) -> Result<(), StoreError>;

    /// All borrowings of a user, newest first.
    fn borrowings_for_user(&mut self, user_id: Uuid) -> Result<Vec<BorrowingDetails>, StoreError>;

    fn find_borrowing(
        &mut self,
        borrowing_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BorrowingDetails>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the user already has this book out.
    fn insert_borrowing(&mut self, borrowing: &Borrowing) -> Result<(), StoreError>;

    /// Persists `returned_at`, `fine_amount` and `fine_paid` only if the stored
    /// borrowing is still unreturned. Returns `false` when another return got there first.
    fn record_return(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError>;

    /// Persists `fine_amount` and `fine_paid` of a borrowing that is still unreturned.
    /// A borrowing returned in the meantime is left untouched and yields `false`.
    fn record_fine(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError>;

    /// Marks an outstanding fine paid and returns the amount settled, if any was outstanding.
    fn settle_fine(&mut self, borrowing_id: Uuid) -> Result<Option<Decimal>, StoreError>;

    /// Returns `false` when a notification with the same key already exists.
    fn insert_notification(&mut self, notification: NewNotification) -> Result<bool, StoreError>;

    /// Newest first.
    fn notifications_for_user(
        &mut self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError>;

    fn count_notifications(&mut self, user_id: Uuid, unread_only: bool) -> Result<i64, StoreError>;

    /// Sets `read_at` unless it is already set. Returns `false` if the user has no such notification.
    fn mark_notification_read(
        &mut self,
        user_id: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    fn mark_all_notifications_read(
        &mut self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
