use crate::domain::{Book, Borrowing, BorrowingDetails, NewNotification, Notification};
use crate::store::{LendingStore, LendingTx, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Subscription {
    user_id: Uuid,
    ends_at: DateTime<Utc>,
    is_active: bool,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    books: BTreeMap<i32, Book>,
    subscriptions: Vec<Subscription>,
    borrowings: Vec<Borrowing>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn details(&self, borrowing: &Borrowing) -> Result<BorrowingDetails, StoreError> {
        let book = self.books.get(&borrowing.book_id).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "borrowing {} references missing book {}",
                borrowing.id, borrowing.book_id
            ))
        })?;
        Ok(BorrowingDetails {
            borrowing: borrowing.clone(),
            book_title: book.title.clone(),
            book_author: book.author.clone(),
        })
    }
}

/// A process-local store.
///
/// Transactions hold one mutex for their whole lifetime, so they run strictly
/// one after another. Writes go to a private copy that replaces the shared
/// tables on commit.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Adds a book to the catalogue with all copies on the shelf.
    pub fn add_book(
        &self,
        title: &str,
        author: Option<&str>,
        copies: i32,
    ) -> Result<Book, StoreError> {
        let mut tables = self.lock()?;
        let id = tables.books.keys().next_back().map_or(1, |last| last + 1);
        let book = Book {
            id,
            title: title.to_string(),
            author: author.map(str::to_string),
            copies_total: copies,
            copies_available: copies,
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    pub fn add_subscription(
        &self,
        user_id: Uuid,
        ends_at: DateTime<Utc>,
        is_active: bool,
    ) -> Result<(), StoreError> {
        self.lock()?.subscriptions.push(Subscription {
            user_id,
            ends_at,
            is_active,
        });
        Ok(())
    }

    pub fn book(&self, book_id: i32) -> Result<Option<Book>, StoreError> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    pub fn borrowings(&self) -> Result<Vec<Borrowing>, StoreError> {
        Ok(self.lock()?.borrowings.clone())
    }

    pub fn notifications(&self) -> Result<Vec<Notification>, StoreError> {
        Ok(self.lock()?.notifications.clone())
    }
}

impl LendingStore for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn LendingTx + '_>, StoreError> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx { guard, working }))
    }
}

struct InMemoryTx<'a> {
    guard: MutexGuard<'a, Tables>,
    working: Tables,
}

impl InMemoryTx<'_> {
    fn user_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> impl Iterator<Item = &Notification> {
        self.working
            .notifications
            .iter()
            .filter(move |n| n.user_id == user_id && (!unread_only || n.read_at.is_none()))
    }

    fn stored_borrowing(&mut self, borrowing_id: Uuid) -> Result<&mut Borrowing, StoreError> {
        self.working
            .borrowings
            .iter_mut()
            .find(|b| b.id == borrowing_id)
            .ok_or_else(|| StoreError::Corrupt(format!("borrowing {} does not exist", borrowing_id)))
    }
}

impl LendingTx for InMemoryTx<'_> {
    fn active_subscription_end(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active && s.ends_at > now)
            .map(|s| s.ends_at)
            .max())
    }

    fn lock_book(&mut self, book_id: i32) -> Result<Option<Book>, StoreError> {
        Ok(self.working.books.get(&book_id).cloned())
    }

    fn set_copies_available(&mut self, book_id: i32, copies: i32) -> Result<(), StoreError> {
        let book = self
            .working
            .books
            .get_mut(&book_id)
            .ok_or_else(|| StoreError::Corrupt(format!("book {} does not exist", book_id)))?;
        book.copies_available = copies;
        Ok(())
    }

    fn borrowings_for_user(&mut self, user_id: Uuid) -> Result<Vec<BorrowingDetails>, StoreError> {
        let mut found = self
            .working
            .borrowings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| self.working.details(b))
            .collect::<Result<Vec<_>, _>>()?;
        found.sort_by(|a, b| b.borrowing.borrowed_at.cmp(&a.borrowing.borrowed_at));
        Ok(found)
    }

    fn find_borrowing(
        &mut self,
        borrowing_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BorrowingDetails>, StoreError> {
        self.working
            .borrowings
            .iter()
            .find(|b| b.id == borrowing_id && b.user_id == user_id)
            .map(|b| self.working.details(b))
            .transpose()
    }

    fn insert_borrowing(&mut self, borrowing: &Borrowing) -> Result<(), StoreError> {
        let duplicate = self.working.borrowings.iter().any(|b| {
            !b.is_returned() && b.user_id == borrowing.user_id && b.book_id == borrowing.book_id
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "user {} already has book {} out",
                borrowing.user_id, borrowing.book_id
            )));
        }
        self.working.borrowings.push(borrowing.clone());
        Ok(())
    }

    fn record_return(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError> {
        let stored = self.stored_borrowing(borrowing.id)?;
        if stored.is_returned() {
            return Ok(false);
        }
        stored.returned_at = borrowing.returned_at;
        stored.fine_amount = borrowing.fine_amount;
        stored.fine_paid = borrowing.fine_paid;
        Ok(true)
    }

    fn record_fine(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError> {
        let stored = self.stored_borrowing(borrowing.id)?;
        if stored.is_returned() {
            return Ok(false);
        }
        stored.fine_amount = borrowing.fine_amount;
        stored.fine_paid = borrowing.fine_paid;
        Ok(true)
    }

    fn settle_fine(&mut self, borrowing_id: Uuid) -> Result<Option<Decimal>, StoreError> {
        let stored = self.stored_borrowing(borrowing_id)?;
        if !stored.has_unpaid_fine() {
            return Ok(None);
        }
        stored.fine_paid = true;
        Ok(Some(stored.fine_amount))
    }

    fn insert_notification(&mut self, notification: NewNotification) -> Result<bool, StoreError> {
        if self
            .working
            .notifications
            .iter()
            .any(|existing| notification.same_key(existing))
        {
            return Ok(false);
        }
        self.working
            .notifications
            .push(notification.into_notification());
        Ok(true)
    }

    fn notifications_for_user(
        &mut self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut found: Vec<Notification> =
            self.user_notifications(user_id, unread_only).cloned().collect();
        // Stable sort keeps insertion order for equal timestamps; reverse it so newer inserts come first.
        found.reverse();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    fn count_notifications(&mut self, user_id: Uuid, unread_only: bool) -> Result<i64, StoreError> {
        let count = self.user_notifications(user_id, unread_only).count();
        i64::try_from(count).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn mark_notification_read(
        &mut self,
        user_id: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        match self
            .working
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read_at.get_or_insert(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn mark_all_notifications_read(
        &mut self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut updated = 0;
        for notification in self
            .working
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
        {
            notification.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
