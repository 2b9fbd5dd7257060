use crate::clock::Clock;
use crate::domain::{Borrower, Borrowing, BorrowingDetails};
use crate::lending::{notices, started_days, EligibilityGrant, LendingError, LendingPolicy};
use crate::store::{LendingStore, LendingTx, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BorrowReceipt {
    pub borrowing_id: Uuid,
    pub due_at: DateTime<Utc>,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnReceipt {
    pub fine_amount: Decimal,
    pub fine_paid: bool,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBorrowing {
    pub borrowing_id: Uuid,
    pub book_id: i32,
    pub title: String,
    pub author: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub is_overdue: bool,
    pub days_left: i64,
    pub overdue_days: i64,
    pub fine_amount: Decimal,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub borrowing_id: Uuid,
    pub book_id: i32,
    pub title: String,
    pub author: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Decimal,
    pub fine_paid: bool,
    pub was_overdue: bool,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FineSummary {
    pub count: usize,
    pub total: Decimal,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinePayment {
    pub paid: Decimal,
}

/// Decides who may borrow what, records loans and returns, and keeps fines current.
pub struct BorrowingService {
    store: Arc<dyn LendingStore>,
    clock: Arc<dyn Clock>,
    policy: LendingPolicy,
}

impl BorrowingService {
    pub fn new(store: Arc<dyn LendingStore>, clock: Arc<dyn Clock>, policy: LendingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    #[tracing::instrument(
        name = "Check borrowing eligibility",
        skip(self, borrower),
        fields(user_id = %borrower.user_id)
    )]
    pub fn check_eligibility(&self, borrower: &Borrower) -> Result<EligibilityGrant, LendingError> {
        if !borrower.may_borrow {
            return Err(LendingError::BorrowingNotPermitted);
        }
        let user_id = borrower.user_id;
        let now = self.clock.now();
        self.sweep_fines_at(user_id, now)?;

        let mut tx = self.store.begin()?;
        let borrowings = tx.borrowings_for_user(user_id)?;
        let subscription_ends_at = tx.active_subscription_end(user_id, now)?;
        let grant = self
            .policy
            .evaluate_eligibility(&borrowings, subscription_ends_at, now)?;
        Ok(grant)
    }

    #[tracing::instrument(
        name = "Borrow a book",
        skip(self, borrower),
        fields(user_id = %borrower.user_id)
    )]
    pub fn borrow(&self, borrower: &Borrower, book_id: i32) -> Result<BorrowReceipt, LendingError> {
        if !borrower.may_borrow {
            return Err(LendingError::BorrowingNotPermitted);
        }
        let user_id = borrower.user_id;
        let now = self.clock.now();
        self.sweep_fines_at(user_id, now)?;

        let mut tx = self.store.begin()?;
        // Taken first so concurrent borrows of this book queue up behind us.
        let book = tx.lock_book(book_id)?;
        let borrowings = tx.borrowings_for_user(user_id)?;
        let subscription_ends_at = tx.active_subscription_end(user_id, now)?;

        let grant = self
            .policy
            .evaluate_eligibility(&borrowings, subscription_ends_at, now)?;
        if borrowings
            .iter()
            .any(|b| b.borrowing.book_id == book_id && !b.borrowing.is_returned())
        {
            return Err(LendingError::AlreadyBorrowed);
        }
        let book = book.ok_or(LendingError::BookNotFound)?;
        if !book.has_copy_on_shelf() {
            return Err(LendingError::NoCopiesAvailable);
        }

        let due_at = (now + self.policy.loan_period()).min(grant.subscription_ends_at);
        if due_at <= now {
            return Err(LendingError::SubscriptionExpiring);
        }

        let borrowing = Borrowing::open(user_id, book.id, now, due_at);
        tx.set_copies_available(book.id, book.copies_available - 1)?;
        tx.insert_borrowing(&borrowing).map_err(|e| match e {
            StoreError::Conflict(_) => LendingError::AlreadyBorrowed,
            e => e.into(),
        })?;
        tx.insert_notification(notices::borrowed(&borrowing, &book.title, now))?;
        tx.commit()?;

        tracing::info!(borrowing_id = %borrowing.id, %due_at, "Book borrowed");
        Ok(BorrowReceipt {
            borrowing_id: borrowing.id,
            due_at,
        })
    }

    #[tracing::instrument(name = "Return a book", skip(self))]
    pub fn return_book(
        &self,
        user_id: Uuid,
        borrowing_id: Uuid,
    ) -> Result<ReturnReceipt, LendingError> {
        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        let details = tx
            .find_borrowing(borrowing_id, user_id)?
            .ok_or(LendingError::NotFound)?;
        if details.borrowing.is_returned() {
            return Err(LendingError::AlreadyReturned);
        }

        let mut borrowing = details.borrowing;
        let returned_at = now.max(borrowing.borrowed_at);
        borrowing.returned_at = Some(returned_at);
        let fine = self.policy.compute_fine(borrowing.due_at, returned_at);
        let notice = if fine > Decimal::ZERO {
            borrowing.fine_amount = fine;
            borrowing.fine_paid = false;
            let overdue_days = started_days(returned_at - borrowing.due_at);
            notices::fined(&borrowing, &details.book_title, overdue_days, now)
        } else {
            borrowing.fine_amount = Decimal::ZERO;
            borrowing.fine_paid = true;
            notices::returned(&borrowing, &details.book_title, now)
        };
        // Claims the return first so a concurrent return of the same borrowing gives the copy back once.
        if !tx.record_return(&borrowing)? {
            return Err(LendingError::AlreadyReturned);
        }
        if let Some(book) = tx.lock_book(borrowing.book_id)? {
            tx.set_copies_available(book.id, book.copies_after_return())?;
        }
        tx.insert_notification(notice)?;
        tx.commit()?;

        tracing::info!(fine = %borrowing.fine_amount, "Book returned");
        Ok(ReturnReceipt {
            fine_amount: borrowing.fine_amount,
            fine_paid: borrowing.fine_paid,
        })
    }

    /// Recomputes fines of the user's overdue books. Returns how many records changed.
    #[tracing::instrument(name = "Sweep overdue fines", skip(self))]
    pub fn sweep_fines(&self, user_id: Uuid) -> Result<usize, LendingError> {
        self.sweep_fines_at(user_id, self.clock.now())
    }

    fn sweep_fines_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize, LendingError> {
        let mut tx = self.store.begin()?;
        let changed = self.accrue_in(tx.as_mut(), user_id, now)?;
        if changed > 0 {
            tx.commit()?;
            tracing::info!(changed, "Accrued overdue fines");
        }
        Ok(changed)
    }

    fn accrue_in(
        &self,
        tx: &mut (dyn LendingTx + '_),
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut changed = 0;
        for details in tx.borrowings_for_user(user_id)? {
            let mut borrowing = details.borrowing;
            if self.policy.accrue_fine(&mut borrowing, now) && tx.record_fine(&borrowing)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// The user's unreturned books, newest first.
    ///
    /// Reading this view also brings fines up to date and backfills the
    /// due-soon and overdue notifications it implies.
    #[tracing::instrument(name = "List active borrowings", skip(self))]
    pub fn list_active(&self, user_id: Uuid) -> Result<Vec<ActiveBorrowing>, LendingError> {
        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        self.accrue_in(tx.as_mut(), user_id, now)?;

        let active: Vec<BorrowingDetails> = tx
            .borrowings_for_user(user_id)?
            .into_iter()
            .filter(|details| !details.borrowing.is_returned())
            .collect();

        let due_soon_until = now + self.policy.due_soon_window();
        for details in &active {
            let borrowing = &details.borrowing;
            if borrowing.due_at < now {
                tx.insert_notification(notices::overdue(borrowing, &details.book_title, now))?;
            } else if borrowing.due_at > now && borrowing.due_at <= due_soon_until {
                tx.insert_notification(notices::due_soon(borrowing, &details.book_title, now))?;
            }
        }
        tx.commit()?;

        Ok(active
            .into_iter()
            .map(|details| active_view(details, now))
            .collect())
    }

    /// Every borrowing of the user, returned or not, newest first.
    #[tracing::instrument(name = "List borrowing history", skip(self))]
    pub fn list_history(&self, user_id: Uuid) -> Result<Vec<HistoryEntry>, LendingError> {
        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        Ok(tx
            .borrowings_for_user(user_id)?
            .into_iter()
            .map(|details| history_view(details, now))
            .collect())
    }

    #[tracing::instrument(name = "Summarise outstanding fines", skip(self))]
    pub fn fine_summary(&self, user_id: Uuid) -> Result<FineSummary, LendingError> {
        let now = self.clock.now();
        self.sweep_fines_at(user_id, now)?;

        let mut tx = self.store.begin()?;
        let outstanding: Vec<Decimal> = tx
            .borrowings_for_user(user_id)?
            .into_iter()
            .filter(|details| details.borrowing.has_unpaid_fine())
            .map(|details| details.borrowing.fine_amount)
            .collect();
        Ok(FineSummary {
            count: outstanding.len(),
            total: outstanding.into_iter().sum(),
        })
    }

    /// Settles every outstanding fine of the user at once.
    #[tracing::instrument(name = "Pay all fines", skip(self))]
    pub fn pay_all_fines(&self, user_id: Uuid) -> Result<FinePayment, LendingError> {
        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        let mut paid = Decimal::ZERO;
        for details in tx.borrowings_for_user(user_id)? {
            if details.borrowing.has_unpaid_fine() {
                if let Some(amount) = tx.settle_fine(details.borrowing.id)? {
                    paid += amount;
                }
            }
        }
        if paid.is_zero() {
            return Ok(FinePayment { paid });
        }
        tx.insert_notification(notices::fines_paid(user_id, paid, now))?;
        tx.commit()?;

        tracing::info!(%paid, "Fines settled");
        Ok(FinePayment { paid })
    }
}

fn active_view(details: BorrowingDetails, now: DateTime<Utc>) -> ActiveBorrowing {
    let BorrowingDetails {
        borrowing,
        book_title,
        book_author,
    } = details;
    let is_overdue = borrowing.is_overdue_at(now);
    ActiveBorrowing {
        borrowing_id: borrowing.id,
        book_id: borrowing.book_id,
        title: book_title,
        author: book_author,
        borrowed_at: borrowing.borrowed_at,
        due_at: borrowing.due_at,
        is_overdue,
        days_left: started_days(borrowing.due_at - now),
        overdue_days: started_days(now - borrowing.due_at),
        fine_amount: borrowing.fine_amount,
    }
}

fn history_view(details: BorrowingDetails, now: DateTime<Utc>) -> HistoryEntry {
    let BorrowingDetails {
        borrowing,
        book_title,
        book_author,
    } = details;
    let settled_at = borrowing.returned_at.unwrap_or(now);
    HistoryEntry {
        borrowing_id: borrowing.id,
        book_id: borrowing.book_id,
        title: book_title,
        author: book_author,
        borrowed_at: borrowing.borrowed_at,
        due_at: borrowing.due_at,
        returned_at: borrowing.returned_at,
        fine_amount: borrowing.fine_amount,
        fine_paid: borrowing.fine_paid,
        was_overdue: settled_at > borrowing.due_at,
    }
}
