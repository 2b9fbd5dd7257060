use crate::domain::BorrowingDetails;
use crate::lending::LendingPolicy;
use chrono::{DateTime, Utc};

/// Why a user may not take out another book right now.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    #[error("You have unpaid fines. Please settle them before borrowing again.")]
    UnpaidFines,
    #[error("You do not have an active subscription. Please subscribe to borrow books.")]
    NoActiveSubscription,
    #[error("\"{title}\" was due on {} and has not been returned yet.", .due_at.format("%Y-%m-%d %H:%M UTC"))]
    HasOverdueBook {
        title: String,
        due_at: DateTime<Utc>,
    },
    #[error("You already have the maximum number of borrowed books ({limit}).")]
    MaxActiveBorrowingsReached { limit: usize },
}

impl Ineligibility {
    pub fn code(&self) -> &'static str {
        match self {
            Ineligibility::UnpaidFines => "unpaid_fines",
            Ineligibility::NoActiveSubscription => "no_active_subscription",
            Ineligibility::HasOverdueBook { .. } => "has_overdue_book",
            Ineligibility::MaxActiveBorrowingsReached { .. } => "max_active_borrowings_reached",
        }
    }
}

/// Proof that a user passed the eligibility rules at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityGrant {
    pub subscription_ends_at: DateTime<Utc>,
}

impl LendingPolicy {
    /// Applies the borrowing preconditions in order; the first failing rule wins.
    ///
    /// `borrowings` are all of the user's borrowings, returned or not, with
    /// fines already brought up to date.
    pub fn evaluate_eligibility(
        &self,
        borrowings: &[BorrowingDetails],
        subscription_ends_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<EligibilityGrant, Ineligibility> {
        if borrowings.iter().any(|b| b.borrowing.has_unpaid_fine()) {
            return Err(Ineligibility::UnpaidFines);
        }

        let subscription_ends_at = subscription_ends_at
            .filter(|ends_at| *ends_at > now)
            .ok_or(Ineligibility::NoActiveSubscription)?;

        if let Some(overdue) = borrowings
            .iter()
            .filter(|b| b.borrowing.is_overdue_at(now))
            .min_by_key(|b| b.borrowing.due_at)
        {
            return Err(Ineligibility::HasOverdueBook {
                title: overdue.book_title.clone(),
                due_at: overdue.borrowing.due_at,
            });
        }

        let active = borrowings
            .iter()
            .filter(|b| !b.borrowing.is_returned())
            .count();
        if active >= self.max_active_borrowings {
            return Err(Ineligibility::MaxActiveBorrowingsReached {
                limit: self.max_active_borrowings,
            });
        }

        Ok(EligibilityGrant {
            subscription_ends_at,
        })
    }
}
