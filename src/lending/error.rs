use crate::lending::Ineligibility;
use crate::store::StoreError;

#[derive(thiserror::Error)]
pub enum LendingError {
    #[error(transparent)]
    Ineligible(#[from] Ineligibility),
    #[error("You have already borrowed this book and not returned it yet.")]
    AlreadyBorrowed,
    #[error("The book was not found.")]
    BookNotFound,
    #[error("There are no copies of this book available.")]
    NoCopiesAvailable,
    #[error("Your subscription ends before a loan could start.")]
    SubscriptionExpiring,
    #[error("The borrowing record was not found.")]
    NotFound,
    #[error("This book has already been returned.")]
    AlreadyReturned,
    #[error("Staff accounts cannot borrow books.")]
    BorrowingNotPermitted,
    #[error("The notification was not found.")]
    NotificationNotFound,
    #[error("Something went wrong on our side. Please try again later.")]
    Unexpected(#[from] anyhow::Error),
}

impl LendingError {
    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            LendingError::Ineligible(reason) => reason.code(),
            LendingError::AlreadyBorrowed => "already_borrowed",
            LendingError::BookNotFound => "book_not_found",
            LendingError::NoCopiesAvailable => "no_copies_available",
            LendingError::SubscriptionExpiring => "subscription_expiring",
            LendingError::NotFound => "not_found",
            LendingError::AlreadyReturned => "already_returned",
            LendingError::BorrowingNotPermitted => "borrowing_not_permitted",
            LendingError::NotificationNotFound => "notification_not_found",
            LendingError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<StoreError> for LendingError {
    fn from(e: StoreError) -> Self {
        LendingError::Unexpected(anyhow::Error::new(e))
    }
}

impl std::fmt::Debug for LendingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
