mod book;
mod borrower;
mod borrowing;
mod notification;

pub use book::Book;
pub use borrower::Borrower;
pub use borrowing::{Borrowing, BorrowingDetails};
pub use notification::{NewNotification, Notification, NotificationKind};
