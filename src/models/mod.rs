mod book;
mod borrowing;
mod notification;

pub use book::*;
pub use borrowing::*;
pub use notification::*;
