mod borrowings;
mod errors;
mod fines;
pub mod health_check;
mod notifications;

pub use borrowings::*;
pub use errors::*;
pub use fines::*;
pub use health_check::*;
pub use notifications::*;
