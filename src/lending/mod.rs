//! Lending rules: who may borrow, what a late return costs, and the
//! transactional operations that apply them.
mod eligibility;
mod error;
mod fines;
mod notices;
mod policy;
mod service;

pub use eligibility::{EligibilityGrant, Ineligibility};
pub use error::{error_chain_fmt, LendingError};
pub use fines::started_days;
pub use policy::LendingPolicy;
pub use service::{
    ActiveBorrowing, BorrowReceipt, BorrowingService, FinePayment, FineSummary, HistoryEntry,
    ReturnReceipt,
};
