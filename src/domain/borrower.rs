use uuid::Uuid;

/// The caller of a lending operation as seen by the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borrower {
    pub user_id: Uuid,
    /// Cleared for staff accounts; they manage the collection but do not borrow from it.
    pub may_borrow: bool,
}

impl Borrower {
    pub fn patron(user_id: Uuid) -> Self {
        Self {
            user_id,
            may_borrow: true,
        }
    }
}
