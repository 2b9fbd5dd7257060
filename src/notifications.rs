use crate::clock::Clock;
use crate::domain::Notification;
use crate::lending::LendingError;
use crate::store::LendingStore;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Falls back to the default page size for missing or out-of-range limits.
pub fn page_size(requested: Option<i64>) -> i64 {
    match requested {
        Some(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => limit,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Read access to a user's notification log.
pub struct NotificationInbox {
    store: Arc<dyn LendingStore>,
    clock: Arc<dyn Clock>,
}

impl NotificationInbox {
    pub fn new(store: Arc<dyn LendingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[tracing::instrument(name = "List notifications", skip(self))]
    pub fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>, LendingError> {
        let mut tx = self.store.begin()?;
        Ok(tx.notifications_for_user(user_id, unread_only, page_size(limit))?)
    }

    #[tracing::instrument(name = "Count notifications", skip(self))]
    pub fn count(&self, user_id: Uuid, unread_only: bool) -> Result<i64, LendingError> {
        let mut tx = self.store.begin()?;
        Ok(tx.count_notifications(user_id, unread_only)?)
    }

    #[tracing::instrument(name = "Mark notification read", skip(self))]
    pub fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), LendingError> {
        let mut tx = self.store.begin()?;
        if !tx.mark_notification_read(user_id, notification_id, self.clock.now())? {
            return Err(LendingError::NotificationNotFound);
        }
        tx.commit()?;
        Ok(())
    }

    #[tracing::instrument(name = "Mark all notifications read", skip(self))]
    pub fn mark_all_read(&self, user_id: Uuid) -> Result<usize, LendingError> {
        let mut tx = self.store.begin()?;
        let updated = tx.mark_all_notifications_read(user_id, self.clock.now())?;
        tx.commit()?;
        Ok(updated)
    }
}
