use crate::domain::{NewNotification, Notification, NotificationKind};
use crate::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Debug)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub borrowing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = String;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: NotificationKind::try_from(row.kind)?,
            title: row.title,
            message: row.message,
            borrowing_id: row.borrowing_id,
            created_at: row.created_at,
            read_at: row.read_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub borrowing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewNotificationRow<'a> {
    pub fn new(id: Uuid, notification: &'a NewNotification) -> Self {
        NewNotificationRow {
            id,
            user_id: notification.user_id,
            kind: notification.kind.as_str(),
            title: &notification.title,
            message: &notification.message,
            borrowing_id: notification.borrowing_id,
            created_at: notification.created_at,
        }
    }
}
