use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Borrowed,
    Returned,
    Fine,
    DueSoon,
    Overdue,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Borrowed => "Borrowed",
            NotificationKind::Returned => "Returned",
            NotificationKind::Fine => "Fine",
            NotificationKind::DueSoon => "DueSoon",
            NotificationKind::Overdue => "Overdue",
            NotificationKind::Info => "Info",
        }
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "Borrowed" => Ok(Self::Borrowed),
            "Returned" => Ok(Self::Returned),
            "Fine" => Ok(Self::Fine),
            "DueSoon" => Ok(Self::DueSoon),
            "Overdue" => Ok(Self::Overdue),
            "Info" => Ok(Self::Info),
            other => Err(format!("{} is not a known notification type.", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub borrowing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A notification that has not been written yet.
///
/// When `borrowing_id` is set the sink keeps at most one notification per
/// `(user_id, kind, borrowing_id)`; a second insert for the same key is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub borrowing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            borrowing_id: self.borrowing_id,
            created_at: self.created_at,
            read_at: None,
        }
    }

    pub fn same_key(&self, existing: &Notification) -> bool {
        self.borrowing_id.is_some()
            && existing.user_id == self.user_id
            && existing.kind == self.kind
            && existing.borrowing_id == self.borrowing_id
    }
}
