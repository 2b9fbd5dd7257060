use crate::domain::Notification;
use crate::guards::AuthenticatedUser;
use crate::lending::LendingError;
use crate::notifications::NotificationInbox;
use crate::routes::run_blocking;
use chrono::{DateTime, Utc};
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use uuid::Uuid;

#[derive(FromForm, Debug)]
pub struct InboxQuery {
    #[field(name = "unreadOnly")]
    unread_only: Option<bool>,
    limit: Option<i64>,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub borrowing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub is_read: bool,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind.as_str(),
            title: n.title,
            message: n.message,
            borrowing_id: n.borrowing_id,
            created_at: n.created_at,
            is_read: n.read_at.is_some(),
            read_at: n.read_at,
        }
    }
}

#[derive(serde::Serialize, Debug)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(serde::Serialize, Debug)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

#[tracing::instrument(name = "List notifications", skip(user, inbox), fields(user_id = %user.user_id))]
#[get("/notifications?<query..>")]
pub async fn list_notifications(
    query: InboxQuery,
    user: AuthenticatedUser,
    inbox: &State<Arc<NotificationInbox>>,
) -> Result<Json<Vec<NotificationView>>, LendingError> {
    let inbox = inbox.inner().clone();
    let user_id = user.user_id;
    let notifications = run_blocking(move || {
        inbox.list(user_id, query.unread_only.unwrap_or(false), query.limit)
    })
    .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(name = "Count notifications", skip(user, inbox), fields(user_id = %user.user_id))]
#[get("/notifications/count?<query..>")]
pub async fn count_notifications(
    query: InboxQuery,
    user: AuthenticatedUser,
    inbox: &State<Arc<NotificationInbox>>,
) -> Result<Json<CountResponse>, LendingError> {
    let inbox = inbox.inner().clone();
    let user_id = user.user_id;
    let count =
        run_blocking(move || inbox.count(user_id, query.unread_only.unwrap_or(false))).await?;
    Ok(Json(CountResponse { count }))
}

#[tracing::instrument(name = "Mark notification read", skip(user, inbox), fields(user_id = %user.user_id))]
#[post("/notifications/<notification_id>/read")]
pub async fn mark_notification_read(
    notification_id: Uuid,
    user: AuthenticatedUser,
    inbox: &State<Arc<NotificationInbox>>,
) -> Result<(), LendingError> {
    let inbox = inbox.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || inbox.mark_read(user_id, notification_id)).await
}

#[tracing::instrument(name = "Mark all notifications read", skip(user, inbox), fields(user_id = %user.user_id))]
#[post("/notifications/read-all")]
pub async fn mark_all_notifications_read(
    user: AuthenticatedUser,
    inbox: &State<Arc<NotificationInbox>>,
) -> Result<Json<MarkAllReadResponse>, LendingError> {
    let inbox = inbox.inner().clone();
    let user_id = user.user_id;
    let updated = run_blocking(move || inbox.mark_all_read(user_id)).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
