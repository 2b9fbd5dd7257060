use crate::guards::AuthenticatedUser;
use crate::lending::{
    ActiveBorrowing, BorrowReceipt, BorrowingService, HistoryEntry, LendingError, ReturnReceipt,
};
use crate::routes::run_blocking;
use chrono::{DateTime, Utc};
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use uuid::Uuid;

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub subscription_ends_at: DateTime<Utc>,
}

#[tracing::instrument(name = "Check eligibility", skip(user, service), fields(user_id = %user.user_id))]
#[get("/borrowings/eligibility")]
pub async fn eligibility(
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<EligibilityResponse>, LendingError> {
    let service = service.inner().clone();
    let borrower = user.as_borrower();
    let grant = run_blocking(move || service.check_eligibility(&borrower)).await?;
    Ok(Json(EligibilityResponse {
        eligible: true,
        subscription_ends_at: grant.subscription_ends_at,
    }))
}

#[tracing::instrument(name = "Borrow", skip(user, service), fields(user_id = %user.user_id))]
#[post("/borrowings/<book_id>")]
pub async fn borrow(
    book_id: i32,
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<BorrowReceipt>, LendingError> {
    let service = service.inner().clone();
    let borrower = user.as_borrower();
    run_blocking(move || service.borrow(&borrower, book_id))
        .await
        .map(Json)
}

#[tracing::instrument(name = "Return", skip(user, service), fields(user_id = %user.user_id))]
#[post("/borrowings/<borrowing_id>/return")]
pub async fn return_book(
    borrowing_id: Uuid,
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<ReturnReceipt>, LendingError> {
    let service = service.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || service.return_book(user_id, borrowing_id))
        .await
        .map(Json)
}

#[tracing::instrument(name = "Active borrowings", skip(user, service), fields(user_id = %user.user_id))]
#[get("/borrowings/active")]
pub async fn active_borrowings(
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<Vec<ActiveBorrowing>>, LendingError> {
    let service = service.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || service.list_active(user_id))
        .await
        .map(Json)
}

#[tracing::instrument(name = "Borrowing history", skip(user, service), fields(user_id = %user.user_id))]
#[get("/borrowings/history")]
pub async fn borrowing_history(
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<Vec<HistoryEntry>>, LendingError> {
    let service = service.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || service.list_history(user_id))
        .await
        .map(Json)
}
