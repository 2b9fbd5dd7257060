use crate::guards::AuthenticatedUser;
use crate::lending::{BorrowingService, FinePayment, FineSummary, LendingError};
use crate::routes::run_blocking;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

#[tracing::instrument(name = "Fine summary", skip(user, service), fields(user_id = %user.user_id))]
#[get("/profile/fines/summary")]
pub async fn fine_summary(
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<FineSummary>, LendingError> {
    let service = service.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || service.fine_summary(user_id))
        .await
        .map(Json)
}

#[tracing::instrument(name = "Pay all fines", skip(user, service), fields(user_id = %user.user_id))]
#[post("/profile/fines/pay-all")]
pub async fn pay_all_fines(
    user: AuthenticatedUser,
    service: &State<Arc<BorrowingService>>,
) -> Result<Json<FinePayment>, LendingError> {
    let service = service.inner().clone();
    let user_id = user.user_id;
    run_blocking(move || service.pay_all_fines(user_id))
        .await
        .map(Json)
}
