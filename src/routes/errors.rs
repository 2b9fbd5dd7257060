use crate::lending::LendingError;
use anyhow::Context;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::Request;

/// The JSON shape of every error the API returns.
#[derive(serde::Serialize, Debug)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

impl LendingError {
    pub fn status(&self) -> Status {
        match self {
            LendingError::Ineligible(_)
            | LendingError::AlreadyBorrowed
            | LendingError::NoCopiesAvailable
            | LendingError::SubscriptionExpiring
            | LendingError::AlreadyReturned => Status::BadRequest,
            LendingError::BookNotFound
            | LendingError::NotFound
            | LendingError::NotificationNotFound => Status::NotFound,
            LendingError::BorrowingNotPermitted => Status::Forbidden,
            LendingError::Unexpected(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for LendingError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error.cause_chain = ?self, "Lending operation failed");
        } else {
            tracing::info!(error.code = self.code(), "Lending request refused");
        }
        (status, Json(ErrorBody::new(self.code(), self.to_string()))).respond_to(request)
    }
}

/// Runs a lending operation on the blocking pool.
///
/// The task is detached from the request, so a client hanging up cannot
/// interrupt an open transaction.
pub async fn run_blocking<T, F>(operation: F) -> Result<T, LendingError>
where
    F: FnOnce() -> Result<T, LendingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .context("A lending task panicked or was cancelled.")?
}
