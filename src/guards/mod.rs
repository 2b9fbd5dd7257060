mod authenticated_user;

use anyhow::{anyhow, Context};
pub use authenticated_user::*;
use rocket::http::Status;

/// Turns a failed header lookup or parse into a 401 rejection carrying `context`.
trait OrUnauthorized<T> {
    fn or_unauthorized(self, context: &'static str) -> Result<T, (Status, anyhow::Error)>;
}

impl<T, E> OrUnauthorized<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn or_unauthorized(self, context: &'static str) -> Result<T, (Status, anyhow::Error)> {
        self.context(context).map_err(|e| (Status::Unauthorized, e))
    }
}

impl<T> OrUnauthorized<T> for Option<T> {
    fn or_unauthorized(self, context: &'static str) -> Result<T, (Status, anyhow::Error)> {
        self.ok_or_else(|| (Status::Unauthorized, anyhow!(context)))
    }
}
