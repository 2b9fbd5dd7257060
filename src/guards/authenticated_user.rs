use crate::domain::Borrower;
use crate::guards::OrUnauthorized;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLES_HEADER: &str = "X-User-Roles";

/// The caller as vouched for by the identity headers of the gateway in front of us.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub roles: Vec<String>,
    // prevents construction outside of this module
    _private: (),
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.eq_ignore_ascii_case("admin"))
    }

    pub fn as_borrower(&self) -> Borrower {
        Borrower {
            user_id: self.user_id,
            may_borrow: !self.is_admin(),
        }
    }
}

#[async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match from_request_result(request) {
            Ok(user) => Outcome::Success(user),
            Err((status, e)) => {
                tracing::warn!(error.cause_chain = ?e, "Rejected an unauthenticated request");
                Outcome::Error((status, e))
            }
        }
    }
}

fn from_request_result(request: &Request) -> Result<AuthenticatedUser, (Status, anyhow::Error)> {
    let raw_user_id = request
        .headers()
        .get_one(USER_ID_HEADER)
        .or_unauthorized("The 'X-User-Id' header was missing.")?;
    let user_id = Uuid::parse_str(raw_user_id.trim())
        .or_unauthorized("The 'X-User-Id' header is not a UUID.")?;

    let roles = request
        .headers()
        .get_one(USER_ROLES_HEADER)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(AuthenticatedUser {
        user_id,
        roles,
        _private: (),
    })
}
