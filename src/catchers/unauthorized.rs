use crate::routes::ErrorBody;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;

#[catch(401)]
pub fn unauthorized_to_json() -> status::Custom<Json<ErrorBody>> {
    status::Custom(
        Status::Unauthorized,
        Json(ErrorBody::new(
            "unauthorized",
            "A valid X-User-Id header is required.",
        )),
    )
}
