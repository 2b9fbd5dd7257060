use crate::routes::ErrorBody;
use rocket::response::status;
use rocket::response::status::BadRequest;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(422)]
pub fn unprocessable_entity_to_bad_request(_req: &Request) -> BadRequest<Json<ErrorBody>> {
    status::BadRequest(Json(ErrorBody::new(
        "bad_request",
        "The request could not be understood.",
    )))
}
