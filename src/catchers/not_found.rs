use crate::routes::ErrorBody;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(404)]
pub fn not_found_to_json(req: &Request) -> status::Custom<Json<ErrorBody>> {
    status::Custom(
        Status::NotFound,
        Json(ErrorBody::new(
            "route_not_found",
            format!("No route matches {} {}.", req.method(), req.uri().path()),
        )),
    )
}
