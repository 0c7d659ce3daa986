use crate::auth::AuthFailure;
use crate::error::json::MalformedBody;
use crate::models::error::{ErrorResponse, ValidationErrorResponse};
use rocket::Either;
use rocket::serde::json::Json;
use rocket::{Request, catch};

fn message(text: &str) -> Json<ErrorResponse> {
    Json(ErrorResponse { message: text.to_string() })
}

/// Undecodable request bodies get the structured validation shape; anything
/// else that fails a guard with 400 gets a plain message.
#[catch(400)]
pub fn bad_request(req: &Request) -> Either<Json<ValidationErrorResponse>, Json<ErrorResponse>> {
    match req.local_cache(|| None::<MalformedBody>) {
        Some(malformed) => Either::Left(Json(ValidationErrorResponse {
            success: false,
            message: if malformed.is_field() { "Validation failed" } else { "Malformed request body" }.to_string(),
            errors: vec![malformed.0.clone()],
        })),
        None => Either::Right(message("Bad request")),
    }
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Json<ErrorResponse> {
    let failure = req.local_cache(|| None::<AuthFailure>).unwrap_or(AuthFailure::MissingToken);
    message(failure.message())
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorResponse> {
    message("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorResponse> {
    message("Conflict")
}

#[catch(413)]
pub fn payload_too_large(_: &Request) -> Json<ErrorResponse> {
    message("Payload too large")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorResponse> {
    message("Internal server error")
}
