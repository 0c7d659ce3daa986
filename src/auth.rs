use crate::error::app_error::AppError;
use crate::service::session::SessionKeys;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Why the session guard rejected a request; read back by the 401 catcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "No token provided",
            AuthFailure::InvalidToken => "Invalid token",
        }
    }
}

fn reject(req: &Request<'_>, failure: AuthFailure) -> RequestOutcome<CurrentUser, AppError> {
    req.local_cache(|| Some(failure));
    let error = match failure {
        AuthFailure::MissingToken => AppError::MissingToken,
        AuthFailure::InvalidToken => AppError::InvalidToken,
    };
    Outcome::Error((Status::Unauthorized, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let keys = match req.rocket().state::<SessionKeys>() {
            Some(keys) => keys,
            None => return Outcome::Error((Status::InternalServerError, AppError::InvalidToken)),
        };

        let token = match req.cookies().get(keys.cookie_name()) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => return reject(req, AuthFailure::MissingToken),
        };

        match keys.verify(&token) {
            Ok(claims) => {
                let current_user = CurrentUser { id: claims.sub };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Err(_) => reject(req, AuthFailure::InvalidToken),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Cookie-based authentication. Log in via POST /api/auth/login to obtain the session cookie.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: "auth-token".to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - missing or invalid session cookie".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::AuthFailure;

    #[test]
    fn failure_messages_match_wire_contract() {
        assert_eq!(AuthFailure::MissingToken.message(), "No token provided");
        assert_eq!(AuthFailure::InvalidToken.message(), "Invalid token");
    }
}
