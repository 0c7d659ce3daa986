use crate::models::error::FieldError;
use rocket::data::{ByteUnit, Data, FromData, Outcome};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::serde_json::error::Category;
use rocket::serde::json::{Json, serde_json};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RequestBody;
use rocket_okapi::request::OpenApiFromData;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;
use std::ops::Deref;
use tracing::warn;

/// Field name used when a failure cannot be pinned on a single key.
pub const BODY_FIELD: &str = "body";

/// A JSON body guard that logs why a payload was rejected.
///
/// Unlike Rocket's built-in `Json`, parse failures are answered with `400 Bad Request`
/// and stashed as [`MalformedBody`] so the 400 catcher can report them in the
/// structured error body. A top-level key holding the wrong type of value is
/// reported against that key.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

/// Reason a request body could not be decoded, cached on the request.
#[derive(Debug, Clone)]
pub struct MalformedBody(pub FieldError);

impl MalformedBody {
    /// True when a single key was at fault rather than the document as a whole.
    pub fn is_field(&self) -> bool {
        self.0.field != BODY_FIELD
    }
}

/// Top-level key whose value failed to decode, for data errors only.
fn offending_field(error: &serde_path_to_error::Error<serde_json::Error>) -> Option<String> {
    if error.inner().classify() != Category::Data {
        return None;
    }
    match error.path().iter().next() {
        Some(Segment::Map { key }) => Some(key.clone()),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, (serde_json::Error, Option<String>)> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|e| {
        let field = offending_field(&e);
        (e.into_inner(), field)
    })?;
    de.end().map_err(|e| (e, None))?;
    Ok(value)
}

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T: DeserializeOwned> FromData<'r> for JsonBody<T> {
    type Error = serde_json::Error;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(ByteUnit::Mebibyte(1));

        let bytes = match data.open(limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    "JSON payload exceeded size limit"
                );
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    serde_json::Error::io(std::io::Error::other("payload too large")),
                ));
            }
            Err(e) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error = %e,
                    "Failed to read request body"
                );
                return Outcome::Error((Status::BadRequest, serde_json::Error::io(e)));
            }
        };

        match decode::<T>(&bytes) {
            Ok(value) => Outcome::Success(JsonBody(value)),
            Err((e, field)) => {
                let body_preview = String::from_utf8_lossy(&bytes);
                let body_preview: String = if body_preview.chars().count() > 500 {
                    format!("{}...", body_preview.chars().take(500).collect::<String>())
                } else {
                    body_preview.to_string()
                };

                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error_message = %e,
                    error_line = e.line(),
                    error_column = e.column(),
                    error_category = ?e.classify(),
                    error_field = ?field,
                    request_body = %body_preview,
                    "Failed to parse JSON request body"
                );

                let reason = match field {
                    Some(field) => FieldError::wrong_type(&field),
                    None => FieldError::new(BODY_FIELD, e.to_string()),
                };
                req.local_cache(|| Some(MalformedBody(reason)));
                Outcome::Error((Status::BadRequest, e))
            }
        }
    }
}

impl<'r, T: JsonSchema + DeserializeOwned> OpenApiFromData<'r> for JsonBody<T> {
    fn request_body(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<RequestBody> {
        Json::<T>::request_body(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::MovieRequest;

    #[test]
    fn wrong_typed_key_is_named() {
        let (_, field) = decode::<MovieRequest>(br#"{"title":"Heat","budget":"lots"}"#).unwrap_err();
        assert_eq!(field.as_deref(), Some("budget"));

        let (_, field) = decode::<MovieRequest>(br#"{"title":null}"#).unwrap_err();
        assert_eq!(field.as_deref(), Some("title"));
    }

    #[test]
    fn syntax_errors_blame_the_body() {
        let (_, field) = decode::<MovieRequest>(b"{not json").unwrap_err();
        assert_eq!(field, None);

        let (_, field) = decode::<MovieRequest>(br#"{"title":"Heat"} trailing"#).unwrap_err();
        assert_eq!(field, None);

        let (_, field) = decode::<MovieRequest>(b"[1, 2]").unwrap_err();
        assert_eq!(field, None);
    }
}
