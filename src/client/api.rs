use crate::models::error::{ErrorResponse, FieldError, ValidationErrorResponse};
use crate::models::movie::{MovieCreatedResponse, MovieListResponse, MovieRequest, MovieResponse, MovieUpdateRequest, MovieUpdatedResponse};
use crate::models::user::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UserResponse};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

/// Failure of a catalog API call, classified the way the UI reports it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<FieldError> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Request failed with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Per-field messages for inline display; empty for every non-validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Builds the error for a non-success response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::BAD_REQUEST
            && let Ok(validation) = serde_json::from_str::<ValidationErrorResponse>(body)
        {
            return ApiError::Validation {
                message: validation.message,
                errors: validation.errors,
            };
        }

        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::BAD_REQUEST => ApiError::Validation { message, errors: Vec::new() },
            other => ApiError::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

#[async_trait::async_trait]
pub trait MovieApi: Send + Sync {
    async fn list_movies(&self, page: i64) -> Result<MovieListResponse, ApiError>;
    async fn create_movie(&self, request: &MovieRequest) -> Result<MovieResponse, ApiError>;
    async fn update_movie(&self, id: &Uuid, request: &MovieUpdateRequest) -> Result<MovieResponse, ApiError>;
    async fn delete_movie(&self, id: &Uuid) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<UserResponse, ApiError>;
    async fn login(&self, request: &LoginRequest) -> Result<UserResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn profile(&self) -> Result<UserResponse, ApiError>;
}

/// HTTP client for the catalog API. The session cookie set by login is kept
/// in the client's cookie store and sent on every later call.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %error, "catalog API call failed");
        } else {
            debug!(status = status.as_u16(), error = %error, "catalog API call rejected");
        }
        Err(error)
    }
}

#[async_trait::async_trait]
impl MovieApi for HttpApi {
    async fn list_movies(&self, page: i64) -> Result<MovieListResponse, ApiError> {
        let request = self.client.get(self.build_url("movies")).query(&[("page", page)]);
        self.execute(request).await
    }

    async fn create_movie(&self, request: &MovieRequest) -> Result<MovieResponse, ApiError> {
        let created: MovieCreatedResponse = self.execute(self.client.post(self.build_url("movies")).json(request)).await?;
        Ok(created.movie)
    }

    async fn update_movie(&self, id: &Uuid, request: &MovieUpdateRequest) -> Result<MovieResponse, ApiError> {
        let url = self.build_url(&format!("movies/{}", id));
        let updated: MovieUpdatedResponse = self.execute(self.client.put(url).json(request)).await?;
        Ok(updated.updated_movie)
    }

    async fn delete_movie(&self, id: &Uuid) -> Result<(), ApiError> {
        let url = self.build_url(&format!("movies/{}", id));
        let _: serde_json::Value = self.execute(self.client.delete(url)).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpApi {
    async fn register(&self, request: &RegisterRequest) -> Result<UserResponse, ApiError> {
        let response: AuthResponse = self.execute(self.client.post(self.build_url("auth/register")).json(request)).await?;
        Ok(response.user)
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserResponse, ApiError> {
        let response: AuthResponse = self.execute(self.client.post(self.build_url("auth/login")).json(request)).await?;
        Ok(response.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.execute(self.client.post(self.build_url("auth/logout"))).await?;
        Ok(())
    }

    async fn profile(&self) -> Result<UserResponse, ApiError> {
        let response: ProfileResponse = self.execute(self.client.get(self.build_url("auth/profile"))).await?;
        Ok(response.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_keeps_field_errors() {
        let body = r#"{"success":false,"message":"Validation failed","errors":[{"field":"title","message":"Title is required"}]}"#;
        let error = ApiError::from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(error.to_string(), "Validation failed");
        assert_eq!(error.field_errors(), &[FieldError::new("title", "Title is required")]);
    }

    #[test]
    fn status_codes_map_to_categories() {
        let unauthorized = ApiError::from_response(StatusCode::UNAUTHORIZED, r#"{"message":"No token provided"}"#);
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.to_string(), "No token provided");

        assert!(matches!(
            ApiError::from_response(StatusCode::NOT_FOUND, r#"{"message":"Movie not found"}"#),
            ApiError::NotFound(m) if m == "Movie not found"
        ));
        assert!(matches!(ApiError::from_response(StatusCode::CONFLICT, "{}"), ApiError::Conflict(_)));
    }

    #[test]
    fn unreadable_body_falls_back_to_reason_phrase() {
        let error = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(error, ApiError::Server { status: 500, ref message } if message == "Internal Server Error"));
        assert!(error.field_errors().is_empty());
    }

    #[test]
    fn urls_are_joined_under_the_base() {
        let api = HttpApi::new("http://localhost:8000/api/").unwrap();
        assert_eq!(api.build_url("movies"), "http://localhost:8000/api/movies");
        assert_eq!(api.build_url("/auth/login"), "http://localhost:8000/api/auth/login");
    }
}
