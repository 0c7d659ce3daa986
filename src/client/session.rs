use crate::client::api::{ApiError, AuthApi};
use crate::client::form::{LoginForm, RegisterForm};
use crate::models::error::FieldError;
use crate::models::user::UserResponse;
use tracing::{debug, info};

pub const LOGIN_PATH: &str = "/login";

/// Failure of a login or register attempt as shown on the form.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please correct the highlighted fields")]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SessionError::Invalid(errors) => errors,
            SessionError::Api(error) => error.field_errors(),
        }
    }
}

/// What the protected-route gate decided for the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate<'a> {
    Render(&'a UserResponse),
    Redirect(&'static str),
}

/// Authenticated user of the client, if any.
#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    user: Option<UserResponse>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&UserResponse> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn gate(&self) -> Gate<'_> {
        match &self.user {
            Some(user) => Gate::Render(user),
            None => Gate::Redirect(LOGIN_PATH),
        }
    }

    pub async fn register<A: AuthApi + ?Sized>(&mut self, api: &A, form: &RegisterForm) -> Result<&UserResponse, SessionError> {
        let request = form.to_request().map_err(SessionError::Invalid)?;
        let user = api.register(&request).await?;
        info!(user_id = %user.id, "registered");
        Ok(&*self.user.insert(user))
    }

    pub async fn login<A: AuthApi + ?Sized>(&mut self, api: &A, form: &LoginForm) -> Result<&UserResponse, SessionError> {
        let request = form.to_request().map_err(SessionError::Invalid)?;
        let user = api.login(&request).await?;
        info!(user_id = %user.id, "logged in");
        Ok(&*self.user.insert(user))
    }

    /// Forgets the user even when the server call fails.
    pub async fn logout<A: AuthApi + ?Sized>(&mut self, api: &A) -> Result<(), ApiError> {
        self.user = None;
        api.logout().await
    }

    /// Picks up an existing cookie session on startup. A 401 leaves the
    /// session anonymous; other failures are returned.
    pub async fn restore<A: AuthApi + ?Sized>(&mut self, api: &A) -> Result<bool, ApiError> {
        match api.profile().await {
            Ok(user) => {
                debug!(user_id = %user.id, "session restored");
                self.user = Some(user);
                Ok(true)
            }
            Err(error) if error.is_unauthorized() => {
                self.user = None;
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }
}
