use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{AuthResponse, LoginRequest, LogoutResponse, ProfileResponse, RegisterRequest, UserResponse};
use crate::service::auth::AuthService;
use crate::service::session::SessionKeys;
use rocket::http::CookieJar;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Register a new account and start its session
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(
    pool: &State<PgPool>,
    keys: &State<SessionKeys>,
    cookies: &CookieJar<'_>,
    payload: JsonBody<RegisterRequest>,
) -> Result<status::Created<Json<AuthResponse>>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::validation("Registration validation failed", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = AuthService::new(&repo).register(&payload).await?;

    let token = keys.issue(&user.id)?;
    cookies.add(keys.session_cookie(token));

    Ok(status::Created::new("/api/auth/profile").body(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        user: UserResponse::from(&user),
    })))
}

/// Log in and receive the session cookie
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    keys: &State<SessionKeys>,
    cookies: &CookieJar<'_>,
    payload: JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(|e| AppError::validation("Login validation failed", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = AuthService::new(&repo).login(&payload).await?;

    let token = keys.issue(&user.id)?;
    cookies.add(keys.session_cookie(token));

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
    }))
}

/// Clear the session cookie
#[openapi(tag = "Auth")]
#[post("/logout")]
pub fn logout(keys: &State<SessionKeys>, cookies: &CookieJar<'_>) -> Json<LogoutResponse> {
    cookies.remove(keys.removal_cookie());
    Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// Get the logged-in user's profile
#[openapi(tag = "Auth")]
#[get("/profile")]
pub async fn profile(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<ProfileResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = AuthService::new(&repo).profile(&current_user.id).await?;
    Ok(Json(ProfileResponse {
        user: UserResponse::from(&user),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, profile]
}
