use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::movie::{MovieCreatedResponse, MovieDeletedResponse, MovieListResponse, MovieRequest, MovieUpdateRequest, MovieUpdatedResponse};
use crate::models::pagination::PageParams;
use crate::service::movie::MovieService;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;

#[allow(clippy::result_large_err)]
fn parse_movie_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid movie id", e))
}

/// Create a movie owned by the current user
#[openapi(tag = "Movies")]
#[post("/", data = "<payload>")]
pub async fn create_movie(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<MovieRequest>,
) -> Result<status::Created<Json<MovieCreatedResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let movie = MovieService::new(&repo).create_movie(&payload, &current_user.id).await?;

    Ok(status::Created::new(format!("/api/movies/{}", movie.id)).body(Json(MovieCreatedResponse {
        message: "Movie created successfully".to_string(),
        movie,
    })))
}

/// List movies, newest first, ten per page.
/// A missing, non-numeric or non-positive `page` selects the first page.
#[openapi(tag = "Movies")]
#[get("/?<page>")]
pub async fn list_movies(pool: &State<PgPool>, _current_user: CurrentUser, page: Option<i64>) -> Result<Json<MovieListResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let params = PageParams::new(page);
    Ok(Json(MovieService::new(&repo).list_movies(&params).await?))
}

/// Update some or all fields of a movie
#[openapi(tag = "Movies")]
#[put("/<id>", data = "<payload>")]
pub async fn update_movie(
    pool: &State<PgPool>,
    _current_user: CurrentUser,
    id: &str,
    payload: JsonBody<MovieUpdateRequest>,
) -> Result<Json<MovieUpdatedResponse>, AppError> {
    let uuid = parse_movie_id(id)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let movie = MovieService::new(&repo).update_movie(&uuid, &payload).await?;
    Ok(Json(MovieUpdatedResponse {
        message: "Movie updated".to_string(),
        updated_movie: movie,
    }))
}

/// Delete a movie
#[openapi(tag = "Movies")]
#[delete("/<id>")]
pub async fn delete_movie(pool: &State<PgPool>, _current_user: CurrentUser, id: &str) -> Result<Json<MovieDeletedResponse>, AppError> {
    let uuid = parse_movie_id(id)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    MovieService::new(&repo).delete_movie(&uuid).await?;
    Ok(Json(MovieDeletedResponse {
        message: "Movie deleted".to_string(),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_movie, list_movies, update_movie, delete_movie]
}
