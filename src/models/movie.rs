use crate::error::app_error::AppError;
use crate::models::pagination::PageParams;
use chrono::{DateTime, Datelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Earliest accepted release year, the year of the first surviving film.
pub const MIN_RELEASE_YEAR: i32 = 1888;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "movie_type")]
pub enum MovieType {
    #[default]
    #[serde(rename = "movie")]
    #[sqlx(rename = "movie")]
    Movie,
    #[serde(rename = "tvShow")]
    #[sqlx(rename = "tvShow")]
    TvShow,
}

impl MovieType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieType::Movie => "movie",
            MovieType::TvShow => "tvShow",
        }
    }
}

impl fmt::Display for MovieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "movie" => Ok(MovieType::Movie),
            "tvShow" => Ok(MovieType::TvShow),
            other => Err(AppError::BadRequest(format!("Unknown movie type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub movie_type: MovieType,
    pub director: String,
    pub budget: f64,
    pub location: String,
    pub duration: i32,
    pub release_year: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub owner: Option<MovieOwner>,
}

/// A movie joined with its (optional) owner.
#[derive(Debug, sqlx::FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub title: String,
    pub movie_type: MovieType,
    pub director: String,
    pub budget: f64,
    pub location: String,
    pub duration: i32,
    pub release_year: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        let owner = match (row.user_id, row.user_name, row.user_email) {
            (Some(id), Some(name), Some(email)) => Some(MovieOwner { id, name, email }),
            _ => None,
        };

        Movie {
            id: row.id,
            title: row.title,
            movie_type: row.movie_type,
            director: row.director,
            budget: row.budget,
            location: row.location,
            duration: row.duration,
            release_year: row.release_year,
            image: row.image,
            created_at: row.created_at,
            user_id: row.user_id,
            owner,
        }
    }
}

/// Movie payload for create, and the merged shape validated before an update.
///
/// Missing keys take their zero value, so a left-out field fails validation
/// under its own name.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Validate, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_movie_type"))]
    pub movie_type: String,
    #[validate(length(min = 1, message = "Director name is required"))]
    pub director: String,
    #[validate(range(exclusive_min = 0.0, message = "Budget must be positive"))]
    pub budget: f64,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: i32,
    #[validate(range(min = "MIN_RELEASE_YEAR", message = "Invalid release year"))]
    pub release_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn validate_movie_type(value: &str) -> Result<(), ValidationError> {
    if value.parse::<MovieType>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_movie_type").with_message("Type must be either movie or tvShow".into()))
    }
}

/// Latest accepted release year: the current calendar year (UTC).
pub fn latest_release_year() -> i32 {
    Utc::now().year()
}

impl MovieRequest {
    /// Runs the declarative rules plus the calendar-dependent upper bound on `releaseYear`.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.check_against(latest_release_year())
    }

    pub fn check_against(&self, latest_year: i32) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.release_year > latest_year {
            errors.add(
                "release_year",
                ValidationError::new("release_year_in_future").with_message("Release year can't be in the future".into()),
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn movie_type(&self) -> Result<MovieType, AppError> {
        self.movie_type.parse()
    }
}

impl From<&Movie> for MovieRequest {
    fn from(movie: &Movie) -> Self {
        MovieRequest {
            title: movie.title.clone(),
            movie_type: movie.movie_type.to_string(),
            director: movie.director.clone(),
            budget: movie.budget,
            location: movie.location.clone(),
            duration: movie.duration,
            release_year: movie.release_year,
            image: movie.image.clone(),
        }
    }
}

/// Partial movie update; only the supplied fields overwrite the stored record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MovieUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub movie_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MovieUpdateRequest {
    /// Overlays the supplied fields on `movie`, producing the full record to validate and store.
    pub fn apply_to(&self, movie: &Movie) -> MovieRequest {
        let mut merged = MovieRequest::from(movie);
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(movie_type) = &self.movie_type {
            merged.movie_type = movie_type.clone();
        }
        if let Some(director) = &self.director {
            merged.director = director.clone();
        }
        if let Some(budget) = self.budget {
            merged.budget = budget;
        }
        if let Some(location) = &self.location {
            merged.location = location.clone();
        }
        if let Some(duration) = self.duration {
            merged.duration = duration;
        }
        if let Some(release_year) = self.release_year {
            merged.release_year = release_year;
        }
        if let Some(image) = &self.image {
            merged.image = Some(image.clone());
        }
        merged
    }
}

impl From<&MovieRequest> for MovieUpdateRequest {
    fn from(request: &MovieRequest) -> Self {
        MovieUpdateRequest {
            title: Some(request.title.clone()),
            movie_type: Some(request.movie_type.clone()),
            director: Some(request.director.clone()),
            budget: Some(request.budget),
            location: Some(request.location.clone()),
            duration: Some(request.duration),
            release_year: Some(request.release_year),
            image: request.image.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct MovieOwnerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub movie_type: MovieType,
    pub director: String,
    pub budget: f64,
    pub location: String,
    pub duration: i32,
    pub release_year: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user: Option<MovieOwnerResponse>,
}

impl From<&Movie> for MovieResponse {
    fn from(movie: &Movie) -> Self {
        MovieResponse {
            id: movie.id,
            title: movie.title.clone(),
            movie_type: movie.movie_type,
            director: movie.director.clone(),
            budget: movie.budget,
            location: movie.location.clone(),
            duration: movie.duration,
            release_year: movie.release_year,
            image: movie.image.clone(),
            created_at: movie.created_at,
            user_id: movie.user_id,
            user: movie.owner.as_ref().map(|owner| MovieOwnerResponse {
                id: owner.id,
                name: owner.name.clone(),
                email: owner.email.clone(),
            }),
        }
    }
}

/// One page of movies, newest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieListResponse {
    pub movies: Vec<MovieResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_count: i64,
}

impl MovieListResponse {
    pub fn new(movies: Vec<MovieResponse>, params: &PageParams, total_count: i64) -> Self {
        Self {
            movies,
            total_pages: PageParams::total_pages(total_count),
            current_page: params.current_page(),
            total_count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct MovieCreatedResponse {
    pub message: String,
    pub movie: MovieResponse,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieUpdatedResponse {
    pub message: String,
    pub updated_movie: MovieResponse,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct MovieDeletedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::error::FieldError;

    fn valid_request() -> MovieRequest {
        MovieRequest {
            title: "Inception".to_string(),
            movie_type: "movie".to_string(),
            director: "Christopher Nolan".to_string(),
            budget: 160_000_000.0,
            location: "Los Angeles".to_string(),
            duration: 148,
            release_year: 2010,
            image: None,
        }
    }

    fn fields(errors: ValidationErrors) -> Vec<String> {
        FieldError::from_validation(&errors).into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().check().is_ok());
    }

    #[test]
    fn each_missing_key_is_reported_under_its_own_name() {
        let full = serde_json::to_value(valid_request()).unwrap();
        for key in ["title", "type", "director", "budget", "location", "duration", "releaseYear"] {
            let mut payload = full.clone();
            payload.as_object_mut().unwrap().remove(key);
            let request: MovieRequest = serde_json::from_value(payload).unwrap();
            let reported = fields(request.check().unwrap_err());
            assert_eq!(reported, vec![key.to_string()], "missing {}", key);
        }
    }

    #[test]
    fn release_year_bounds() {
        let latest = 2025;
        let mut request = valid_request();

        request.release_year = latest;
        assert!(request.check_against(latest).is_ok());

        request.release_year = latest + 1;
        assert_eq!(fields(request.check_against(latest).unwrap_err()), vec!["releaseYear"]);

        request.release_year = MIN_RELEASE_YEAR;
        assert!(request.check_against(latest).is_ok());

        request.release_year = MIN_RELEASE_YEAR - 1;
        assert_eq!(fields(request.check_against(latest).unwrap_err()), vec!["releaseYear"]);
    }

    #[test]
    fn current_year_is_accepted_by_default_check() {
        let mut request = valid_request();
        request.release_year = latest_release_year();
        assert!(request.check().is_ok());
        request.release_year = latest_release_year() + 1;
        assert!(request.check().is_err());
    }

    #[test]
    fn budget_and_duration_must_be_positive() {
        let mut request = valid_request();
        request.budget = -5.0;
        request.duration = 0;
        assert_eq!(fields(request.check().unwrap_err()), vec!["budget", "duration"]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut request = valid_request();
        request.movie_type = "documentary".to_string();
        let errors = FieldError::from_validation(&request.check().unwrap_err());
        assert_eq!(errors, vec![FieldError::new("type", "Type must be either movie or tvShow")]);
    }

    #[test]
    fn movie_type_round_trips_through_wire_names() {
        assert_eq!("tvShow".parse::<MovieType>().unwrap(), MovieType::TvShow);
        assert_eq!(serde_json::to_string(&MovieType::TvShow).unwrap(), r#""tvShow""#);
        assert!("TvShow".parse::<MovieType>().is_err());
    }

    #[test]
    fn update_overlays_only_supplied_fields() {
        let movie = Movie {
            id: Uuid::new_v4(),
            title: "Old".to_string(),
            movie_type: MovieType::Movie,
            director: "Someone".to_string(),
            budget: 10.0,
            location: "Paris".to_string(),
            duration: 90,
            release_year: 1999,
            image: None,
            created_at: Utc::now(),
            user_id: None,
            owner: None,
        };
        let patch: MovieUpdateRequest = serde_json::from_str(r#"{"title":"New","type":"tvShow"}"#).unwrap();

        let merged = patch.apply_to(&movie);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.movie_type, "tvShow");
        assert_eq!(merged.director, "Someone");
        assert_eq!(merged.duration, 90);
        assert_eq!(merged.release_year, 1999);
    }

    #[test]
    fn response_uses_wire_field_names() {
        let movie = Movie {
            id: Uuid::new_v4(),
            title: "Dark".to_string(),
            movie_type: MovieType::TvShow,
            director: "Baran bo Odar".to_string(),
            budget: 1.5,
            location: "Berlin".to_string(),
            duration: 60,
            release_year: 2017,
            image: None,
            created_at: Utc::now(),
            user_id: None,
            owner: None,
        };
        let json = serde_json::to_value(MovieResponse::from(&movie)).unwrap();
        assert_eq!(json["type"], "tvShow");
        assert_eq!(json["releaseYear"], 2017);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn list_response_reports_page_totals() {
        let response = MovieListResponse::new(Vec::new(), &PageParams::new(Some(3)), 21);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.current_page, 3);
        assert_eq!(response.total_count, 21);
    }
}
