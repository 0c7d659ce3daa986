use crate::client::api::{ApiError, AuthApi, MovieApi};
use crate::models::error::FieldError;
use crate::models::movie::{MovieListResponse, MovieRequest, MovieResponse, MovieType, MovieUpdateRequest};
use crate::models::pagination::PageParams;
use crate::models::user::{LoginRequest, RegisterRequest, UserResponse};
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

pub fn movie(title: &str, duration: i32, release_year: i32) -> MovieResponse {
    MovieResponse {
        id: Uuid::new_v4(),
        title: title.to_string(),
        movie_type: MovieType::Movie,
        director: "Michael Mann".to_string(),
        budget: 60_000_000.0,
        location: "Los Angeles".to_string(),
        duration,
        release_year,
        image: None,
        created_at: Utc::now(),
        user_id: None,
        user: None,
    }
}

pub fn user(email: &str) -> UserResponse {
    UserResponse {
        id: Uuid::new_v4(),
        name: "Jane Doe".to_string(),
        email: email.to_string(),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
struct FakeState {
    movies: Vec<MovieResponse>,
    list_calls: Vec<i64>,
    created: Vec<MovieRequest>,
    updated: Vec<(Uuid, MovieUpdateRequest)>,
    deleted: Vec<Uuid>,
    fail_next: Option<ApiError>,
    user: Option<UserResponse>,
    logged_in: bool,
}

/// Scripted stand-in for the HTTP API. Movies are kept newest first.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_movies(count: usize) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.movies = (0..count).rev().map(|i| movie(&format!("Movie {}", i), 90, 2000)).collect();
        }
        api
    }

    pub fn with_user(email: &str) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().user = Some(user(email));
        api
    }

    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    pub fn list_calls(&self) -> Vec<i64> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn created(&self) -> Vec<MovieRequest> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updated(&self) -> Vec<(Uuid, MovieUpdateRequest)> {
        self.state.lock().unwrap().updated.clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn first_movie(&self) -> MovieResponse {
        self.state.lock().unwrap().movies[0].clone()
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        match self.state.lock().unwrap().fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn validation_error(field: &str, message: &str) -> ApiError {
    ApiError::Validation {
        message: "Validation failed".to_string(),
        errors: vec![FieldError::new(field, message)],
    }
}

#[async_trait::async_trait]
impl MovieApi for FakeApi {
    async fn list_movies(&self, page: i64) -> Result<MovieListResponse, ApiError> {
        self.state.lock().unwrap().list_calls.push(page);
        self.take_failure()?;

        let state = self.state.lock().unwrap();
        let params = PageParams::new(Some(page));
        let movies = state
            .movies
            .iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .cloned()
            .collect();
        Ok(MovieListResponse::new(movies, &params, state.movies.len() as i64))
    }

    async fn create_movie(&self, request: &MovieRequest) -> Result<MovieResponse, ApiError> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        state.created.push(request.clone());

        let mut created = movie(&request.title, request.duration, request.release_year);
        created.director = request.director.clone();
        created.budget = request.budget;
        created.location = request.location.clone();
        state.movies.insert(0, created.clone());
        Ok(created)
    }

    async fn update_movie(&self, id: &Uuid, request: &MovieUpdateRequest) -> Result<MovieResponse, ApiError> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        state.updated.push((*id, request.clone()));

        let stored = state
            .movies
            .iter_mut()
            .find(|m| m.id == *id)
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;
        if let Some(title) = &request.title {
            stored.title = title.clone();
        }
        Ok(stored.clone())
    }

    async fn delete_movie(&self, id: &Uuid) -> Result<(), ApiError> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let before = state.movies.len();
        state.movies.retain(|m| m.id != *id);
        if state.movies.len() == before {
            return Err(ApiError::NotFound("Movie not found".to_string()));
        }
        state.deleted.push(*id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> Result<UserResponse, ApiError> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        let registered = UserResponse {
            name: request.name.clone(),
            ..user(&request.email)
        };
        state.user = Some(registered.clone());
        state.logged_in = true;
        Ok(registered)
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserResponse, ApiError> {
        self.take_failure()?;
        let mut state = self.state.lock().unwrap();
        match state.user.clone() {
            Some(known) if known.email == request.email => {
                state.logged_in = true;
                Ok(known)
            }
            _ => Err(ApiError::Unauthorized("Invalid credentials".to_string())),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.take_failure()?;
        self.state.lock().unwrap().logged_in = false;
        Ok(())
    }

    async fn profile(&self) -> Result<UserResponse, ApiError> {
        self.take_failure()?;
        let state = self.state.lock().unwrap();
        match (&state.user, state.logged_in) {
            (Some(known), true) => Ok(known.clone()),
            _ => Err(ApiError::Unauthorized("No token provided".to_string())),
        }
    }
}
