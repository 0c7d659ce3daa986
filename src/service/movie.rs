use crate::database::movie::MovieRepository;
use crate::error::app_error::AppError;
use crate::models::movie::{MovieListResponse, MovieRequest, MovieResponse, MovieUpdateRequest};
use crate::models::pagination::PageParams;
use tracing::info;
use uuid::Uuid;

pub struct MovieService<'a, R: MovieRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: MovieRepository + ?Sized> MovieService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        MovieService { repository }
    }

    pub async fn create_movie(&self, request: &MovieRequest, owner_id: &Uuid) -> Result<MovieResponse, AppError> {
        request.check()?;
        let movie = self.repository.create_movie(request, Some(owner_id)).await?;
        info!(movie_id = %movie.id, user_id = %owner_id, "movie created");
        Ok(MovieResponse::from(&movie))
    }

    pub async fn list_movies(&self, params: &PageParams) -> Result<MovieListResponse, AppError> {
        let (movies, total) = self.repository.list_movies(params).await?;
        let responses = movies.iter().map(MovieResponse::from).collect();
        Ok(MovieListResponse::new(responses, params, total))
    }

    /// Overlays `patch` on the stored record and re-validates the result before writing it.
    pub async fn update_movie(&self, id: &Uuid, patch: &MovieUpdateRequest) -> Result<MovieResponse, AppError> {
        let existing = self
            .repository
            .get_movie_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

        let merged = patch.apply_to(&existing);
        merged.check()?;

        let movie = self.repository.update_movie(id, &merged).await?;
        Ok(MovieResponse::from(&movie))
    }

    pub async fn delete_movie(&self, id: &Uuid) -> Result<(), AppError> {
        self.repository.delete_movie(id).await?;
        info!(movie_id = %id, "movie deleted");
        Ok(())
    }
}
