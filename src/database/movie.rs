use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::movie::{Movie, MovieRequest, MovieRow};
use crate::models::pagination::PageParams;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create_movie(&self, request: &MovieRequest, owner_id: Option<&Uuid>) -> Result<Movie, AppError>;
    async fn get_movie_by_id(&self, id: &Uuid) -> Result<Option<Movie>, AppError>;
    /// Returns the requested page, newest first, together with the total record count.
    async fn list_movies(&self, params: &PageParams) -> Result<(Vec<Movie>, i64), AppError>;
    async fn update_movie(&self, id: &Uuid, request: &MovieRequest) -> Result<Movie, AppError>;
    async fn delete_movie(&self, id: &Uuid) -> Result<(), AppError>;
}

const MOVIE_COLUMNS: &str = r#"
    m.id,
    m.title,
    m.movie_type,
    m.director,
    m.budget,
    m.location,
    m.duration,
    m.release_year,
    m.image,
    m.created_at,
    m.user_id,
    u.name AS user_name,
    u.email AS user_email
"#;

#[async_trait::async_trait]
impl MovieRepository for PostgresRepository {
    async fn create_movie(&self, request: &MovieRequest, owner_id: Option<&Uuid>) -> Result<Movie, AppError> {
        let movie_type = request.movie_type()?;
        let query = format!(
            r#"
            WITH m AS (
                INSERT INTO movie (title, movie_type, director, budget, location, duration, release_year, image, user_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT {MOVIE_COLUMNS}
            FROM m
            LEFT JOIN users u ON u.id = m.user_id
            "#
        );

        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&request.title)
            .bind(movie_type)
            .bind(&request.director)
            .bind(request.budget)
            .bind(&request.location)
            .bind(request.duration)
            .bind(request.release_year)
            .bind(&request.image)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to create movie", e))?;

        Ok(row.into())
    }

    async fn get_movie_by_id(&self, id: &Uuid) -> Result<Option<Movie>, AppError> {
        let query = format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movie m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            "#
        );

        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to fetch movie", e))?;

        Ok(row.map(Movie::from))
    }

    async fn list_movies(&self, params: &PageParams) -> Result<(Vec<Movie>, i64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movie")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to count movies", e))?;

        let query = format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movie m
            LEFT JOIN users u ON u.id = m.user_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $1 OFFSET $2
            "#
        );

        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to list movies", e))?;

        Ok((rows.into_iter().map(Movie::from).collect(), total))
    }

    async fn update_movie(&self, id: &Uuid, request: &MovieRequest) -> Result<Movie, AppError> {
        let movie_type = request.movie_type()?;
        let query = format!(
            r#"
            WITH m AS (
                UPDATE movie
                SET title = $1, movie_type = $2, director = $3, budget = $4, location = $5,
                    duration = $6, release_year = $7, image = $8
                WHERE id = $9
                RETURNING *
            )
            SELECT {MOVIE_COLUMNS}
            FROM m
            LEFT JOIN users u ON u.id = m.user_id
            "#
        );

        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&request.title)
            .bind(movie_type)
            .bind(&request.director)
            .bind(request.budget)
            .bind(&request.location)
            .bind(request.duration)
            .bind(request.release_year)
            .bind(&request.image)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to update movie", e))?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(AppError::NotFound("Movie not found".to_string())),
        }
    }

    async fn delete_movie(&self, id: &Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM movie WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to delete movie", e))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }

        Ok(())
    }
}
