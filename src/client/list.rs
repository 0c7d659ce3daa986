use crate::client::api::{ApiError, MovieApi};
use crate::models::movie::MovieResponse;
use std::cmp::Ordering;
use tracing::debug;

/// Distance from the bottom of the scroll container, in pixels, at which the next page is requested.
pub const SCROLL_THRESHOLD_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Type,
    Director,
    Budget,
    Location,
    Duration,
    ReleaseYear,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Title,
        SortKey::Type,
        SortKey::Director,
        SortKey::Budget,
        SortKey::Location,
        SortKey::Duration,
        SortKey::ReleaseYear,
    ];

    /// Column name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Type => "type",
            SortKey::Director => "director",
            SortKey::Budget => "budget",
            SortKey::Location => "location",
            SortKey::Duration => "duration",
            SortKey::ReleaseYear => "releaseYear",
        }
    }

    fn compare(&self, a: &MovieResponse, b: &MovieResponse) -> Ordering {
        match self {
            SortKey::Title => compare_text(&a.title, &b.title),
            SortKey::Type => compare_text(a.movie_type.as_str(), b.movie_type.as_str()),
            SortKey::Director => compare_text(&a.director, &b.director),
            SortKey::Location => compare_text(&a.location, &b.location),
            SortKey::Budget => a.budget.total_cmp(&b.budget),
            SortKey::Duration => a.duration.cmp(&b.duration),
            SortKey::ReleaseYear => a.release_year.cmp(&b.release_year),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Geometry of the scrollable table container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollPosition {
    pub fn near_bottom(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - SCROLL_THRESHOLD_PX
    }
}

/// Does `movie` match the free-text filter?
///
/// Numeric queries only look at budget, duration and release year; anything
/// else is a case-insensitive search over title, type, director and location.
pub fn matches_query(movie: &MovieResponse, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    if query.parse::<f64>().is_ok_and(f64::is_finite) {
        return [movie.budget.to_string(), movie.duration.to_string(), movie.release_year.to_string()]
            .iter()
            .any(|field| field.contains(query));
    }

    let needle = query.to_lowercase();
    [movie.title.as_str(), movie.movie_type.as_str(), movie.director.as_str(), movie.location.as_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Filters then sorts `movies`. The sort is stable, so equal keys keep load order.
pub fn visible_movies<'a>(movies: &'a [MovieResponse], query: &str, sort: SortSpec) -> Vec<&'a MovieResponse> {
    let mut visible: Vec<&MovieResponse> = movies.iter().filter(|m| matches_query(m, query)).collect();
    visible.sort_by(|a, b| {
        let ordering = sort.key.compare(a, b);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    visible
}

/// Client-side state of the movie table: loaded pages, filter text and sort column.
#[derive(Debug, Default)]
pub struct MovieListController {
    movies: Vec<MovieResponse>,
    page: i64,
    total_pages: i64,
    total_count: i64,
    fetching: bool,
    query: String,
    sort: SortSpec,
}

impl MovieListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movies(&self) -> &[MovieResponse] {
        &self.movies
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Clicking the active column flips its direction; any other column becomes active, ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort = SortSpec {
                key,
                direction: SortDirection::Ascending,
            };
        }
    }

    pub fn visible(&self) -> Vec<&MovieResponse> {
        visible_movies(&self.movies, &self.query, self.sort)
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn can_fetch_more(&self, position: &ScrollPosition) -> bool {
        !self.fetching && self.has_more() && position.near_bottom()
    }

    /// Drops everything loaded so far and loads page 1.
    pub async fn refetch<A: MovieApi + ?Sized>(&mut self, api: &A) -> Result<(), ApiError> {
        self.movies.clear();
        self.page = 0;
        self.total_pages = 0;
        self.total_count = 0;
        self.fetch_page(api, 1).await
    }

    /// Loads the next page when the container is scrolled near its bottom.
    /// Returns whether a page was requested.
    pub async fn on_scroll<A: MovieApi + ?Sized>(&mut self, api: &A, position: &ScrollPosition) -> Result<bool, ApiError> {
        if !self.can_fetch_more(position) {
            return Ok(false);
        }
        let next = self.page + 1;
        self.fetch_page(api, next).await?;
        Ok(true)
    }

    async fn fetch_page<A: MovieApi + ?Sized>(&mut self, api: &A, page: i64) -> Result<(), ApiError> {
        self.fetching = true;
        let result = api.list_movies(page).await;
        self.fetching = false;

        let response = result?;
        debug!(page, received = response.movies.len(), total_pages = response.total_pages, "movie page loaded");

        self.page = page;
        self.total_pages = response.total_pages;
        self.total_count = response.total_count;
        self.movies.extend(response.movies);
        Ok(())
    }
}
