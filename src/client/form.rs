use crate::models::error::FieldError;
use crate::models::movie::{MovieRequest, MovieResponse};
use crate::models::user::{LoginRequest, RegisterRequest};
use validator::Validate;

/// Raw text inputs of the add/edit movie form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub movie_type: String,
    pub director: String,
    pub budget: String,
    pub location: String,
    pub duration: String,
    pub release_year: String,
    pub image: String,
}

impl MovieForm {
    /// Pre-fills the form from a stored record, as the edit dialog does.
    pub fn from_movie(movie: &MovieResponse) -> Self {
        Self {
            title: movie.title.clone(),
            movie_type: movie.movie_type.to_string(),
            director: movie.director.clone(),
            budget: movie.budget.to_string(),
            location: movie.location.clone(),
            duration: movie.duration.to_string(),
            release_year: movie.release_year.to_string(),
            image: movie.image.clone().unwrap_or_default(),
        }
    }

    /// Parses the inputs and applies the server's movie rules.
    ///
    /// Numbers that do not parse are reported against their own field and
    /// skipped by the remaining checks, so each field carries at most the
    /// errors the user can act on.
    pub fn to_request(&self) -> Result<MovieRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let budget = parse_number(&self.budget, "budget", "Budget must be a number", |b: &f64| b.is_finite(), &mut errors);
        let duration = parse_number(&self.duration, "duration", "Duration must be a whole number", |_: &i32| true, &mut errors);
        let release_year = parse_number(&self.release_year, "releaseYear", "Release year must be a whole number", |_: &i32| true, &mut errors);

        let image = self.image.trim();
        let request = MovieRequest {
            title: self.title.trim().to_string(),
            movie_type: self.movie_type.clone(),
            director: self.director.trim().to_string(),
            budget: budget.unwrap_or(1.0),
            location: self.location.trim().to_string(),
            duration: duration.unwrap_or(1),
            release_year: release_year.unwrap_or(crate::models::movie::MIN_RELEASE_YEAR),
            image: (!image.is_empty()).then(|| image.to_string()),
        };

        if let Err(validation) = request.check() {
            let parse_failed: Vec<String> = errors.iter().map(|e: &FieldError| e.field.clone()).collect();
            errors.extend(FieldError::from_validation(&validation).into_iter().filter(|e| !parse_failed.contains(&e.field)));
        }

        if errors.is_empty() {
            Ok(request)
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(errors)
        }
    }
}

/// `accept` rejects values that parse but cannot be sent as JSON numbers, such as `inf`.
fn parse_number<T: std::str::FromStr>(
    raw: &str,
    field: &str,
    message: &str,
    accept: impl Fn(&T) -> bool,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => Some(value),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, Vec<FieldError>> {
        let request = RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        request.validate().map_err(|e| FieldError::from_validation(&e))?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> Result<LoginRequest, Vec<FieldError>> {
        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        request.validate().map_err(|e| FieldError::from_validation(&e))?;
        Ok(request)
    }
}
