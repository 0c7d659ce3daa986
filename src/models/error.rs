use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// A single field-level validation failure, keyed by the wire name of the field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Error for a payload key whose JSON value has the wrong type.
    pub fn wrong_type(field: &str) -> Self {
        let message = match field {
            "budget" => "Budget must be a number",
            "duration" => "Duration must be a number",
            "releaseYear" => "Release year must be a number",
            "title" => "Title must be a string",
            "type" => "Type must be a string",
            "director" => "Director name must be a string",
            "location" => "Location must be a string",
            "image" => "Image must be a string",
            "name" => "Name must be a string",
            "email" => "Email must be a string",
            "password" => "Password must be a string",
            other => return FieldError::new(other, format!("Invalid value for {}", other)),
        };
        FieldError::new(field, message)
    }

    /// Flattens validator output into field errors, ordered by field name.
    pub fn from_validation(errors: &ValidationErrors) -> Vec<FieldError> {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        fields
            .into_iter()
            .flat_map(|(field, errs)| {
                let name = wire_field_name(&field);
                errs.iter().map(move |e| FieldError {
                    field: name.clone(),
                    message: e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect()
    }
}

/// Maps a Rust field name to the camelCase key clients send.
pub fn wire_field_name(field: &str) -> String {
    if field == "movie_type" {
        return "type".to_string();
    }

    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn wire_names_are_camel_case() {
        assert_eq!(wire_field_name("title"), "title");
        assert_eq!(wire_field_name("release_year"), "releaseYear");
        assert_eq!(wire_field_name("movie_type"), "type");
    }

    #[test]
    fn wrong_type_names_the_expected_kind() {
        assert_eq!(FieldError::wrong_type("budget").message, "Budget must be a number");
        assert_eq!(FieldError::wrong_type("releaseYear").message, "Release year must be a number");
        assert_eq!(FieldError::wrong_type("extra"), FieldError::new("extra", "Invalid value for extra"));
    }

    #[test]
    fn falls_back_to_code_without_message() {
        let mut errors = ValidationErrors::new();
        errors.add("budget", ValidationError::new("range"));
        errors.add("title", ValidationError::new("length").with_message("Title is required".into()));

        let flattened = FieldError::from_validation(&errors);
        assert_eq!(
            flattened,
            vec![FieldError::new("budget", "range"), FieldError::new("title", "Title is required")]
        );
    }
}
