//! Turns `validator` reports into the per-field messages clients see, and
//! converts validated requests into domain values.

use bookshelf_http::FieldErrors;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use super::error::BookError;
use super::models::{BookUpdate, CreateBookRequest, DeleteBookRequest, NewBook, UpdateBookRequest};

impl From<ValidationErrors> for BookError {
    fn from(errors: ValidationErrors) -> Self {
        BookError::Validation(field_messages(&errors))
    }
}

/// First failing rule of every field, rendered as a human message.
pub fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, failures)| {
            failures
                .first()
                .map(|failure| (field.to_string(), describe(failure)))
        })
        .collect()
}

fn describe(error: &ValidationError) -> String {
    let param = |name: &str| error.params.get(name);

    match error.code.as_ref() {
        "required" => "This field is required".to_string(),
        "length" => {
            let length = param("value")
                .and_then(Value::as_str)
                .map(|s| s.chars().count() as f64);
            let min = param("min").and_then(Value::as_f64);
            let max = param("max").and_then(Value::as_f64);
            match (length, min, max) {
                (Some(length), Some(min), _) if length < min => {
                    format!("Should be at least {} characters long", whole(min))
                }
                (_, _, Some(max)) => format!("Should be at most {} characters long", whole(max)),
                (_, Some(min), None) => {
                    format!("Should be at least {} characters long", whole(min))
                }
                _ => "Invalid value".to_string(),
            }
        }
        "range" => {
            let value = param("value").and_then(Value::as_f64);
            let min = param("min").and_then(Value::as_f64);
            let max = param("max").and_then(Value::as_f64);
            match (value, min, max) {
                (Some(value), Some(min), _) if value < min => {
                    format!("Should be greater than or equal to {}", whole(min))
                }
                (_, _, Some(max)) => format!("Should be less than or equal to {}", whole(max)),
                (_, Some(min), None) => {
                    format!("Should be greater than or equal to {}", whole(min))
                }
                _ => "Invalid value".to_string(),
            }
        }
        _ => "Invalid value".to_string(),
    }
}

/// Bounds arrive as JSON numbers that may be floats; print integral ones
/// without a fractional part.
fn whole(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

fn missing(field: &'static str) -> BookError {
    BookError::Internal(format!("validated request is missing '{field}'"))
}

impl TryFrom<CreateBookRequest> for NewBook {
    type Error = BookError;

    fn try_from(request: CreateBookRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(Self {
            title: request.title.ok_or_else(|| missing("title"))?,
            description: request.description.ok_or_else(|| missing("description"))?,
            qty: request.qty.ok_or_else(|| missing("qty"))?,
        })
    }
}

impl TryFrom<UpdateBookRequest> for BookUpdate {
    type Error = BookError;

    fn try_from(request: UpdateBookRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(Self {
            id: request.id.ok_or_else(|| missing("id"))?,
            title: request.title.ok_or_else(|| missing("title"))?,
            description: request.description.ok_or_else(|| missing("description"))?,
            qty: request.qty.ok_or_else(|| missing("qty"))?,
        })
    }
}

impl DeleteBookRequest {
    /// Validated identity of the book to remove.
    pub fn validated_id(&self) -> Result<i64, BookError> {
        self.validate()?;
        self.id.ok_or_else(|| missing("id"))
    }
}
