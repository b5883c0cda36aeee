use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Require a field to be present and not only whitespace. The value is
/// returned as given.
pub fn require_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("`{field}` is required"))),
    }
}

/// Validate a like count (must be >= 0).
pub fn validate_likes(likes: i32) -> Result<(), AppError> {
    if likes < 0 {
        return Err(AppError::Validation("`likes` must be >= 0".into()));
    }
    Ok(())
}
