use uuid::Uuid;

use crate::error::AppError;

/// Parse a path identifier. Anything that is not a UUID is `MalformedId`.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::MalformedId)
}

/// Generate a new, time-ordered identifier.
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}
