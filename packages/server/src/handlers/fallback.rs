use crate::error::AppError;

/// Answers every request that matched no route.
pub async fn unknown_endpoint() -> AppError {
    AppError::NotFound("unknown endpoint".into())
}

/// Answers a known path requested with a method it does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
