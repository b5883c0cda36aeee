use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{blog, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::user::{BlogSummary, RegisterRequest, UserResponse, validate_register_request};
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::id::new_id;

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Register a new user",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        id: Set(new_id()),
        username: Set(payload.username.trim().to_string()),
        name: Set(payload.name.trim().to_string()),
        password_hash: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Username already registered");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::with_blogs(user, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all users",
    description = "Returns every user with their blogs expanded to `{id, title, author, url, likes}`.",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    let mut blogs_by_owner = load_blogs_by_owner(&state.db, &users).await?;

    let data = users
        .into_iter()
        .map(|u| {
            let blogs = blogs_by_owner.remove(&u.id).unwrap_or_default();
            UserResponse::with_blogs(u, blogs)
        })
        .collect();

    Ok(Json(data))
}

async fn load_blogs_by_owner<C: ConnectionTrait>(
    db: &C,
    users: &[user::Model],
) -> Result<HashMap<Uuid, Vec<BlogSummary>>, AppError> {
    if users.is_empty() {
        return Ok(HashMap::new());
    }

    let blogs = blog::Entity::find()
        .select_only()
        .column(blog::Column::Id)
        .column(blog::Column::Title)
        .column(blog::Column::Author)
        .column(blog::Column::Url)
        .column(blog::Column::Likes)
        .column(blog::Column::UserId)
        .filter(blog::Column::UserId.is_in(users.iter().map(|u| u.id)))
        .order_by_asc(blog::Column::CreatedAt)
        .order_by_asc(blog::Column::Id)
        .into_model::<BlogSummary>()
        .all(db)
        .await?;

    let mut by_owner: HashMap<Uuid, Vec<BlogSummary>> = HashMap::new();
    for b in blogs {
        if let Some(owner) = b.user_id {
            by_owner.entry(owner).or_default().push(b);
        }
    }
    Ok(by_owner)
}
