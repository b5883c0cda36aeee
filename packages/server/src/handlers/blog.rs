use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{blog, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::blog::*;
use crate::state::AppState;
use crate::utils::id::{new_id, parse_id};

#[utoipa::path(
    get,
    path = "/api/blogs",
    tag = "Blogs",
    operation_id = "listBlogs",
    summary = "List all blogs",
    description = "Returns every blog in creation order, each with its owner expanded to `{id, username, name}`.",
    responses(
        (status = 200, description = "All blogs", body = Vec<BlogResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = blog::Entity::find()
        .order_by_asc(blog::Column::CreatedAt)
        .order_by_asc(blog::Column::Id)
        .all(&state.db)
        .await?;

    let owners = load_owners(&state.db, &blogs).await?;

    let data = blogs
        .into_iter()
        .map(|b| {
            let owner = b.user_id.and_then(|id| owners.get(&id).cloned());
            BlogResponse::with_owner(b, owner)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Get a blog by ID",
    params(("id" = String, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog details", body = BlogResponse),
        (status = 400, description = "Malformed id (MALFORMED_ID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse>, AppError> {
    let id = parse_id(&id)?;
    let model = find_blog(&state.db, id).await?;

    let mut owners = load_owners(&state.db, std::slice::from_ref(&model)).await?;
    let owner = model.user_id.and_then(|uid| owners.remove(&uid));

    Ok(Json(BlogResponse::with_owner(model, owner)))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Create a new blog",
    description = "Creates a blog owned by the authenticated user. `title` and `url` are required; `likes` defaults to 0.",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_blog = validate_create_blog(payload)?;

    let txn = state.db.begin().await?;

    // A token can outlive its user; treat that the same as a bad token.
    let owner = user::Entity::find_by_id(auth_user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %auth_user.username, "Token subject has no user");
            AppError::TokenInvalid
        })?;

    let model = blog::ActiveModel {
        id: Set(new_id()),
        title: Set(new_blog.title),
        author: Set(new_blog.author),
        url: Set(new_blog.url),
        likes: Set(new_blog.likes),
        comments: Set(comments_to_json(Vec::new())),
        user_id: Set(Some(owner.id)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(blog_id = %model.id, "Blog created");
    Ok((StatusCode::CREATED, Json(BlogResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "updateBlog",
    summary = "Update an existing blog",
    description = "Replaces the provided fields only. An empty payload returns the current blog unchanged. The owner cannot be changed.",
    params(("id" = String, Path, description = "Blog ID")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, MALFORMED_ID)", body = ErrorBody),
        (status = 401, description = "Unauthorized, ownership enforcement only (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, ownership enforcement only (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth, payload))]
pub async fn update_blog(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateBlogRequest>,
) -> Result<Json<BlogResponse>, AppError> {
    let id = parse_id(&id)?;
    validate_update_blog(&payload)?;

    let txn = state.db.begin().await?;

    let existing = find_blog(&txn, id).await?;
    authorize_owner(&state, auth.as_ref(), &existing)?;

    if payload == UpdateBlogRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: blog::ActiveModel = existing.into();

    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(author) = payload.author {
        active.author = Set(author);
    }
    if let Some(url) = payload.url {
        active.url = Set(url);
    }
    if let Some(likes) = payload.likes {
        active.likes = Set(likes);
    }
    if let Some(comments) = payload.comments {
        active.comments = Set(comments_to_json(comments));
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    operation_id = "deleteBlog",
    summary = "Delete a blog by ID",
    description = "Deletes the blog if it exists. Repeated deletes succeed with 204.",
    params(("id" = String, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Blog deleted or already absent"),
        (status = 400, description = "Malformed id (MALFORMED_ID)", body = ErrorBody),
        (status = 401, description = "Unauthorized, ownership enforcement only (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, ownership enforcement only (PERMISSION_DENIED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth))]
pub async fn delete_blog(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;

    let txn = state.db.begin().await?;

    if state.config.auth.enforce_ownership
        && let Some(existing) = blog::Entity::find_by_id(id).one(&txn).await?
    {
        authorize_owner(&state, auth.as_ref(), &existing)?;
    }

    let result = blog::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    tracing::debug!(rows = result.rows_affected, "Blog delete");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/blogs/{id}/comments",
    tag = "Blogs",
    operation_id = "setBlogComments",
    summary = "Replace a blog's comments",
    description = "Replaces the blog's comment list with the provided one.",
    params(("id" = String, Path, description = "Blog ID")),
    request_body = CommentsRequest,
    responses(
        (status = 201, description = "Comments stored", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, MALFORMED_ID)", body = ErrorBody),
        (status = 401, description = "Unauthorized, ownership enforcement only (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, ownership enforcement only (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth, payload))]
pub async fn set_comments(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CommentsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let comments = validate_comments(payload)?;

    let txn = state.db.begin().await?;

    let existing = find_blog(&txn, id).await?;
    authorize_owner(&state, auth.as_ref(), &existing)?;

    let mut active: blog::ActiveModel = existing.into();
    active.comments = Set(comments_to_json(comments));
    let model = active.update(&txn).await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(BlogResponse::from(model))))
}

async fn find_blog<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))
}

/// Only enforced when `auth.enforce_ownership` is set.
fn authorize_owner(
    state: &AppState,
    auth: Option<&AuthUser>,
    blog: &blog::Model,
) -> Result<(), AppError> {
    if !state.config.auth.enforce_ownership {
        return Ok(());
    }
    let auth = auth.ok_or(AppError::TokenMissing)?;
    if blog.user_id != Some(auth.user_id) {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

/// Fetch the `{id, username, name}` projection for every owner referenced by `blogs`.
async fn load_owners<C: ConnectionTrait>(
    db: &C,
    blogs: &[blog::Model],
) -> Result<HashMap<Uuid, OwnerSummary>, AppError> {
    let ids: HashSet<Uuid> = blogs.iter().filter_map(|b| b.user_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let owners = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .column(user::Column::Name)
        .filter(user::Column::Id.is_in(ids))
        .into_model::<OwnerSummary>()
        .all(db)
        .await?;

    Ok(owners.into_iter().map(|o| (o.id, o)).collect())
}
