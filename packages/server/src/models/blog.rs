use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::blog;
use crate::error::AppError;

use super::shared::{double_option, require_text, validate_likes};

/// Request body for creating a blog.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBlogRequest {
    /// Blog title (required).
    #[schema(example = "Go To Statement Considered Harmful")]
    pub title: Option<String>,
    /// Author name.
    #[schema(example = "Edsger W. Dijkstra")]
    pub author: Option<String>,
    /// Link to the blog post (required).
    #[schema(example = "https://homepages.cwi.nl/~storm/teaching/reader/Dijkstra68.pdf")]
    pub url: Option<String>,
    /// Initial like count. Defaults to 0.
    #[schema(example = 5)]
    pub likes: Option<i32>,
}

/// Request body for `PUT /api/blogs/{id}`. Only provided fields are changed.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    /// `null` clears the author.
    #[serde(default, deserialize_with = "double_option")]
    pub author: Option<Option<String>>,
    pub url: Option<String>,
    #[schema(example = 100)]
    pub likes: Option<i32>,
    pub comments: Option<Vec<String>>,
}

/// Request body for `POST /api/blogs/{id}/comments`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommentsRequest {
    /// Replaces the blog's comment list.
    #[schema(example = json!(["great read", "thanks"]))]
    pub comments: Option<Vec<String>>,
}

/// Validated create payload.
pub struct NewBlog {
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i32,
}

pub fn validate_create_blog(req: CreateBlogRequest) -> Result<NewBlog, AppError> {
    let title = require_text(req.title.as_deref(), "title")?.to_string();
    let url = require_text(req.url.as_deref(), "url")?.to_string();
    let likes = req.likes.unwrap_or(0);
    validate_likes(likes)?;

    Ok(NewBlog {
        title,
        author: req.author,
        url,
        likes,
    })
}

pub fn validate_update_blog(req: &UpdateBlogRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        require_text(Some(title.as_str()), "title")?;
    }
    if let Some(ref url) = req.url {
        require_text(Some(url.as_str()), "url")?;
    }
    if let Some(likes) = req.likes {
        validate_likes(likes)?;
    }
    Ok(())
}

pub fn validate_comments(req: CommentsRequest) -> Result<Vec<String>, AppError> {
    req.comments
        .ok_or_else(|| AppError::Validation("`comments` is required".into()))
}

/// Owner projection embedded in list and detail responses.
#[derive(Clone, Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct OwnerSummary {
    pub id: Uuid,
    #[schema(example = "mluukkai")]
    pub username: String,
    #[schema(example = "Matti Luukkainen")]
    pub name: String,
}

/// The `user` field of a blog: a bare id on write responses, the projected
/// owner on reads.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum BlogOwner {
    Id(Uuid),
    Expanded(OwnerSummary),
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BlogResponse {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i32,
    pub comments: Vec<String>,
    /// `null` for blogs without an owner.
    pub user: Option<BlogOwner>,
    pub created_at: DateTime<Utc>,
}

impl BlogResponse {
    /// Build a response with the owner expanded from `owner`.
    pub fn with_owner(m: blog::Model, owner: Option<OwnerSummary>) -> Self {
        let mut resp = Self::from(m);
        resp.user = owner.map(BlogOwner::Expanded);
        resp
    }
}

impl From<blog::Model> for BlogResponse {
    fn from(m: blog::Model) -> Self {
        Self {
            id: m.id,
            comments: comments_from_json(m.comments),
            title: m.title,
            author: m.author,
            url: m.url,
            likes: m.likes,
            user: m.user_id.map(BlogOwner::Id),
            created_at: m.created_at,
        }
    }
}

/// Decode the stored comment array. Non-string entries are dropped.
pub fn comments_from_json(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn comments_to_json(comments: Vec<String>) -> serde_json::Value {
    serde_json::Value::from(comments)
}
