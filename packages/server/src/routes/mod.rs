use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/blogs", blog_routes())
        .nest("/users", user_routes())
        .route("/login", post(handlers::login::login))
}

fn blog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::blog::list_blogs).post(handlers::blog::create_blog),
        )
        .route(
            "/{id}",
            get(handlers::blog::get_blog)
                .put(handlers::blog::update_blog)
                .delete(handlers::blog::delete_blog),
        )
        .route("/{id}/comments", post(handlers::blog::set_comments))
}

fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::user::list_users).post(handlers::user::create_user),
    )
}
