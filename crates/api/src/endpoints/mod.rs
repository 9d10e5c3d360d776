//! API endpoints.

mod admin;
mod applications;
mod auth;
mod hosts;
mod images;
pub mod opportunities;
mod reviews;
mod users;

use axum::{Router, extract::DefaultBodyLimit};

use crate::middleware::AppState;
use crate::response;

/// Largest accepted request body. Images go straight to the CDN, so only
/// JSON documents pass through here.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/hosts", hosts::router())
        .nest("/opportunities", opportunities::router())
        .nest("/admin", admin::router())
        .nest("/applications", applications::router())
        .nest("/reviews", reviews::router())
        .nest("/images", images::router())
        .method_not_allowed_fallback(response::method_not_allowed)
        .fallback(response::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
