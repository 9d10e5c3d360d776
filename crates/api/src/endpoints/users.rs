//! Users endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::Serialize;
use taiwanstay_common::AppResult;
use taiwanstay_core::UpdateProfileInput;
use taiwanstay_db::entities::user::{self, UserRole};

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::{self, ApiResponse, Done},
};

/// Public user profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            avatar_url: user.avatar_url,
            bio: user.bio,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// The caller's own account, including private fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<user::Model> for AccountResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar_url: user.avatar_url,
            bio: user.bio,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Get a user by ID.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Update the caller's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateProfileInput>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let updated = state.user_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Delete the caller's account.
async fn delete_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Done>> {
    state.user_service.delete_account(&user.id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", patch(update_me).delete(delete_me))
        .route("/{id}", get(show))
}
