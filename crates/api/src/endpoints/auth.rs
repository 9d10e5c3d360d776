//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use taiwanstay_common::AppResult;
use taiwanstay_core::{Session, SigninInput, SignupInput};

use super::users::AccountResponse;
use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::{self, ApiResponse, Done},
};

/// Session response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: AccountResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

/// Create a new account and sign in.
async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.user_service.signup(req).await?;
    Ok(ApiResponse::created(session.into()))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SigninInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.user_service.signin(req).await?;
    Ok(ApiResponse::ok(session.into()))
}

/// Get the current account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<AccountResponse> {
    ApiResponse::ok(user.into())
}

/// Revoke the current token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Done>> {
    state.user_service.signout(&user.id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/me", get(me))
        .route("/signout", post(signout))
}
