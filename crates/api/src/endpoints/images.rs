//! Image endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use taiwanstay_common::AppResult;
use taiwanstay_core::{RegisterImageInput, SignedUpload};
use taiwanstay_db::entities::image::{self, ImagePurpose};

use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::{self, ApiResponse, Done},
};

/// Image response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: String,
    pub public_id: String,
    pub url: String,
    pub width: i32,
    pub height: i32,
    pub format: String,
    pub bytes: i64,
    pub purpose: ImagePurpose,
    pub created_at: String,
}

impl From<image::Model> for ImageResponse {
    fn from(image: image::Model) -> Self {
        Self {
            id: image.id,
            public_id: image.public_id,
            url: image.url,
            width: image.width,
            height: image.height,
            format: image.format,
            bytes: image.bytes,
            purpose: image.purpose,
            created_at: image.created_at.to_rfc3339(),
        }
    }
}

/// Sign request.
#[derive(Debug, Default, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub purpose: ImagePurpose,
}

/// Get parameters for a direct upload to the CDN.
async fn sign(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignRequest>,
) -> AppResult<ApiResponse<SignedUpload>> {
    let signed = state.media_service.sign_upload(&user, req.purpose)?;
    Ok(ApiResponse::ok(signed))
}

/// Record a finished upload.
async fn register(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterImageInput>,
) -> AppResult<ApiResponse<ImageResponse>> {
    let image = state.media_service.register(&user, req).await?;
    Ok(ApiResponse::created(image.into()))
}

async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ImageResponse>>> {
    let images = state
        .media_service
        .list_mine(&user, page.limit(), page.offset())
        .await?;
    Ok(ApiResponse::ok(images.into_iter().map(Into::into).collect()))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Done>> {
    state.media_service.delete(&user, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/sign", post(sign))
        .route("/mine", get(mine))
        .route("/{id}", delete(remove))
}
