//! Review endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use taiwanstay_common::AppResult;
use taiwanstay_core::CreateReviewInput;
use taiwanstay_db::{
    entities::review::{self, ReviewTarget},
    repositories::RatingSummary,
};

use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::{self, ApiResponse, Done},
};

/// Review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub application_id: String,
    pub author_id: String,
    pub target_type: ReviewTarget,
    pub target_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<review::Model> for ReviewResponse {
    fn from(review: review::Model) -> Self {
        Self {
            id: review.id,
            application_id: review.application_id,
            author_id: review.author_id,
            target_type: review.target_type,
            target_id: review.target_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// `?targetType=HOST&targetId=...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetQuery {
    pub target_type: ReviewTarget,
    pub target_id: String,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.create(&user, req).await?;
    Ok(ApiResponse::created(review.into()))
}

async fn list(
    State(state): State<AppState>,
    Query(target): Query<TargetQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let reviews = state
        .review_service
        .list(target.target_type, &target.target_id, page.limit(), page.offset())
        .await?;
    Ok(ApiResponse::ok(reviews.into_iter().map(Into::into).collect()))
}

async fn summary(
    State(state): State<AppState>,
    Query(target): Query<TargetQuery>,
) -> AppResult<ApiResponse<RatingSummary>> {
    let summary = state
        .review_service
        .summary(target.target_type, &target.target_id)
        .await?;
    Ok(ApiResponse::ok(summary))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Done>> {
    state.review_service.delete(&user, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/summary", get(summary))
        .route("/{id}", delete(remove))
}
