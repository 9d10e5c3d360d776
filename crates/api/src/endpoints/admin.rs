//! Admin moderation endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use taiwanstay_common::AppResult;
use taiwanstay_core::{NewsletterInput, NewsletterReport, StatusChangeInput, UpdateScope};
use taiwanstay_db::repositories::OpportunityListFilter;

use super::opportunities::{OpportunityResponse, OpportunityStatusResponse, StatusQuery};
use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::ApiResponse,
};

/// Moderation queue, e.g. `?status=PENDING`.
async fn list_opportunities(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(status): Query<StatusQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<OpportunityResponse>>> {
    let filter = OpportunityListFilter {
        status: status.parse()?,
        limit: page.limit(),
        offset: page.offset(),
        ..Default::default()
    };
    let opportunities = state.opportunity_service.admin_list(&user, filter).await?;
    Ok(ApiResponse::ok(
        opportunities.into_iter().map(Into::into).collect(),
    ))
}

/// Approve, reject, suspend or reinstate a listing.
async fn update_opportunity_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<StatusChangeInput>,
) -> AppResult<Json<OpportunityStatusResponse>> {
    let opportunity = state
        .opportunity_service
        .update_status(&user, &id, req, UpdateScope::Admin)
        .await?;
    Ok(Json(opportunity.into()))
}

/// Send a newsletter through the marketing email slot.
async fn send_newsletter(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewsletterInput>,
) -> AppResult<ApiResponse<NewsletterReport>> {
    let report = state.user_service.send_newsletter(&user, req).await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/opportunities", get(list_opportunities))
        .route("/opportunities/{id}/status", patch(update_opportunity_status))
        .route("/newsletter", post(send_newsletter))
}
