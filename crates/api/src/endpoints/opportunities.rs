//! Opportunity endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use taiwanstay_common::{AppError, AppResult};
use taiwanstay_core::{
    AvailableActions, CreateOpportunityInput, Lifecycle, StatusChangeInput, Transition,
    UpdateOpportunityInput, UpdateScope,
};
use taiwanstay_db::{
    entities::{
        StatusHistoryEntry,
        opportunity::{self, OpportunityStatus},
    },
    repositories::OpportunityListFilter,
};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, Pagination},
    middleware::AppState,
    response::ApiResponse,
};

/// Opportunity response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityResponse {
    pub id: String,
    pub host_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub work_hours_per_week: Option<i32>,
    pub min_stay_days: Option<i32>,
    pub max_stay_days: Option<i32>,
    pub positions: i32,
    pub benefits: serde_json::Value,
    pub status: OpportunityStatus,
    pub status_label: &'static str,
    pub status_history: Vec<StatusHistoryEntry<OpportunityStatus>>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<opportunity::Model> for OpportunityResponse {
    fn from(opportunity: opportunity::Model) -> Self {
        Self {
            status_history: opportunity.history(),
            status_label: opportunity.status.label(),
            id: opportunity.id,
            host_id: opportunity.host_id,
            user_id: opportunity.user_id,
            title: opportunity.title,
            description: opportunity.description,
            city: opportunity.city,
            work_hours_per_week: opportunity.work_hours_per_week,
            min_stay_days: opportunity.min_stay_days,
            max_stay_days: opportunity.max_stay_days,
            positions: opportunity.positions,
            benefits: opportunity.benefits,
            status: opportunity.status,
            published_at: opportunity.published_at.map(|t| t.to_rfc3339()),
            created_at: opportunity.created_at.to_rfc3339(),
            updated_at: opportunity.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Status route response: `{"success": true, "opportunity": ...}`.
#[derive(Serialize)]
pub struct OpportunityStatusResponse {
    pub success: bool,
    pub opportunity: OpportunityResponse,
}

impl From<opportunity::Model> for OpportunityStatusResponse {
    fn from(opportunity: opportunity::Model) -> Self {
        Self {
            success: true,
            opportunity: opportunity.into(),
        }
    }
}

/// Actions the caller may take from the current status.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsResponse<S: Serialize + 'static> {
    pub current: S,
    pub current_label: &'static str,
    pub actions: Vec<&'static Transition<S>>,
}

impl<S: Lifecycle + Serialize> From<AvailableActions<S>> for ActionsResponse<S> {
    fn from(available: AvailableActions<S>) -> Self {
        Self {
            current: available.current,
            current_label: available.current.label(),
            actions: available.actions,
        }
    }
}

/// Public listing filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOpportunitiesQuery {
    pub city: Option<String>,
    pub host_id: Option<String>,
}

/// Optional `?status=` filter.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    pub fn parse(&self) -> AppResult<Option<OpportunityStatus>> {
        self.status
            .as_deref()
            .map(|s| s.parse().map_err(AppError::BadRequest))
            .transpose()
    }
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateOpportunityInput>,
) -> AppResult<ApiResponse<OpportunityResponse>> {
    let opportunity = state.opportunity_service.create(&user, req).await?;
    Ok(ApiResponse::created(opportunity.into()))
}

/// List ACTIVE opportunities.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListOpportunitiesQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<OpportunityResponse>>> {
    let filter = OpportunityListFilter {
        city: query.city,
        host_id: query.host_id,
        limit: page.limit(),
        offset: page.offset(),
        ..Default::default()
    };
    let opportunities = state.opportunity_service.list_public(filter).await?;
    Ok(ApiResponse::ok(
        opportunities.into_iter().map(Into::into).collect(),
    ))
}

/// List the caller's own opportunities in any status.
async fn mine(
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
    let opportunities = state.opportunity_service.list_mine(&user, filter).await?;
    Ok(ApiResponse::ok(
        opportunities.into_iter().map(Into::into).collect(),
    ))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OpportunityResponse>> {
    let opportunity = state.opportunity_service.get(viewer.as_ref(), &id).await?;
    Ok(ApiResponse::ok(opportunity.into()))
}

/// Edit listing content.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateOpportunityInput>,
) -> AppResult<ApiResponse<OpportunityResponse>> {
    let opportunity = state.opportunity_service.edit(&user, &id, req).await?;
    Ok(ApiResponse::ok(opportunity.into()))
}

/// Change status from the host side.
async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<StatusChangeInput>,
) -> AppResult<Json<OpportunityStatusResponse>> {
    let opportunity = state
        .opportunity_service
        .update_status(&user, &id, req, UpdateScope::Owner)
        .await?;
    Ok(Json(opportunity.into()))
}

async fn actions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ActionsResponse<OpportunityStatus>>> {
    let available = state.opportunity_service.available_actions(&user, &id).await?;
    Ok(ApiResponse::ok(available.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).patch(update))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/status/actions", get(actions))
}
