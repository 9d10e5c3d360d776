//! Application endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taiwanstay_common::{AppError, AppResult};
use taiwanstay_core::{ApplicationStatusInput, CreateApplicationInput, Lifecycle};
use taiwanstay_db::{
    entities::{
        StatusHistoryEntry,
        application::{
            self, ApplicationStatus, CancellationDetail, CompletionDetail, ReviewDetail,
        },
    },
    repositories::ApplicationListFilter,
};

use super::opportunities::ActionsResponse;
use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::ApiResponse,
};

/// Application response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub applicant_id: String,
    pub opportunity_id: String,
    pub host_id: String,
    pub host_user_id: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub message: String,
    pub review: Option<ReviewDetail>,
    pub cancellation: Option<CancellationDetail>,
    pub completion: Option<CompletionDetail>,
    pub status_history: Vec<StatusHistoryEntry<ApplicationStatus>>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(application: application::Model) -> Self {
        Self {
            status_history: application.history(),
            review: application.review_detail(),
            cancellation: application.cancellation_detail(),
            completion: application.completion_detail(),
            status_label: application.status.label(),
            id: application.id,
            applicant_id: application.applicant_id,
            opportunity_id: application.opportunity_id,
            host_id: application.host_id,
            host_user_id: application.host_user_id,
            status: application.status,
            start_date: application.start_date,
            end_date: application.end_date,
            message: application.message,
            created_at: application.created_at.to_rfc3339(),
            updated_at: application.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Status route response: `{"success": true, "application": ...}`.
#[derive(Serialize)]
pub struct ApplicationStatusResponse {
    pub success: bool,
    pub application: ApplicationResponse,
}

/// `?status=&opportunityId=` filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    pub status: Option<String>,
    pub opportunity_id: Option<String>,
}

impl ListApplicationsQuery {
    fn into_filter(self, page: Pagination) -> AppResult<ApplicationListFilter> {
        let status = self
            .status
            .as_deref()
            .map(|s| s.parse::<ApplicationStatus>().map_err(AppError::BadRequest))
            .transpose()?;
        Ok(ApplicationListFilter {
            status,
            opportunity_id: self.opportunity_id,
            limit: page.limit(),
            offset: page.offset(),
            ..Default::default()
        })
    }
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateApplicationInput>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state.application_service.create(&user, req).await?;
    Ok(ApiResponse::created(application.into()))
}

/// Applications the caller submitted.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state
        .application_service
        .list_mine(&user, query.into_filter(page)?)
        .await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

/// Applications to the caller's listings.
async fn received(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state
        .application_service
        .list_received(&user, query.into_filter(page)?)
        .await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state.application_service.get(&user, &id).await?;
    Ok(ApiResponse::ok(application.into()))
}

async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ApplicationStatusInput>,
) -> AppResult<Json<ApplicationStatusResponse>> {
    let application = state
        .application_service
        .update_status(&user, &id, req)
        .await?;
    Ok(Json(ApplicationStatusResponse {
        success: true,
        application: application.into(),
    }))
}

async fn actions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ActionsResponse<ApplicationStatus>>> {
    let available = state.application_service.available_actions(&user, &id).await?;
    Ok(ApiResponse::ok(available.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/mine", get(mine))
        .route("/received", get(received))
        .route("/{id}", get(show))
        .route("/{id}/status", put(update_status))
        .route("/{id}/status/actions", get(actions))
}
