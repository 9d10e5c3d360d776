//! Host organization endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use taiwanstay_common::AppResult;
use taiwanstay_core::{CreateHostInput, UpdateHostInput};
use taiwanstay_db::{
    entities::host::{self, HostType},
    repositories::HostListFilter,
};

use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::{self, ApiResponse, Done},
};

/// Host response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub host_type: HostType,
    pub city: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<host::Model> for HostResponse {
    fn from(host: host::Model) -> Self {
        Self {
            id: host.id,
            user_id: host.user_id,
            name: host.name,
            description: host.description,
            host_type: host.host_type,
            city: host.city,
            address: host.address,
            contact_email: host.contact_email,
            website: host.website,
            is_verified: host.is_verified,
            created_at: host.created_at.to_rfc3339(),
            updated_at: host.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// `GET /hosts` filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHostsQuery {
    pub city: Option<String>,
    pub user_id: Option<String>,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateHostInput>,
) -> AppResult<ApiResponse<HostResponse>> {
    let host = state.host_service.create(&user, req).await?;
    Ok(ApiResponse::created(host.into()))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListHostsQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<HostResponse>>> {
    let filter = HostListFilter {
        city: query.city,
        user_id: query.user_id,
        limit: page.limit(),
        offset: page.offset(),
    };
    let hosts = state.host_service.list(&filter).await?;
    Ok(ApiResponse::ok(hosts.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<HostResponse>> {
    let host = state.host_service.get(&id).await?;
    Ok(ApiResponse::ok(host.into()))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateHostInput>,
) -> AppResult<ApiResponse<HostResponse>> {
    let host = state.host_service.update(&user, &id, req).await?;
    Ok(ApiResponse::ok(host.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Done>> {
    state.host_service.delete(&user, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
}
