//! Typed HTTP client for the TaiwanStay API.
//!
//! Fetched opportunities and applications are kept in a small in-memory
//! cache. Any successful status change drops the changed entity and every
//! cached list before storing the fresh copy returned by the server.

#![allow(missing_docs)]

mod actions;
mod cache;
mod types;

pub use actions::{Viewer, available_application_actions, available_opportunity_actions};
pub use types::{Application, Opportunity, OpportunityQuery};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use taiwanstay_db::entities::{
    application::ApplicationStatus, opportunity::OpportunityStatus,
};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use cache::EntityCache;
use types::{ApplicationEnvelope, DataEnvelope, ErrorBody, OpportunityEnvelope};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Serialize)]
struct OpportunityStatusBody<'a> {
    status: OpportunityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
struct ApplicationStatusBody<'a> {
    status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

/// TaiwanStay API client.
#[derive(Clone)]
pub struct TaiwanStayClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    cache: Arc<RwLock<EntityCache>>,
}

impl TaiwanStayClient {
    /// Create a client for the API mounted at `base_url`, e.g.
    /// `https://taiwanstay.example/api`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::with_http_client(http, base_url)
    }

    pub fn with_http_client(http: Client, base_url: &str) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            token: None,
            cache: Arc::new(RwLock::new(EntityCache::default())),
        })
    }

    /// Use `token` as the bearer token for every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Fetch an opportunity, serving it from the cache when present.
    pub async fn get_opportunity(&self, id: &str) -> ClientResult<Opportunity> {
        if let Some(hit) = self.cache.read().await.opportunity(id) {
            return Ok(hit);
        }

        let envelope: DataEnvelope<Opportunity> = self
            .send(self.request(Method::GET, &format!("opportunities/{id}"))?)
            .await?;
        self.cache.write().await.store_opportunity(envelope.data.clone());
        Ok(envelope.data)
    }

    /// Public listing of ACTIVE opportunities.
    pub async fn list_opportunities(
        &self,
        query: &OpportunityQuery,
    ) -> ClientResult<Vec<Opportunity>> {
        let key = query.cache_key();
        if let Some(hit) = self.cache.read().await.list(&key) {
            return Ok(hit);
        }

        let envelope: DataEnvelope<Vec<Opportunity>> = self
            .send(self.request(Method::GET, "opportunities")?.query(query))
            .await?;
        self.cache.write().await.store_list(key, envelope.data.clone());
        Ok(envelope.data)
    }

    /// Change an opportunity's status through the host route.
    pub async fn update_opportunity_status(
        &self,
        id: &str,
        status: OpportunityStatus,
        reason: Option<&str>,
    ) -> ClientResult<Opportunity> {
        self.change_opportunity_status(&format!("opportunities/{id}/status"), id, status, reason)
            .await
    }

    /// Change an opportunity's status through the admin route.
    pub async fn admin_update_opportunity_status(
        &self,
        id: &str,
        status: OpportunityStatus,
        reason: Option<&str>,
    ) -> ClientResult<Opportunity> {
        self.change_opportunity_status(
            &format!("admin/opportunities/{id}/status"),
            id,
            status,
            reason,
        )
        .await
    }

    /// Fetch an application, serving it from the cache when present.
    pub async fn get_application(&self, id: &str) -> ClientResult<Application> {
        if let Some(hit) = self.cache.read().await.application(id) {
            return Ok(hit);
        }

        let envelope: DataEnvelope<Application> = self
            .send(self.request(Method::GET, &format!("applications/{id}"))?)
            .await?;
        self.cache.write().await.store_application(envelope.data.clone());
        Ok(envelope.data)
    }

    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
        note: Option<&str>,
    ) -> ClientResult<Application> {
        let envelope: ApplicationEnvelope = self
            .send(
                self.request(Method::PUT, &format!("applications/{id}/status"))?
                    .json(&ApplicationStatusBody { status, note }),
            )
            .await?;

        let mut cache = self.cache.write().await;
        cache.invalidate_application(id);
        cache.store_application(envelope.application.clone());
        Ok(envelope.application)
    }

    /// Drop everything cached.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    async fn change_opportunity_status(
        &self,
        path: &str,
        id: &str,
        status: OpportunityStatus,
        reason: Option<&str>,
    ) -> ClientResult<Opportunity> {
        let envelope: OpportunityEnvelope = self
            .send(
                self.request(Method::PATCH, path)?
                    .json(&OpportunityStatusBody { status, reason }),
            )
            .await?;

        let mut cache = self.cache.write().await;
        cache.invalidate_opportunity(id);
        cache.store_opportunity(envelope.opportunity.clone());
        Ok(envelope.opportunity)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Turn a non-2xx response into [`ClientError::Api`].
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        debug!(status = %status, message = %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
