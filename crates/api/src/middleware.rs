//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use taiwanstay_common::Config;
use taiwanstay_core::{
    ApplicationService, EmailService, HostService, MediaService, OpportunityService,
    ReviewService, UserService,
};
use taiwanstay_db::repositories::{
    ApplicationRepository, EmailUsageRepository, HostRepository, ImageRepository,
    OpportunityRepository, ReviewRepository, UserRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub host_service: HostService,
    pub opportunity_service: OpportunityService,
    pub application_service: ApplicationService,
    pub review_service: ReviewService,
    pub media_service: MediaService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let site_url = config.server.url.as_str();

        let user_repo = UserRepository::new(Arc::clone(&db));
        let host_repo = HostRepository::new(Arc::clone(&db));
        let opportunity_repo = OpportunityRepository::new(Arc::clone(&db));
        let application_repo = ApplicationRepository::new(Arc::clone(&db));
        let review_repo = ReviewRepository::new(Arc::clone(&db));
        let image_repo = ImageRepository::new(Arc::clone(&db));
        let email_usage_repo = EmailUsageRepository::new(Arc::clone(&db));

        let email = EmailService::new(config.email.clone(), email_usage_repo, site_url.to_string());

        Self {
            user_service: UserService::new(user_repo.clone(), email.clone()),
            host_service: HostService::new(host_repo.clone()),
            opportunity_service: OpportunityService::new(
                opportunity_repo.clone(),
                host_repo,
                user_repo.clone(),
                email.clone(),
                site_url,
            ),
            application_service: ApplicationService::new(
                application_repo.clone(),
                opportunity_repo,
                user_repo,
                email,
                site_url,
            ),
            review_service: ReviewService::new(review_repo, application_repo),
            media_service: MediaService::new(image_repo, config.media.clone()),
        }
    }
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <token>` puts the user into the request
/// extensions. Missing or unknown tokens pass through anonymously; routes
/// that need a user reject via [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    if let Some(token) = token {
        if let Ok(user) = state.user_service.authenticate_by_token(&token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
