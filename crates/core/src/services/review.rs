//! Reviews left by participants of a completed stay.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{
        application::ApplicationStatus,
        review::{self, ReviewTarget},
        user,
    },
    repositories::{ApplicationRepository, RatingSummary, ReviewRepository},
};

/// Input for leaving a review.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    #[validate(length(min = 1, max = 32))]
    pub application_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    application_repo: ApplicationRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    #[must_use]
    pub const fn new(review_repo: ReviewRepository, application_repo: ApplicationRepository) -> Self {
        Self {
            review_repo,
            application_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Review the other side of a completed application.
    ///
    /// The applicant reviews the host organization; the host user reviews
    /// the volunteer. One review per author and application.
    pub async fn create(
        &self,
        caller: &user::Model,
        input: CreateReviewInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        let application = self.application_repo.get_by_id(&input.application_id).await?;

        let (target_type, target_id) = if caller.id == application.applicant_id {
            (ReviewTarget::Host, application.host_id.clone())
        } else if caller.id == application.host_user_id {
            (ReviewTarget::Volunteer, application.applicant_id.clone())
        } else {
            return Err(AppError::Forbidden(
                "Only participants of the stay can review it".to_string(),
            ));
        };

        if application.status != ApplicationStatus::Completed {
            return Err(AppError::BadRequest(
                "Only completed stays can be reviewed".to_string(),
            ));
        }

        if self
            .review_repo
            .exists_for(&application.id, &caller.id)
            .await?
        {
            return Err(AppError::Conflict(
                "You already reviewed this stay".to_string(),
            ));
        }

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            application_id: Set(application.id),
            author_id: Set(caller.id.clone()),
            target_type: Set(target_type),
            target_id: Set(target_id),
            rating: Set(input.rating),
            comment: Set(input.comment.filter(|c| !c.trim().is_empty())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            deleted_at: Set(None),
        };

        let review = self.review_repo.create(model).await?;
        info!(review_id = %review.id, target_id = %review.target_id, "Review created");
        Ok(review)
    }

    pub async fn list(
        &self,
        target_type: ReviewTarget,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        self.review_repo
            .list_for_target(target_type, target_id, limit, offset)
            .await
    }

    pub async fn summary(
        &self,
        target_type: ReviewTarget,
        target_id: &str,
    ) -> AppResult<RatingSummary> {
        self.review_repo.summary(target_type, target_id).await
    }

    /// Remove a review. Author or admin only.
    pub async fn delete(&self, caller: &user::Model, id: &str) -> AppResult<()> {
        let review = self.review_repo.get_by_id(id).await?;
        if review.author_id != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "Only the author can delete this review".to_string(),
            ));
        }
        self.review_repo.soft_delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use taiwanstay_db::entities::user::UserRole;
    use taiwanstay_db::test_utils::fixtures;

    fn service(db: MockDatabase) -> ReviewService {
        let conn = Arc::new(db.into_connection());
        ReviewService::new(
            ReviewRepository::new(conn.clone()),
            ApplicationRepository::new(conn),
        )
    }

    fn input(rating: i16) -> CreateReviewInput {
        CreateReviewInput {
            application_id: "a1".to_string(),
            rating,
            comment: Some("Lovely family, great food".to_string()),
        }
    }

    fn review_row(id: &str, author: &str, target_type: ReviewTarget, target_id: &str) -> review::Model {
        review::Model {
            id: id.to_string(),
            application_id: "a1".to_string(),
            author_id: author.to_string(),
            target_type,
            target_id: target_id.to_string(),
            rating: 5,
            comment: None,
            created_at: Utc::now().into(),
            updated_at: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc.create(&volunteer, input(6)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stay_must_be_completed() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Confirmed);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc.create(&volunteer, input(5)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_outsider_cannot_review() {
        let outsider = fixtures::user("x1", UserRole::Volunteer);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Completed);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc.create(&outsider, input(4)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_duplicate_review() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Completed);
        let existing = review_row("r1", "v1", ReviewTarget::Host, "host1");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[app]])
                .append_query_results([[existing]]),
        );

        let result = svc.create(&volunteer, input(5)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_host_reviews_volunteer() {
        let host = fixtures::user("h1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Completed);
        let created = review_row("r2", "h1", ReviewTarget::Volunteer, "v1");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[app]])
                .append_query_results([Vec::<review::Model>::new()])
                .append_query_results([[created]]),
        );

        let review = svc.create(&host, input(5)).await.unwrap();
        assert_eq!(review.target_type, ReviewTarget::Volunteer);
        assert_eq!(review.target_id, "v1");
    }

    #[tokio::test]
    async fn test_only_author_deletes() {
        let other = fixtures::user("v2", UserRole::Volunteer);
        let existing = review_row("r1", "v1", ReviewTarget::Host, "host1");
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]));

        let result = svc.delete(&other, "r1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
