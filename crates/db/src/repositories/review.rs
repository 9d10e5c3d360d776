//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review, review::ReviewTarget};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use serde::Serialize;
use taiwanstay_common::{AppError, AppResult};

/// Aggregate rating for a review target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub count: i64,
    pub average: Option<f64>,
}

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review by ID, ignoring deleted ones.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .filter(review::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a review by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<review::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {id}")))
    }

    /// Check whether the author already reviewed this application.
    pub async fn exists_for(&self, application_id: &str, author_id: &str) -> AppResult<bool> {
        let found = Review::find()
            .filter(review::Column::ApplicationId.eq(application_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// List reviews about a target, newest first.
    pub async fn list_for_target(
        &self,
        target_type: ReviewTarget,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::TargetType.eq(target_type))
            .filter(review::Column::TargetId.eq(target_id))
            .filter(review::Column::DeletedAt.is_null())
            .order_by_desc(review::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count and average rating of a target.
    pub async fn summary(
        &self,
        target_type: ReviewTarget,
        target_id: &str,
    ) -> AppResult<RatingSummary> {
        let summary = Review::find()
            .select_only()
            .column_as(Expr::col(review::Column::Id).count(), "count")
            .column_as(Expr::cust("AVG(\"rating\")::float8"), "average")
            .filter(review::Column::TargetType.eq(target_type))
            .filter(review::Column::TargetId.eq(target_id))
            .filter(review::Column::DeletedAt.is_null())
            .into_model::<RatingSummary>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(summary.unwrap_or_default())
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Soft delete a review.
    pub async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let model = review::ActiveModel {
            id: Set(id.to_string()),
            deleted_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_summary() {
        let row = BTreeMap::from([
            ("count".to_string(), Value::BigInt(Some(4))),
            ("average".to_string(), Value::Double(Some(4.5))),
        ]);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let summary = repo.summary(ReviewTarget::Host, "h1").await.unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, Some(4.5));
    }
}
