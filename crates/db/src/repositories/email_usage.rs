//! Daily email usage counters.

use std::sync::Arc;

use crate::entities::{EmailUsage, email_usage};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    DatabaseConnection, EntityTrait, Set,
    sea_query::{Expr, OnConflict},
};
use taiwanstay_common::{AppError, AppResult};

/// Email usage repository.
#[derive(Clone)]
pub struct EmailUsageRepository {
    db: Arc<DatabaseConnection>,
}

impl EmailUsageRepository {
    /// Create a new email usage repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Messages sent through `provider` on `day`.
    pub async fn count_for(&self, provider: &str, day: NaiveDate) -> AppResult<i32> {
        let row = EmailUsage::find_by_id(email_usage::usage_key(provider, day))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.map_or(0, |r| r.count))
    }

    /// Add one to the counter, creating today's row on first use.
    pub async fn increment(&self, provider: &str, day: NaiveDate) -> AppResult<()> {
        let model = email_usage::ActiveModel {
            id: Set(email_usage::usage_key(provider, day)),
            provider: Set(provider.to_string()),
            day: Set(day),
            count: Set(1),
            updated_at: Set(Utc::now().into()),
        };

        EmailUsage::insert(model)
            .on_conflict(
                OnConflict::column(email_usage::Column::Id)
                    .value(
                        email_usage::Column::Count,
                        Expr::col((EmailUsage, email_usage::Column::Count)).add(1),
                    )
                    .value(email_usage::Column::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_count_for_missing_row_is_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<email_usage::Model>::new()])
                .into_connection(),
        );

        let repo = EmailUsageRepository::new(db);
        assert_eq!(repo.count_for("sendgrid", day()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_upserts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EmailUsageRepository::new(db.clone());
        repo.increment("mailgun", day()).await.unwrap();

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("mailgun:2025-05-01"));
    }
}
