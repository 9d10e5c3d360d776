//! Application repository.

use std::sync::Arc;

use crate::entities::{
    Application, StatusHistoryEntry, application,
    application::{ApplicationStatus, StatusDetail},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use taiwanstay_common::{AppError, AppResult};

/// Filters for listing applications.
#[derive(Debug, Clone, Default)]
pub struct ApplicationListFilter {
    pub applicant_id: Option<String>,
    pub host_user_id: Option<String>,
    pub opportunity_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub limit: u64,
    pub offset: u64,
}

/// Application repository for database operations.
#[derive(Clone)]
pub struct ApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl ApplicationRepository {
    /// Create a new application repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an application by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<application::Model>> {
        Application::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an application by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<application::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id}")))
    }

    /// Find a live (non-terminal) application by this applicant for an opportunity.
    pub async fn find_open_for(
        &self,
        applicant_id: &str,
        opportunity_id: &str,
    ) -> AppResult<Option<application::Model>> {
        Application::find()
            .filter(application::Column::ApplicantId.eq(applicant_id))
            .filter(application::Column::OpportunityId.eq(opportunity_id))
            .filter(application::Column::Status.is_not_in([
                ApplicationStatus::Cancelled,
                ApplicationStatus::Completed,
                ApplicationStatus::Withdrawn,
                ApplicationStatus::Rejected,
            ]))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List applications, newest first.
    pub async fn list(
        &self,
        filter: &ApplicationListFilter,
    ) -> AppResult<Vec<application::Model>> {
        let mut query = Application::find();

        if let Some(applicant_id) = &filter.applicant_id {
            query = query.filter(application::Column::ApplicantId.eq(applicant_id.as_str()));
        }
        if let Some(host_user_id) = &filter.host_user_id {
            query = query.filter(application::Column::HostUserId.eq(host_user_id.as_str()));
        }
        if let Some(opportunity_id) = &filter.opportunity_id {
            query = query.filter(application::Column::OpportunityId.eq(opportunity_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(application::Column::Status.eq(status));
        }

        query
            .order_by_desc(application::Column::CreatedAt)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new application.
    pub async fn create(&self, model: application::ActiveModel) -> AppResult<application::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the status, append `entry` to the history and write the optional
    /// sub-record in one UPDATE, then re-read the row.
    pub async fn apply_status_change(
        &self,
        id: &str,
        entry: &StatusHistoryEntry<ApplicationStatus>,
        detail: Option<&StatusDetail>,
    ) -> AppResult<application::Model> {
        let changed_at: sea_orm::prelude::DateTimeWithTimeZone = entry.changed_at.into();

        let mut update = Application::update_many()
            .col_expr(application::Column::Status, Expr::value(entry.status))
            .col_expr(
                application::Column::StatusHistory,
                Expr::cust_with_values(
                    "\"status_history\" || $1::jsonb",
                    [entry.as_append_value()],
                ),
            )
            .col_expr(application::Column::UpdatedAt, Expr::value(changed_at));

        if let Some(detail) = detail {
            update = update.col_expr(detail.column(), Expr::value(detail.to_json()));
        }

        let result = update
            .filter(application::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Application {id}")));
        }

        self.get_by_id(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::application::CancellationDetail;
    use crate::test_utils::fixtures;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_apply_status_change_writes_detail_column() {
        let now = Utc::now();
        let detail = StatusDetail::Cancellation(CancellationDetail {
            cancelled_by: "host1".to_string(),
            cancelled_at: now,
            reason: Some("Farm closed for typhoon repairs".to_string()),
        });
        let mut updated =
            fixtures::application("a1", "vol1", "host1", ApplicationStatus::Cancelled);
        updated.cancellation = Some(detail.to_json());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let repo = ApplicationRepository::new(db.clone());
        let entry = StatusHistoryEntry {
            status: ApplicationStatus::Cancelled,
            reason: Some("Farm closed for typhoon repairs".to_string()),
            changed_by: "host1".to_string(),
            changed_at: now,
        };
        let result = repo
            .apply_status_change("a1", &entry, Some(&detail))
            .await
            .unwrap();

        assert_eq!(result.status, ApplicationStatus::Cancelled);
        assert_eq!(
            result.cancellation_detail().unwrap().cancelled_by,
            "host1"
        );

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(format!("{:?}", log[0]).contains("cancellation"));
    }

    #[tokio::test]
    async fn test_list_received() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    fixtures::application("a1", "vol1", "host1", ApplicationStatus::Pending),
                    fixtures::application("a2", "vol2", "host1", ApplicationStatus::Reviewing),
                ]])
                .into_connection(),
        );

        let repo = ApplicationRepository::new(db);
        let received = repo
            .list(&ApplicationListFilter {
                host_user_id: Some("host1".to_string()),
                limit: 20,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|a| a.host_user_id == "host1"));
    }
}
