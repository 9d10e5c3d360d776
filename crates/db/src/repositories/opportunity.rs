//! Opportunity repository.

use std::sync::Arc;

use crate::entities::{
    Opportunity, StatusHistoryEntry, opportunity, opportunity::OpportunityStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use taiwanstay_common::{AppError, AppResult};

/// Filters for listing opportunities.
#[derive(Debug, Clone, Default)]
pub struct OpportunityListFilter {
    pub status: Option<OpportunityStatus>,
    pub city: Option<String>,
    pub host_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// Opportunity repository for database operations.
#[derive(Clone)]
pub struct OpportunityRepository {
    db: Arc<DatabaseConnection>,
}

impl OpportunityRepository {
    /// Create a new opportunity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an opportunity by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<opportunity::Model>> {
        Opportunity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an opportunity by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<opportunity::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Opportunity {id}")))
    }

    /// List opportunities, newest first.
    pub async fn list(
        &self,
        filter: &OpportunityListFilter,
    ) -> AppResult<Vec<opportunity::Model>> {
        let mut query = Opportunity::find();

        if let Some(status) = filter.status {
            query = query.filter(opportunity::Column::Status.eq(status));
        }
        if let Some(city) = &filter.city {
            query = query.filter(opportunity::Column::City.eq(city.as_str()));
        }
        if let Some(host_id) = &filter.host_id {
            query = query.filter(opportunity::Column::HostId.eq(host_id.as_str()));
        }
        if let Some(user_id) = &filter.user_id {
            query = query.filter(opportunity::Column::UserId.eq(user_id.as_str()));
        }

        query
            .order_by_desc(opportunity::Column::CreatedAt)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count opportunities in a status.
    pub async fn count_by_status(&self, status: OpportunityStatus) -> AppResult<u64> {
        Opportunity::find()
            .filter(opportunity::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new opportunity.
    pub async fn create(&self, model: opportunity::ActiveModel) -> AppResult<opportunity::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update opportunity content.
    pub async fn update(&self, model: opportunity::ActiveModel) -> AppResult<opportunity::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the status and append `entry` to the history in one UPDATE, then
    /// re-read the row.
    ///
    /// The first move to ACTIVE also stamps `published_at`. No guard on the
    /// previous status is applied: concurrent writers both succeed and both
    /// history entries are kept.
    pub async fn apply_status_change(
        &self,
        id: &str,
        entry: &StatusHistoryEntry<OpportunityStatus>,
    ) -> AppResult<opportunity::Model> {
        let changed_at: sea_orm::prelude::DateTimeWithTimeZone = entry.changed_at.into();

        let mut update = Opportunity::update_many()
            .col_expr(opportunity::Column::Status, Expr::value(entry.status))
            .col_expr(
                opportunity::Column::StatusHistory,
                Expr::cust_with_values(
                    "\"status_history\" || $1::jsonb",
                    [entry.as_append_value()],
                ),
            )
            .col_expr(opportunity::Column::UpdatedAt, Expr::value(changed_at));

        if entry.status == OpportunityStatus::Active {
            update = update.col_expr(
                opportunity::Column::PublishedAt,
                Expr::cust_with_values("COALESCE(\"published_at\", $1)", [changed_at]),
            );
        }

        let result = update
            .filter(opportunity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Opportunity {id}")));
        }

        self.get_by_id(id).await
    }
}
