//! Host organization repository.

use std::sync::Arc;

use crate::entities::{Host, host};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use taiwanstay_common::{AppError, AppResult};

/// Filters for listing hosts.
#[derive(Debug, Clone, Default)]
pub struct HostListFilter {
    pub city: Option<String>,
    pub user_id: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// Host repository for database operations.
#[derive(Clone)]
pub struct HostRepository {
    db: Arc<DatabaseConnection>,
}

impl HostRepository {
    /// Create a new host repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a host by ID, ignoring soft-deleted rows.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<host::Model>> {
        Host::find_by_id(id)
            .filter(host::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a host by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<host::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Host {id}")))
    }

    /// List hosts, newest first.
    pub async fn list(&self, filter: &HostListFilter) -> AppResult<Vec<host::Model>> {
        let mut query = Host::find().filter(host::Column::DeletedAt.is_null());

        if let Some(city) = &filter.city {
            query = query.filter(host::Column::City.eq(city.as_str()));
        }
        if let Some(user_id) = &filter.user_id {
            query = query.filter(host::Column::UserId.eq(user_id.as_str()));
        }

        query
            .order_by_desc(host::Column::CreatedAt)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new host.
    pub async fn create(&self, model: host::ActiveModel) -> AppResult<host::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a host.
    pub async fn update(&self, model: host::ActiveModel) -> AppResult<host::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Soft delete a host.
    pub async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let model = host::ActiveModel {
            id: Set(id.to_string()),
            deleted_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };
        self.update(model).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_list_by_city() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::host("h1", "u1"), fixtures::host("h2", "u2")]])
                .into_connection(),
        );

        let repo = HostRepository::new(db);
        let hosts = repo
            .list(&HostListFilter {
                city: Some("Hualien".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(hosts.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<host::Model>::new()])
                .into_connection(),
        );

        let repo = HostRepository::new(db);
        assert!(matches!(
            repo.get_by_id("h9").await,
            Err(AppError::NotFound(_))
        ));
    }
}
