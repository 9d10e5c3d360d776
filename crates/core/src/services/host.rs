//! Host organization profiles.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{host, host::HostType, user, user::UserRole},
    repositories::{HostListFilter, HostRepository},
};

/// Input for creating a host.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(max = 8192))]
    pub description: Option<String>,
    pub host_type: HostType,
    #[validate(length(min = 1, max = 128))]
    pub city: String,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
}

/// Input for updating a host. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHostInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(length(max = 8192))]
    pub description: Option<String>,
    pub host_type: Option<HostType>,
    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Clone)]
pub struct HostService {
    host_repo: HostRepository,
    id_gen: IdGenerator,
}

impl HostService {
    #[must_use]
    pub const fn new(host_repo: HostRepository) -> Self {
        Self {
            host_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a host owned by the caller. HOST or ADMIN only.
    pub async fn create(&self, caller: &user::Model, input: CreateHostInput) -> AppResult<host::Model> {
        input.validate()?;

        if caller.role == UserRole::Volunteer {
            return Err(AppError::Forbidden(
                "Only host accounts can create a host profile".to_string(),
            ));
        }

        let model = host::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(caller.id.clone()),
            name: Set(input.name),
            description: Set(input.description),
            host_type: Set(input.host_type),
            city: Set(input.city),
            address: Set(input.address),
            contact_email: Set(input.contact_email),
            website: Set(input.website),
            is_verified: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            deleted_at: Set(None),
        };

        let host = self.host_repo.create(model).await?;
        info!(host_id = %host.id, user_id = %caller.id, "Host created");
        Ok(host)
    }

    pub async fn get(&self, id: &str) -> AppResult<host::Model> {
        self.host_repo.get_by_id(id).await
    }

    pub async fn list(&self, filter: &HostListFilter) -> AppResult<Vec<host::Model>> {
        self.host_repo.list(filter).await
    }

    /// Load a host the caller may manage.
    pub async fn get_managed(&self, caller: &user::Model, id: &str) -> AppResult<host::Model> {
        let host = self.host_repo.get_by_id(id).await?;
        if host.user_id != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "You do not manage this host".to_string(),
            ));
        }
        Ok(host)
    }

    pub async fn update(
        &self,
        caller: &user::Model,
        id: &str,
        input: UpdateHostInput,
    ) -> AppResult<host::Model> {
        input.validate()?;
        let host = self.get_managed(caller, id).await?;
        let mut active: host::ActiveModel = host.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(host_type) = input.host_type {
            active.host_type = Set(host_type);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(contact_email) = input.contact_email {
            active.contact_email = Set(Some(contact_email));
        }
        if let Some(website) = input.website {
            active.website = Set(Some(website));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.host_repo.update(active).await
    }

    pub async fn delete(&self, caller: &user::Model, id: &str) -> AppResult<()> {
        self.get_managed(caller, id).await?;
        self.host_repo.soft_delete(id).await?;
        info!(host_id = %id, "Host deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use taiwanstay_db::test_utils::fixtures;

    fn service(db: MockDatabase) -> HostService {
        HostService::new(HostRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_volunteer_cannot_create_host() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let result = svc
            .create(
                &volunteer,
                CreateHostInput {
                    name: "My Farm".to_string(),
                    description: None,
                    host_type: HostType::Farm,
                    city: "Taitung".to_string(),
                    address: None,
                    contact_email: None,
                    website: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_other_host_cannot_update() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::host("h1", "owner")]]),
        );
        let intruder = fixtures::user("other", UserRole::Host);
        let result = svc
            .update(&intruder, "h1", UpdateHostInput::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_manages_any_host() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::host("h1", "owner")]]),
        );
        let admin = fixtures::user("admin", UserRole::Admin);
        let host = svc.get_managed(&admin, "h1").await.unwrap();
        assert_eq!(host.user_id, "owner");
    }
}
