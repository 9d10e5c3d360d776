//! Image metadata repository.

use std::sync::Arc;

use crate::entities::{Image, image};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use taiwanstay_common::{AppError, AppResult};

/// Image repository for database operations.
#[derive(Clone)]
pub struct ImageRepository {
    db: Arc<DatabaseConnection>,
}

impl ImageRepository {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a live image by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<image::Model>> {
        Image::find_by_id(id)
            .filter(image::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an image by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<image::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {id}")))
    }

    /// Find an image by its CDN public id.
    pub async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<image::Model>> {
        Image::find()
            .filter(image::Column::PublicId.eq(public_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Images uploaded by a user, newest first.
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<image::Model>> {
        Image::find()
            .filter(image::Column::OwnerId.eq(owner_id))
            .filter(image::Column::DeletedAt.is_null())
            .order_by_desc(image::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a new image.
    pub async fn create(&self, model: image::ActiveModel) -> AppResult<image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Soft delete an image.
    pub async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let model = image::ActiveModel {
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
