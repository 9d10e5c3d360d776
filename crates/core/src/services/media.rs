//! Image uploads to the media CDN.
//!
//! Clients upload straight to the CDN with parameters signed here, then
//! register the resulting asset so it can be referenced and cleaned up.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use validator::Validate;

use taiwanstay_common::config::MediaSettings;
use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{image, image::ImagePurpose, user},
    repositories::ImageRepository,
};

/// Parameters for a direct upload to the CDN.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub upload_url: String,
    pub api_key: String,
    pub timestamp: i64,
    pub folder: String,
    pub signature: String,
    pub expires_at: i64,
}

/// Metadata reported by the client after a finished upload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterImageInput {
    #[validate(length(min = 1, max = 512))]
    pub public_id: String,
    #[validate(url, length(max = 1024))]
    pub url: String,
    #[validate(range(min = 1, max = 20000))]
    pub width: i32,
    #[validate(range(min = 1, max = 20000))]
    pub height: i32,
    #[validate(length(min = 1, max = 16))]
    pub format: String,
    #[validate(range(min = 1))]
    pub bytes: i64,
    #[serde(default)]
    pub purpose: ImagePurpose,
}

/// Media service.
#[derive(Clone)]
pub struct MediaService {
    image_repo: ImageRepository,
    settings: Option<MediaSettings>,
    id_gen: IdGenerator,
}

/// hex(SHA-256(sorted `k=v` pairs joined by `&`, followed by the secret)).
#[must_use]
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl MediaService {
    #[must_use]
    pub fn new(image_repo: ImageRepository, settings: Option<MediaSettings>) -> Self {
        Self {
            image_repo,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    fn settings(&self) -> AppResult<&MediaSettings> {
        self.settings
            .as_ref()
            .ok_or_else(|| AppError::Config("Media uploads are not configured".to_string()))
    }

    fn folder_for(settings: &MediaSettings, owner_id: &str, purpose: ImagePurpose) -> String {
        format!("{}/{}/{}", settings.upload_folder, purpose.folder(), owner_id)
    }

    /// Sign a direct upload into the caller's folder.
    pub fn sign_upload(&self, owner: &user::Model, purpose: ImagePurpose) -> AppResult<SignedUpload> {
        let settings = self.settings()?;
        let folder = Self::folder_for(settings, &owner.id, purpose);
        let timestamp = Utc::now().timestamp();

        let signature = sign_params(
            &[("folder", folder.clone()), ("timestamp", timestamp.to_string())],
            &settings.api_secret,
        );

        Ok(SignedUpload {
            upload_url: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                settings.cloud_name
            ),
            api_key: settings.api_key.clone(),
            timestamp,
            folder,
            signature,
            expires_at: timestamp + settings.upload_ttl_secs,
        })
    }

    /// Record an uploaded image.
    pub async fn register(
        &self,
        owner: &user::Model,
        input: RegisterImageInput,
    ) -> AppResult<image::Model> {
        input.validate()?;
        let settings = self.settings()?;

        let cdn_prefix = format!("https://res.cloudinary.com/{}/", settings.cloud_name);
        if !input.url.starts_with(&cdn_prefix) {
            return Err(AppError::BadRequest(
                "Image URL is not on the media CDN".to_string(),
            ));
        }

        let folder = Self::folder_for(settings, &owner.id, input.purpose);
        if !input.public_id.starts_with(&format!("{folder}/")) {
            return Err(AppError::Forbidden(
                "Image was not uploaded to your folder".to_string(),
            ));
        }

        if self
            .image_repo
            .find_by_public_id(&input.public_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Image already registered".to_string()));
        }

        let model = image::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner.id.clone()),
            public_id: Set(input.public_id),
            url: Set(input.url),
            width: Set(input.width),
            height: Set(input.height),
            format: Set(input.format.to_lowercase()),
            bytes: Set(input.bytes),
            purpose: Set(input.purpose),
            created_at: Set(Utc::now().into()),
            deleted_at: Set(None),
        };

        let image = self.image_repo.create(model).await?;
        info!(image_id = %image.id, owner_id = %owner.id, "Image registered");
        Ok(image)
    }

    /// Images owned by the caller.
    pub async fn list_mine(
        &self,
        owner: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<image::Model>> {
        self.image_repo.find_by_owner(&owner.id, limit, offset).await
    }

    /// Soft delete an image. Owner or admin only.
    pub async fn delete(&self, caller: &user::Model, id: &str) -> AppResult<()> {
        let image = self.image_repo.get_by_id(id).await?;
        if image.owner_id != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "Only the owner can delete this image".to_string(),
            ));
        }
        self.image_repo.soft_delete(id).await
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

    fn settings() -> MediaSettings {
        MediaSettings {
            cloud_name: "taiwanstay".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            upload_folder: "ts".to_string(),
            upload_ttl_secs: 3600,
        }
    }

    fn service(db: MockDatabase, settings: Option<MediaSettings>) -> MediaService {
        MediaService::new(
            ImageRepository::new(Arc::new(db.into_connection())),
            settings,
        )
    }

    #[test]
    fn test_sign_params_sorted_and_hex() {
        let sig = sign_params(
            &[("timestamp", "1700000000".to_string()), ("folder", "ts".to_string())],
            "secret",
        );
        let expected = {
            let mut h = Sha256::new();
            h.update(b"folder=ts&timestamp=1700000000secret");
            hex::encode(h.finalize())
        };
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_sign_upload_uses_owner_folder() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres), Some(settings()));
        let owner = fixtures::user("u1", UserRole::Host);

        let signed = svc.sign_upload(&owner, ImagePurpose::Opportunity).unwrap();

        assert_eq!(signed.folder, "ts/opportunities/u1");
        assert_eq!(signed.expires_at - signed.timestamp, 3600);
        assert!(signed.upload_url.ends_with("/taiwanstay/image/upload"));
    }

    #[test]
    fn test_sign_upload_without_config() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres), None);
        let owner = fixtures::user("u1", UserRole::Host);
        assert!(matches!(
            svc.sign_upload(&owner, ImagePurpose::Avatar),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_foreign_folder() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres), Some(settings()));
        let owner = fixtures::user("u1", UserRole::Volunteer);

        let result = svc
            .register(
                &owner,
                RegisterImageInput {
                    public_id: "ts/avatars/someone-else/pic".to_string(),
                    url: "https://res.cloudinary.com/taiwanstay/image/upload/v1/ts/avatars/someone-else/pic.jpg".to_string(),
                    width: 100,
                    height: 100,
                    format: "jpg".to_string(),
                    bytes: 2048,
                    purpose: ImagePurpose::Avatar,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_non_cdn_url() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres), Some(settings()));
        let owner = fixtures::user("u1", UserRole::Volunteer);

        let result = svc
            .register(
                &owner,
                RegisterImageInput {
                    public_id: "ts/avatars/u1/pic".to_string(),
                    url: "https://evil.example/pic.jpg".to_string(),
                    width: 100,
                    height: 100,
                    format: "jpg".to_string(),
                    bytes: 2048,
                    purpose: ImagePurpose::Avatar,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
