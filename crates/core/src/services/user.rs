//! User accounts and sessions.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{user, user::UserRole},
    repositories::UserRepository,
};

use super::email::{EmailNotificationType, EmailService, EmailTemplateVars, NewsletterReport};

/// Input for creating a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(email, length(max = 320))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    /// VOLUNTEER or HOST. Admin accounts cannot be self-registered.
    #[serde(default)]
    pub role: UserRole,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating a profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(url, length(max = 1024))]
    pub avatar_url: Option<String>,
}

/// Input for an admin newsletter.
#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterInput {
    #[validate(length(min = 1, max = 20000))]
    pub body: String,

    /// Only send to accounts with this role.
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// A user together with a fresh session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: user::Model,
    pub token: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    email: EmailService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, email: EmailService) -> Self {
        Self {
            user_repo,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and open a session.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Session> {
        input.validate()?;

        if input.role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be registered".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email.clone()),
            name: Set(input.name.trim().to_string()),
            role: Set(input.role),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            avatar_url: Set(None),
            bio: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            deleted_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, role = %user.role.as_str(), "User signed up");

        self.email
            .notify(
                EmailNotificationType::Welcome,
                &email,
                EmailTemplateVars {
                    user_name: Some(user.name.clone()),
                    ..Default::default()
                },
            )
            .await;

        Ok(Session { user, token })
    }

    /// Verify credentials and rotate the session token.
    pub async fn signin(&self, input: SigninInput) -> AppResult<Session> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(&user.id, Some(token.clone())).await?;

        Ok(Session { user, token })
    }

    /// Revoke the current session.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update the caller's profile.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Delete the caller's account.
    pub async fn delete_account(&self, id: &str) -> AppResult<()> {
        self.user_repo.soft_delete(id).await?;
        info!(user_id = %id, "User deleted account");
        Ok(())
    }

    /// Send a newsletter to every active account, or to one role.
    pub async fn send_newsletter(
        &self,
        caller: &user::Model,
        input: NewsletterInput,
    ) -> AppResult<NewsletterReport> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        input.validate()?;
        if !self.email.is_enabled() {
            return Err(AppError::Config("Email service not configured".to_string()));
        }

        let recipients: Vec<String> = self
            .user_repo
            .list_active(input.role)
            .await?
            .into_iter()
            .map(|u| u.email)
            .collect();

        info!(
            admin_id = %caller.id,
            recipients = recipients.len(),
            "Sending newsletter"
        );
        self.email
            .send_newsletter(&recipients, input.body.trim())
            .await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use taiwanstay_db::repositories::EmailUsageRepository;
    use taiwanstay_db::test_utils::fixtures;

    fn service(db: MockDatabase) -> UserService {
        let conn = Arc::new(db.into_connection());
        let email = EmailService::new(
            None,
            EmailUsageRepository::new(conn.clone()),
            "https://taiwanstay.example".to_string(),
        );
        UserService::new(UserRepository::new(conn), email)
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signup_rejects_admin_role() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .signup(SignupInput {
                email: "boss@example.com".to_string(),
                password: "password123".to_string(),
                name: "Boss".to_string(),
                role: UserRole::Admin,
            })
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let existing = fixtures::user("u1", UserRole::Volunteer);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );
        let result = svc
            .signup(SignupInput {
                email: "U1@example.com".to_string(),
                password: "password123".to_string(),
                name: "Again".to_string(),
                role: UserRole::Volunteer,
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_signin_rotates_token() {
        let mut user = fixtures::user("u1", UserRole::Volunteer);
        user.password_hash = hash_password("password123").unwrap();
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        let session = svc
            .signin(SigninInput {
                email: "u1@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.user.id, "u1");
        assert_ne!(session.token, "token-u1");
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let mut user = fixtures::user("u1", UserRole::Volunteer);
        user.password_hash = hash_password("password123").unwrap();
        let svc =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        let result = svc
            .signin(SigninInput {
                email: "u1@example.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );
        assert!(matches!(
            svc.authenticate_by_token("bogus").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_newsletter_requires_admin() {
        let host = fixtures::user("h1", UserRole::Host);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .send_newsletter(
                &host,
                NewsletterInput {
                    body: "Hello".to_string(),
                    role: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_newsletter_needs_email_configured() {
        let admin = fixtures::user("a1", UserRole::Admin);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .send_newsletter(
                &admin,
                NewsletterInput {
                    body: "Hello".to_string(),
                    role: Some(UserRole::Volunteer),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
