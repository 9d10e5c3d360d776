//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `taiwanstay_test`)
//!   `TEST_DB_PASSWORD` (default: `taiwanstay_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel};
use taiwanstay_db::entities::{
    StatusHistoryEntry, opportunity::OpportunityStatus, user::UserRole,
};
use taiwanstay_db::repositories::{EmailUsageRepository, OpportunityRepository};
use taiwanstay_db::test_utils::{TestDatabase, TestDbConfig, fixtures};

async fn seed_opportunity(db: &TestDatabase, status: OpportunityStatus) {
    let conn = db.connection();
    fixtures::user("u1", UserRole::Host)
        .into_active_model()
        .insert(conn)
        .await
        .unwrap();
    fixtures::host("host1", "u1")
        .into_active_model()
        .insert(conn)
        .await
        .unwrap();
    fixtures::opportunity("o1", "u1", status)
        .into_active_model()
        .insert(conn)
        .await
        .unwrap();
}

fn entry(status: OpportunityStatus, by: &str) -> StatusHistoryEntry<OpportunityStatus> {
    StatusHistoryEntry {
        status,
        reason: None,
        changed_by: by.to_string(),
        changed_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_status_change_appends_history_and_publishes_once() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_opportunity(&db, OpportunityStatus::Pending).await;
    let repo = OpportunityRepository::new(Arc::new(db.conn.clone()));

    let first = repo
        .apply_status_change("o1", &entry(OpportunityStatus::Active, "admin1"))
        .await
        .unwrap();
    let published_at = first.published_at.unwrap();

    repo.apply_status_change("o1", &entry(OpportunityStatus::Paused, "u1"))
        .await
        .unwrap();
    let resumed = repo
        .apply_status_change("o1", &entry(OpportunityStatus::Active, "u1"))
        .await
        .unwrap();

    assert_eq!(resumed.history().len(), 4);
    assert_eq!(resumed.published_at, Some(published_at));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_status_changes_both_commit() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_opportunity(&db, OpportunityStatus::Active).await;
    let repo = OpportunityRepository::new(Arc::new(db.conn.clone()));

    let a = repo.clone();
    let b = repo.clone();
    let (left, right) = tokio::join!(
        a.apply_status_change("o1", &entry(OpportunityStatus::Paused, "u1")),
        b.apply_status_change("o1", &entry(OpportunityStatus::AdminPaused, "admin1")),
    );
    assert!(left.is_ok());
    assert!(right.is_ok());

    let reloaded = repo.get_by_id("o1").await.unwrap();
    let history = reloaded.history();
    assert_eq!(history.len(), 3);
    assert!(matches!(
        reloaded.status,
        OpportunityStatus::Paused | OpportunityStatus::AdminPaused
    ));
    assert_eq!(history.last().unwrap().status, reloaded.status);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_email_usage_increment() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = EmailUsageRepository::new(Arc::new(db.conn.clone()));
    let today = Utc::now().date_naive();

    repo.increment("sendgrid", today).await.unwrap();
    repo.increment("sendgrid", today).await.unwrap();

    assert_eq!(repo.count_for("sendgrid", today).await.unwrap(), 2);
    assert_eq!(repo.count_for("mailgun", today).await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
