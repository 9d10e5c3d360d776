//! Applications from volunteers to opportunities.

use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{
        StatusHistoryEntry,
        application::{
            self, ApplicationStatus, CancellationDetail, CompletionDetail, ReviewDetail,
            StatusDetail,
        },
        opportunity::OpportunityStatus,
        user::{self, UserRole},
    },
    repositories::{
        ApplicationListFilter, ApplicationRepository, OpportunityRepository, UserRepository,
    },
};

use super::email::{EmailNotificationType, EmailService, EmailTemplateVars};
use super::opportunity::AvailableActions;
use crate::status::{
    self, Lifecycle, application_roles, authorize_transition, parse_target, validate_transition,
};

/// Input for applying to an opportunity.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationInput {
    #[validate(length(min = 1, max = 32))]
    pub opportunity_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    /// Keep the application as a draft instead of submitting it.
    #[serde(default)]
    pub draft: bool,
}

/// Requested application status change.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusInput {
    pub status: String,
    /// Stored on the review, cancellation or completion record.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct ApplicationService {
    application_repo: ApplicationRepository,
    opportunity_repo: OpportunityRepository,
    user_repo: UserRepository,
    email: EmailService,
    id_gen: IdGenerator,
    site_url: String,
}

impl ApplicationService {
    #[must_use]
    pub fn new(
        application_repo: ApplicationRepository,
        opportunity_repo: OpportunityRepository,
        user_repo: UserRepository,
        email: EmailService,
        site_url: &str,
    ) -> Self {
        Self {
            application_repo,
            opportunity_repo,
            user_repo,
            email,
            id_gen: IdGenerator::new(),
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Apply to an ACTIVE opportunity.
    pub async fn create(
        &self,
        caller: &user::Model,
        input: CreateApplicationInput,
    ) -> AppResult<application::Model> {
        input.validate()?;

        if caller.role != UserRole::Volunteer {
            return Err(AppError::Forbidden(
                "Only volunteers can apply".to_string(),
            ));
        }
        if input.end_date < input.start_date {
            return Err(AppError::Validation(
                "endDate cannot be before startDate".to_string(),
            ));
        }

        let opportunity = self.opportunity_repo.get_by_id(&input.opportunity_id).await?;
        if opportunity.status != OpportunityStatus::Active {
            return Err(AppError::BadRequest(
                "Opportunity is not accepting applications".to_string(),
            ));
        }

        let stay_days = (input.end_date - input.start_date).num_days() + 1;
        if let Some(min) = opportunity.min_stay_days {
            if stay_days < i64::from(min) {
                return Err(AppError::Validation(format!(
                    "Stay must be at least {min} days"
                )));
            }
        }
        if let Some(max) = opportunity.max_stay_days {
            if stay_days > i64::from(max) {
                return Err(AppError::Validation(format!(
                    "Stay must be at most {max} days"
                )));
            }
        }

        if self
            .application_repo
            .find_open_for(&caller.id, &opportunity.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already have an open application for this opportunity".to_string(),
            ));
        }

        let status = if input.draft {
            ApplicationStatus::Draft
        } else {
            ApplicationStatus::Pending
        };
        let now = Utc::now();
        let initial = StatusHistoryEntry {
            status,
            reason: None,
            changed_by: caller.id.clone(),
            changed_at: now,
        };

        let model = application::ActiveModel {
            id: Set(self.id_gen.generate()),
            applicant_id: Set(caller.id.clone()),
            opportunity_id: Set(opportunity.id.clone()),
            host_id: Set(opportunity.host_id.clone()),
            host_user_id: Set(opportunity.user_id.clone()),
            status: Set(status),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            message: Set(input.message),
            review: Set(None),
            cancellation: Set(None),
            completion: Set(None),
            status_history: Set(initial.as_append_value()),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let application = self.application_repo.create(model).await?;
        info!(
            application_id = %application.id,
            opportunity_id = %application.opportunity_id,
            status = %application.status,
            "Application created"
        );

        if status == ApplicationStatus::Pending {
            self.notify_host(caller, &application, &opportunity.title).await;
        }

        Ok(application)
    }

    /// Fetch an application the caller takes part in.
    pub async fn get(&self, caller: &user::Model, id: &str) -> AppResult<application::Model> {
        let application = self.application_repo.get_by_id(id).await?;
        if application_roles(caller, &application).is_empty() {
            return Err(AppError::NotFound(format!("Application {id}")));
        }
        Ok(application)
    }

    /// Applications the caller submitted.
    pub async fn list_mine(
        &self,
        caller: &user::Model,
        mut filter: ApplicationListFilter,
    ) -> AppResult<Vec<application::Model>> {
        filter.applicant_id = Some(caller.id.clone());
        filter.host_user_id = None;
        self.application_repo.list(&filter).await
    }

    /// Applications to the caller's listings.
    pub async fn list_received(
        &self,
        caller: &user::Model,
        mut filter: ApplicationListFilter,
    ) -> AppResult<Vec<application::Model>> {
        filter.host_user_id = Some(caller.id.clone());
        filter.applicant_id = None;
        self.application_repo.list(&filter).await
    }

    /// Change the status of an application.
    ///
    /// Same ordering of checks as opportunities. The note is kept both on the
    /// history entry and on the sub-record for the target status.
    pub async fn update_status(
        &self,
        caller: &user::Model,
        id: &str,
        input: ApplicationStatusInput,
    ) -> AppResult<application::Model> {
        let current = self.application_repo.get_by_id(id).await?;
        let roles = application_roles(caller, &current);

        let target = parse_target(current.status, &input.status, roles)?;
        authorize_transition(current.status, target, roles)?;
        validate_transition(current.status, target, input.note.as_deref())?;

        let note = input
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let now = Utc::now();
        let detail = status_detail(target, &caller.id, now, note.clone());
        let entry = StatusHistoryEntry {
            status: target,
            reason: note,
            changed_by: caller.id.clone(),
            changed_at: now,
        };

        let updated = self
            .application_repo
            .apply_status_change(id, &entry, detail.as_ref())
            .await?;

        info!(
            application_id = %id,
            from = %current.status,
            to = %target,
            changed_by = %caller.id,
            "Application status changed"
        );

        self.notify_status_change(caller, current.status, &updated, entry.reason.as_deref())
            .await;

        Ok(updated)
    }

    /// Transitions the caller may perform right now.
    pub async fn available_actions(
        &self,
        caller: &user::Model,
        id: &str,
    ) -> AppResult<AvailableActions<ApplicationStatus>> {
        let application = self.get(caller, id).await?;
        let roles = application_roles(caller, &application);
        Ok(AvailableActions {
            current: application.status,
            actions: status::available_actions(application.status, roles),
        })
    }

    async fn notify_status_change(
        &self,
        caller: &user::Model,
        from: ApplicationStatus,
        application: &application::Model,
        note: Option<&str>,
    ) {
        if !self.email.is_enabled() {
            return;
        }

        let title = match self.opportunity_repo.find_by_id(&application.opportunity_id).await {
            Ok(Some(opportunity)) => opportunity.title,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "Could not load opportunity for email");
                String::new()
            }
        };

        if from == ApplicationStatus::Draft && application.status == ApplicationStatus::Pending {
            self.notify_host(caller, application, &title).await;
            return;
        }

        if caller.id == application.applicant_id {
            return;
        }

        let applicant = match self.user_repo.find_by_id(&application.applicant_id).await {
            Ok(Some(applicant)) => applicant,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not load applicant for email");
                return;
            }
        };

        self.email
            .notify(
                EmailNotificationType::ApplicationStatusChanged,
                &applicant.email,
                EmailTemplateVars {
                    user_name: Some(applicant.name),
                    opportunity_title: Some(title),
                    status: Some(application.status.label().to_string()),
                    reason: note.map(str::to_string),
                    action_url: Some(format!(
                        "{}/applications/{}",
                        self.site_url, application.id
                    )),
                    ..Default::default()
                },
            )
            .await;
    }

    async fn notify_host(
        &self,
        applicant: &user::Model,
        application: &application::Model,
        opportunity_title: &str,
    ) {
        if !self.email.is_enabled() {
            return;
        }

        let host = match self.user_repo.find_by_id(&application.host_user_id).await {
            Ok(Some(host)) => host,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not load host user for email");
                return;
            }
        };

        self.email
            .notify(
                EmailNotificationType::ApplicationReceived,
                &host.email,
                EmailTemplateVars {
                    user_name: Some(host.name),
                    opportunity_title: Some(opportunity_title.to_string()),
                    applicant_name: Some(applicant.name.clone()),
                    action_url: Some(format!(
                        "{}/applications/{}",
                        self.site_url, application.id
                    )),
                    ..Default::default()
                },
            )
            .await;
    }
}

/// Sub-record written alongside a move to `target`, if any.
fn status_detail(
    target: ApplicationStatus,
    by: &str,
    at: chrono::DateTime<Utc>,
    note: Option<String>,
) -> Option<StatusDetail> {
    let by = by.to_string();
    match target {
        ApplicationStatus::Reviewing | ApplicationStatus::Accepted | ApplicationStatus::Rejected => {
            Some(StatusDetail::Review(ReviewDetail {
                reviewed_by: by,
                reviewed_at: at,
                note,
            }))
        }
        ApplicationStatus::Cancelled | ApplicationStatus::Withdrawn => {
            Some(StatusDetail::Cancellation(CancellationDetail {
                cancelled_by: by,
                cancelled_at: at,
                reason: note,
            }))
        }
        ApplicationStatus::Completed => Some(StatusDetail::Completion(CompletionDetail {
            completed_by: by,
            completed_at: at,
            note,
        })),
        ApplicationStatus::Draft | ApplicationStatus::Pending | ApplicationStatus::Confirmed => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use taiwanstay_db::repositories::EmailUsageRepository;
    use taiwanstay_db::test_utils::fixtures;

    fn service_on(conn: Arc<sea_orm::DatabaseConnection>) -> ApplicationService {
        let email = EmailService::new(
            None,
            EmailUsageRepository::new(conn.clone()),
            "https://taiwanstay.example".to_string(),
        );
        ApplicationService::new(
            ApplicationRepository::new(conn.clone()),
            OpportunityRepository::new(conn.clone()),
            UserRepository::new(conn),
            email,
            "https://taiwanstay.example",
        )
    }

    fn service(db: MockDatabase) -> ApplicationService {
        service_on(Arc::new(db.into_connection()))
    }

    fn change(status: &str, note: Option<&str>) -> ApplicationStatusInput {
        ApplicationStatusInput {
            status: status.to_string(),
            note: note.map(str::to_string),
        }
    }

    fn updated_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn apply_input(start: (u32, u32), end: (u32, u32)) -> CreateApplicationInput {
        CreateApplicationInput {
            opportunity_id: "opp1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, start.0, start.1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, end.0, end.1).unwrap(),
            message: "Keen to help".to_string(),
            draft: false,
        }
    }

    #[tokio::test]
    async fn test_applicant_cannot_accept() {
        let applicant = fixtures::user("v1", UserRole::Volunteer);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc
            .update_status(&applicant, "a1", change("ACCEPTED", None))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_stranger_forbidden_on_unknown_pair() {
        let stranger = fixtures::user("x1", UserRole::Volunteer);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc
            .update_status(&stranger, "a1", change("COMPLETED", None))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_party_gets_invalid_transition_on_unknown_pair() {
        let host = fixtures::user("h1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc.update_status(&host, "a1", change("COMPLETED", None)).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_missing_application() {
        let host = fixtures::user("h1", UserRole::Host);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<application::Model>::new()]),
        );

        let result = svc.update_status(&host, "missing", change("BOGUS", None)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_status_value() {
        let host = fixtures::user("h1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc.update_status(&host, "a1", change("BOGUS", None)).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let host = fixtures::user("h1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Accepted);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        let result = svc.update_status(&host, "a1", change("CANCELLED", None)).await;
        assert!(matches!(result, Err(AppError::ReasonRequired { .. })));
    }

    #[tokio::test]
    async fn test_host_accepts_and_review_is_written() {
        let host = fixtures::user("h1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let mut accepted = app.clone();
        accepted.status = ApplicationStatus::Accepted;

        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[app]])
                .append_exec_results([updated_ok()])
                .append_query_results([[accepted]])
                .into_connection(),
        );
        let svc = service_on(conn.clone());

        let updated = svc
            .update_status(&host, "a1", change("ACCEPTED", Some("Welcome aboard")))
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Accepted);

        drop(svc);
        let log = Arc::try_unwrap(conn).unwrap().into_transaction_log();
        let update = format!("{:?}", log[1]);
        assert!(update.contains("review"));
        assert!(update.contains("Welcome aboard"));
    }

    #[tokio::test]
    async fn test_non_party_sees_not_found() {
        let stranger = fixtures::user("x1", UserRole::Host);
        let app = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[app]]));

        assert!(matches!(
            svc.get(&stranger, "a1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_host_cannot_apply() {
        let host = fixtures::user("h2", UserRole::Host);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.create(&host, apply_input((3, 1), (3, 31))).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_apply_to_paused_listing() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let opp = fixtures::opportunity("opp1", "h1", OpportunityStatus::Paused);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[opp]]));

        let result = svc.create(&volunteer, apply_input((3, 1), (3, 31))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_stay_shorter_than_minimum() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        // fixture listing asks for at least 14 days
        let opp = fixtures::opportunity("opp1", "h1", OpportunityStatus::Active);
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[opp]]));

        let result = svc.create(&volunteer, apply_input((3, 1), (3, 5))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_open_application() {
        let volunteer = fixtures::user("v1", UserRole::Volunteer);
        let opp = fixtures::opportunity("opp1", "h1", OpportunityStatus::Active);
        let existing = fixtures::application("a1", "v1", "h1", ApplicationStatus::Pending);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[opp]])
                .append_query_results([[existing]]),
        );

        let result = svc.create(&volunteer, apply_input((3, 1), (3, 31))).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_status_detail_per_target() {
        let now = Utc::now();
        assert!(matches!(
            status_detail(ApplicationStatus::Rejected, "h1", now, None),
            Some(StatusDetail::Review(_))
        ));
        assert!(matches!(
            status_detail(ApplicationStatus::Withdrawn, "v1", now, None),
            Some(StatusDetail::Cancellation(_))
        ));
        assert!(matches!(
            status_detail(ApplicationStatus::Completed, "h1", now, None),
            Some(StatusDetail::Completion(_))
        ));
        assert!(status_detail(ApplicationStatus::Confirmed, "v1", now, None).is_none());
    }
}
