//! Opportunity listings and their status lifecycle.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use taiwanstay_common::{AppError, AppResult, IdGenerator};
use taiwanstay_db::{
    entities::{
        StatusHistoryEntry, opportunity,
        opportunity::OpportunityStatus,
        user::{self, UserRole},
    },
    repositories::{HostRepository, OpportunityListFilter, OpportunityRepository, UserRepository},
};

use super::email::{EmailNotificationType, EmailService, EmailTemplateVars};
use crate::status::{
    self, Roles, Transition, authorize_transition, opportunity_roles, parse_target,
    validate_transition,
};

/// Input for creating an opportunity.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityInput {
    #[validate(length(min = 1, max = 32))]
    pub host_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    /// Defaults to the host's city.
    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,
    #[validate(range(min = 1, max = 80))]
    pub work_hours_per_week: Option<i32>,
    #[validate(range(min = 1))]
    pub min_stay_days: Option<i32>,
    #[validate(range(min = 1))]
    pub max_stay_days: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub positions: Option<i32>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Content edit. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,
    #[validate(range(min = 1, max = 80))]
    pub work_hours_per_week: Option<i32>,
    #[validate(range(min = 1))]
    pub min_stay_days: Option<i32>,
    #[validate(range(min = 1))]
    pub max_stay_days: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub positions: Option<i32>,
    pub benefits: Option<Vec<String>>,
}

/// Requested status change.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeInput {
    /// Target status, e.g. `ACTIVE`.
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Which route a status change arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    /// Host-facing route; the caller acts with every role they hold.
    Owner,
    /// Admin route; the caller must be an admin and acts only as one.
    Admin,
}

/// Transitions the caller may perform from the current status.
#[derive(Debug, Clone)]
pub struct AvailableActions<S: 'static> {
    pub current: S,
    pub actions: Vec<&'static Transition<S>>,
}

fn clean_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

#[derive(Clone)]
pub struct OpportunityService {
    opportunity_repo: OpportunityRepository,
    host_repo: HostRepository,
    user_repo: UserRepository,
    email: EmailService,
    id_gen: IdGenerator,
    site_url: String,
}

impl OpportunityService {
    #[must_use]
    pub fn new(
        opportunity_repo: OpportunityRepository,
        host_repo: HostRepository,
        user_repo: UserRepository,
        email: EmailService,
        site_url: &str,
    ) -> Self {
        Self {
            opportunity_repo,
            host_repo,
            user_repo,
            email,
            id_gen: IdGenerator::new(),
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a draft listing for a host the caller manages.
    pub async fn create(
        &self,
        caller: &user::Model,
        input: CreateOpportunityInput,
    ) -> AppResult<opportunity::Model> {
        input.validate()?;

        let host = self.host_repo.get_by_id(&input.host_id).await?;
        let manages_host = caller.role == UserRole::Host && host.user_id == caller.id;
        if !manages_host && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "You do not manage this host".to_string(),
            ));
        }

        if let (Some(min), Some(max)) = (input.min_stay_days, input.max_stay_days) {
            if min > max {
                return Err(AppError::Validation(
                    "minStayDays cannot exceed maxStayDays".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let initial = StatusHistoryEntry {
            status: OpportunityStatus::Draft,
            reason: None,
            changed_by: caller.id.clone(),
            changed_at: now,
        };

        let model = opportunity::ActiveModel {
            id: Set(self.id_gen.generate()),
            host_id: Set(host.id),
            user_id: Set(host.user_id),
            title: Set(input.title),
            description: Set(input.description),
            city: Set(input.city.unwrap_or(host.city)),
            work_hours_per_week: Set(input.work_hours_per_week),
            min_stay_days: Set(input.min_stay_days),
            max_stay_days: Set(input.max_stay_days),
            positions: Set(input.positions.unwrap_or(1)),
            benefits: Set(serde_json::json!(input.benefits)),
            status: Set(OpportunityStatus::Draft),
            status_history: Set(initial.as_append_value()),
            published_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let opportunity = self.opportunity_repo.create(model).await?;
        info!(opportunity_id = %opportunity.id, host_id = %opportunity.host_id, "Opportunity created");
        Ok(opportunity)
    }

    /// Fetch an opportunity the viewer is allowed to see.
    ///
    /// Non-public listings look missing to everyone but their owner and admins.
    pub async fn get(
        &self,
        viewer: Option<&user::Model>,
        id: &str,
    ) -> AppResult<opportunity::Model> {
        let opportunity = self.opportunity_repo.get_by_id(id).await?;
        if opportunity.status.is_public() {
            return Ok(opportunity);
        }

        let roles = viewer.map(|v| opportunity_roles(v, &opportunity));
        match roles {
            Some(r) if r.owner || r.admin => Ok(opportunity),
            _ => Err(AppError::NotFound(format!("Opportunity {id}"))),
        }
    }

    /// Public listing: ACTIVE only.
    pub async fn list_public(
        &self,
        mut filter: OpportunityListFilter,
    ) -> AppResult<Vec<opportunity::Model>> {
        filter.status = Some(OpportunityStatus::Active);
        filter.user_id = None;
        self.opportunity_repo.list(&filter).await
    }

    /// Listings owned by the caller, in any status.
    pub async fn list_mine(
        &self,
        caller: &user::Model,
        mut filter: OpportunityListFilter,
    ) -> AppResult<Vec<opportunity::Model>> {
        filter.user_id = Some(caller.id.clone());
        self.opportunity_repo.list(&filter).await
    }

    /// Moderation queue.
    pub async fn admin_list(
        &self,
        caller: &user::Model,
        filter: OpportunityListFilter,
    ) -> AppResult<Vec<opportunity::Model>> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        self.opportunity_repo.list(&filter).await
    }

    /// Edit listing content. Status is not touched.
    pub async fn edit(
        &self,
        caller: &user::Model,
        id: &str,
        input: UpdateOpportunityInput,
    ) -> AppResult<opportunity::Model> {
        input.validate()?;

        let opportunity = self.opportunity_repo.get_by_id(id).await?;
        let roles = opportunity_roles(caller, &opportunity);
        if !(roles.owner || roles.admin) {
            return Err(AppError::Forbidden(
                "Only the owner can edit this opportunity".to_string(),
            ));
        }
        if matches!(
            opportunity.status,
            OpportunityStatus::Deleted | OpportunityStatus::Archived
        ) {
            return Err(AppError::BadRequest(format!(
                "Cannot edit an opportunity in {} status",
                opportunity.status
            )));
        }

        let min = input.min_stay_days.or(opportunity.min_stay_days);
        let max = input.max_stay_days.or(opportunity.max_stay_days);
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(AppError::Validation(
                    "minStayDays cannot exceed maxStayDays".to_string(),
                ));
            }
        }

        let mut active: opportunity::ActiveModel = opportunity.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(hours) = input.work_hours_per_week {
            active.work_hours_per_week = Set(Some(hours));
        }
        if let Some(min) = input.min_stay_days {
            active.min_stay_days = Set(Some(min));
        }
        if let Some(max) = input.max_stay_days {
            active.max_stay_days = Set(Some(max));
        }
        if let Some(positions) = input.positions {
            active.positions = Set(positions);
        }
        if let Some(benefits) = input.benefits {
            active.benefits = Set(serde_json::json!(benefits));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.opportunity_repo.update(active).await
    }

    /// Change the status of an opportunity.
    ///
    /// Checks run in order: existence, admin scope, permission for the
    /// transition, validity of the transition, presence of a required reason.
    /// The write appends to the history; there is no guard against a
    /// concurrent change, so the last writer decides the final status.
    pub async fn update_status(
        &self,
        caller: &user::Model,
        id: &str,
        input: StatusChangeInput,
        scope: UpdateScope,
    ) -> AppResult<opportunity::Model> {
        let current = self.opportunity_repo.get_by_id(id).await?;

        if scope == UpdateScope::Admin && !caller.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        let roles = match scope {
            UpdateScope::Owner => opportunity_roles(caller, &current),
            UpdateScope::Admin => Roles {
                admin: true,
                ..Default::default()
            },
        };

        let target = parse_target(current.status, &input.status, roles)?;
        authorize_transition(current.status, target, roles)?;
        validate_transition(current.status, target, input.reason.as_deref())?;

        let entry = StatusHistoryEntry {
            status: target,
            reason: clean_reason(input.reason),
            changed_by: caller.id.clone(),
            changed_at: Utc::now(),
        };

        let updated = self.opportunity_repo.apply_status_change(id, &entry).await?;

        info!(
            opportunity_id = %id,
            from = %current.status,
            to = %target,
            changed_by = %caller.id,
            "Opportunity status changed"
        );

        self.notify_status_change(current.status, &updated, entry.reason.as_deref())
            .await;

        Ok(updated)
    }

    /// Transitions the caller may perform right now.
    pub async fn available_actions(
        &self,
        caller: &user::Model,
        id: &str,
    ) -> AppResult<AvailableActions<OpportunityStatus>> {
        let opportunity = self.get(Some(caller), id).await?;
        let roles = opportunity_roles(caller, &opportunity);
        Ok(AvailableActions {
            current: opportunity.status,
            actions: status::available_actions(opportunity.status, roles),
        })
    }

    async fn notify_status_change(
        &self,
        from: OpportunityStatus,
        opportunity: &opportunity::Model,
        reason: Option<&str>,
    ) {
        let kind = match (from, opportunity.status) {
            (OpportunityStatus::Pending, OpportunityStatus::Active) => {
                EmailNotificationType::OpportunityApproved
            }
            (_, OpportunityStatus::Rejected) => EmailNotificationType::OpportunityRejected,
            (_, OpportunityStatus::AdminPaused) => EmailNotificationType::OpportunityAdminPaused,
            _ => return,
        };
        if !self.email.is_enabled() {
            return;
        }

        let owner = match self.user_repo.find_by_id(&opportunity.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load opportunity owner for email");
                return;
            }
        };

        self.email
            .notify(
                kind,
                &owner.email,
                EmailTemplateVars {
                    user_name: Some(owner.name),
                    opportunity_title: Some(opportunity.title.clone()),
                    reason: reason.map(str::to_string),
                    action_url: Some(format!(
                        "{}/opportunities/{}",
                        self.site_url, opportunity.id
                    )),
                    ..Default::default()
                },
            )
            .await;
    }
}
