//! Which status buttons a viewer should be offered.

use taiwanstay_core::{Roles, Transition, available_actions};
use taiwanstay_db::entities::{
    application::ApplicationStatus, opportunity::OpportunityStatus, user::UserRole,
};

use crate::types::{Application, Opportunity};

/// The signed-in user looking at an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub role: UserRole,
}

impl Viewer {
    fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Transitions `viewer` may perform on `opportunity`.
#[must_use]
pub fn available_opportunity_actions(
    opportunity: &Opportunity,
    viewer: &Viewer,
) -> Vec<&'static Transition<OpportunityStatus>> {
    let roles = Roles {
        owner: viewer.role == UserRole::Host && viewer.user_id == opportunity.user_id,
        counterparty: false,
        admin: viewer.is_admin(),
    };
    available_actions(opportunity.status, roles)
}

/// Transitions `viewer` may perform on `application`.
#[must_use]
pub fn available_application_actions(
    application: &Application,
    viewer: &Viewer,
) -> Vec<&'static Transition<ApplicationStatus>> {
    let roles = Roles {
        owner: viewer.user_id == application.applicant_id,
        counterparty: viewer.user_id == application.host_user_id,
        admin: viewer.is_admin(),
    };
    available_actions(application.status, roles)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn opportunity(user_id: &str, status: OpportunityStatus) -> Opportunity {
        Opportunity {
            id: "o1".to_string(),
            host_id: "host1".to_string(),
            user_id: user_id.to_string(),
            title: "Tea harvest helper".to_string(),
            description: String::new(),
            city: "Hualien".to_string(),
            work_hours_per_week: None,
            min_stay_days: None,
            max_stay_days: None,
            positions: 1,
            benefits: vec![],
            status,
            status_label: String::new(),
            status_history: vec![],
            published_at: None,
            created_at: String::new(),
            updated_at: None,
        }
    }

    fn application(status: ApplicationStatus) -> Application {
        Application {
            id: "a1".to_string(),
            applicant_id: "v1".to_string(),
            opportunity_id: "o1".to_string(),
            host_id: "host1".to_string(),
            host_user_id: "h1".to_string(),
            status,
            status_label: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            message: String::new(),
            review: None,
            cancellation: None,
            completion: None,
            status_history: vec![],
            created_at: String::new(),
            updated_at: None,
        }
    }

    fn viewer(id: &str, role: UserRole) -> Viewer {
        Viewer {
            user_id: id.to_string(),
            role,
        }
    }

    fn targets<S: Copy>(actions: &[&Transition<S>]) -> Vec<S> {
        actions.iter().map(|t| t.to).collect()
    }

    #[test]
    fn test_owner_sees_host_actions_only() {
        let opp = opportunity("h1", OpportunityStatus::Active);
        let actions = available_opportunity_actions(&opp, &viewer("h1", UserRole::Host));
        let to = targets(&actions);
        assert!(to.contains(&OpportunityStatus::Paused));
        assert!(to.contains(&OpportunityStatus::Filled));
        assert!(!to.contains(&OpportunityStatus::AdminPaused));
    }

    #[test]
    fn test_admin_sees_moderation_actions() {
        let opp = opportunity("h1", OpportunityStatus::Pending);
        let actions = available_opportunity_actions(&opp, &viewer("a1", UserRole::Admin));
        let approve = actions
            .iter()
            .find(|t| t.to == OpportunityStatus::Active)
            .unwrap();
        assert_eq!(approve.label, "Approve");
        let reject = actions
            .iter()
            .find(|t| t.to == OpportunityStatus::Rejected)
            .unwrap();
        assert!(reject.requires_reason);
    }

    #[test]
    fn test_other_host_sees_nothing() {
        let opp = opportunity("h1", OpportunityStatus::Active);
        assert!(available_opportunity_actions(&opp, &viewer("h2", UserRole::Host)).is_empty());
    }

    #[test]
    fn test_volunteer_owning_id_is_not_owner() {
        let opp = opportunity("v1", OpportunityStatus::Draft);
        assert!(available_opportunity_actions(&opp, &viewer("v1", UserRole::Volunteer)).is_empty());
    }

    #[test]
    fn test_application_sides() {
        let app = application(ApplicationStatus::Pending);

        let applicant = targets(&available_application_actions(
            &app,
            &viewer("v1", UserRole::Volunteer),
        ));
        assert_eq!(applicant, vec![ApplicationStatus::Withdrawn]);

        let host = targets(&available_application_actions(&app, &viewer("h1", UserRole::Host)));
        assert!(host.contains(&ApplicationStatus::Accepted));
        assert!(!host.contains(&ApplicationStatus::Withdrawn));
    }
}
