//! Application lifecycle.

use taiwanstay_db::entities::{
    application::{self, ApplicationStatus},
    user,
};

use super::{Actor, Lifecycle, Roles, Transition};

use Actor::{Admin, Counterparty, Owner};
use ApplicationStatus::{
    Accepted, Cancelled, Completed, Confirmed, Draft, Pending, Rejected, Reviewing, Withdrawn,
};

const HOST_SIDE: &[Actor] = &[Counterparty, Admin];
const ANY_PARTY: &[Actor] = &[Owner, Counterparty, Admin];

const fn rule(
    from: ApplicationStatus,
    to: ApplicationStatus,
    action: &'static str,
    label: &'static str,
    actors: &'static [Actor],
    requires_reason: bool,
) -> Transition<ApplicationStatus> {
    Transition {
        from,
        to,
        action,
        label,
        actors,
        requires_reason,
    }
}

static TRANSITIONS: [Transition<ApplicationStatus>; 16] = [
    rule(Draft, Pending, "submit", "Submit application", &[Owner], false),
    rule(Draft, Withdrawn, "withdraw", "Discard", &[Owner], false),
    rule(Pending, Reviewing, "start_review", "Start review", HOST_SIDE, false),
    rule(Pending, Accepted, "accept", "Accept", HOST_SIDE, false),
    rule(Pending, Rejected, "reject", "Decline", HOST_SIDE, false),
    rule(Pending, Withdrawn, "withdraw", "Withdraw", &[Owner], false),
    rule(Pending, Cancelled, "cancel", "Cancel", HOST_SIDE, true),
    rule(Reviewing, Accepted, "accept", "Accept", HOST_SIDE, false),
    rule(Reviewing, Rejected, "reject", "Decline", HOST_SIDE, false),
    rule(Reviewing, Withdrawn, "withdraw", "Withdraw", &[Owner], false),
    rule(Accepted, Confirmed, "confirm", "Confirm stay", &[Owner], false),
    rule(Accepted, Withdrawn, "withdraw", "Withdraw", &[Owner], false),
    rule(Accepted, Cancelled, "cancel", "Cancel", ANY_PARTY, true),
    rule(Confirmed, Completed, "complete", "Mark completed", HOST_SIDE, false),
    rule(Confirmed, Cancelled, "cancel", "Cancel", ANY_PARTY, true),
    rule(Rejected, Reviewing, "reconsider", "Reconsider", HOST_SIDE, false),
];

impl Lifecycle for ApplicationStatus {
    fn transitions() -> &'static [Transition<Self>] {
        &TRANSITIONS
    }

    fn label(self) -> &'static str {
        match self {
            Draft => "Draft",
            Pending => "Pending",
            Reviewing => "Under review",
            Accepted => "Accepted",
            Rejected => "Declined",
            Confirmed => "Confirmed",
            Completed => "Completed",
            Cancelled => "Cancelled",
            Withdrawn => "Withdrawn",
        }
    }
}

/// Roles of `caller` toward an application.
#[must_use]
pub fn application_roles(caller: &user::Model, application: &application::Model) -> Roles {
    Roles {
        owner: caller.id == application.applicant_id,
        counterparty: caller.id == application.host_user_id,
        admin: caller.is_admin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{available_actions, find_transition, is_valid_transition};
    use sea_orm::Iterable;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = ApplicationStatus::iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![Completed, Cancelled, Withdrawn]);
    }

    #[test]
    fn test_applicant_actions_on_accepted() {
        let applicant = Roles {
            owner: true,
            ..Default::default()
        };
        let actions: Vec<_> = available_actions(Accepted, applicant)
            .iter()
            .map(|t| t.action)
            .collect();
        assert_eq!(actions, vec!["confirm", "withdraw", "cancel"]);
    }

    #[test]
    fn test_applicant_cannot_accept_own_application() {
        let applicant = Roles {
            owner: true,
            ..Default::default()
        };
        let rule = find_transition(Pending, Accepted).unwrap();
        assert!(!rule.permits(applicant));
    }

    #[test]
    fn test_completed_cannot_reopen() {
        for to in ApplicationStatus::iter() {
            assert!(!is_valid_transition(Completed, to));
        }
    }
}
