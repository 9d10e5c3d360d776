//! Opportunity lifecycle.

use taiwanstay_db::entities::{
    opportunity::{self, OpportunityStatus},
    user::{self, UserRole},
};

use super::{Actor, Lifecycle, Roles, Transition};

use Actor::{Admin, Owner};
use OpportunityStatus::{
    Active, AdminPaused, Archived, Deleted, Draft, Expired, Filled, Paused, Pending, Rejected,
};

const fn rule(
    from: OpportunityStatus,
    to: OpportunityStatus,
    action: &'static str,
    label: &'static str,
    actors: &'static [Actor],
    requires_reason: bool,
) -> Transition<OpportunityStatus> {
    Transition {
        from,
        to,
        action,
        label,
        actors,
        requires_reason,
    }
}

static TRANSITIONS: [Transition<OpportunityStatus>; 22] = [
    rule(Draft, Pending, "submit", "Submit for review", &[Owner], false),
    rule(Draft, Deleted, "delete", "Delete", &[Owner, Admin], false),
    rule(Pending, Active, "approve", "Approve", &[Admin], false),
    rule(Pending, Rejected, "reject", "Reject", &[Admin], true),
    rule(Pending, Draft, "withdraw", "Withdraw submission", &[Owner], false),
    rule(Active, Paused, "pause", "Pause", &[Owner], false),
    rule(Active, AdminPaused, "admin_pause", "Suspend", &[Admin], true),
    rule(Active, Filled, "mark_filled", "Mark as filled", &[Owner], false),
    rule(Active, Expired, "expire", "Expire", &[Admin], false),
    rule(Active, Archived, "archive", "Archive", &[Owner, Admin], false),
    rule(Paused, Active, "resume", "Resume", &[Owner], false),
    rule(Paused, Archived, "archive", "Archive", &[Owner], false),
    rule(AdminPaused, Active, "reinstate", "Reinstate", &[Admin], false),
    rule(AdminPaused, Archived, "archive", "Archive", &[Admin], true),
    rule(Rejected, Pending, "resubmit", "Resubmit", &[Owner], false),
    rule(Rejected, Deleted, "delete", "Delete", &[Owner, Admin], false),
    rule(Expired, Pending, "renew", "Renew", &[Owner], false),
    rule(Expired, Archived, "archive", "Archive", &[Owner, Admin], false),
    rule(Filled, Active, "reopen", "Reopen", &[Owner], false),
    rule(Filled, Archived, "archive", "Archive", &[Owner, Admin], false),
    rule(Archived, Draft, "restore", "Restore as draft", &[Owner], false),
    rule(Archived, Deleted, "delete", "Delete", &[Owner, Admin], false),
];

impl Lifecycle for OpportunityStatus {
    fn transitions() -> &'static [Transition<Self>] {
        &TRANSITIONS
    }

    fn label(self) -> &'static str {
        match self {
            Draft => "Draft",
            Pending => "Pending review",
            Active => "Active",
            Paused => "Paused",
            AdminPaused => "Suspended by admin",
            Filled => "Filled",
            Expired => "Expired",
            Rejected => "Rejected",
            Archived => "Archived",
            Deleted => "Deleted",
        }
    }
}

/// Roles of `caller` toward an opportunity.
///
/// Ownership needs both the HOST role and being the listing's host user.
#[must_use]
pub fn opportunity_roles(caller: &user::Model, opportunity: &opportunity::Model) -> Roles {
    Roles {
        owner: caller.role == UserRole::Host && caller.id == opportunity.user_id,
        counterparty: false,
        admin: caller.is_admin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{is_valid_transition, next_states, requires_reason};
    use sea_orm::Iterable;

    #[test]
    fn test_only_deleted_is_terminal() {
        for status in OpportunityStatus::iter() {
            assert_eq!(status.is_terminal(), status == Deleted, "{status}");
        }
    }

    #[test]
    fn test_reason_required_pairs() {
        let with_reason: Vec<_> = TRANSITIONS
            .iter()
            .filter(|t| requires_reason(t.from, t.to))
            .map(|t| (t.from, t.to))
            .collect();
        assert_eq!(
            with_reason,
            vec![
                (Pending, Rejected),
                (Active, AdminPaused),
                (AdminPaused, Archived)
            ]
        );
        assert!(!requires_reason(Active, Paused));
    }

    #[test]
    fn test_every_unlisted_pair_is_invalid() {
        for from in OpportunityStatus::iter() {
            let allowed = next_states(from);
            for to in OpportunityStatus::iter() {
                assert_eq!(is_valid_transition(from, to), allowed.contains(&to));
                if !allowed.contains(&to) {
                    assert!(!requires_reason(from, to));
                }
            }
        }
        assert!(!is_valid_transition(Active, Active));
        assert!(!is_valid_transition(Deleted, Draft));
    }

    #[test]
    fn test_host_cannot_admin_pause() {
        let rule = crate::status::find_transition(Active, AdminPaused).unwrap();
        let owner = Roles {
            owner: true,
            ..Default::default()
        };
        assert!(!rule.permits(owner));
    }
}
