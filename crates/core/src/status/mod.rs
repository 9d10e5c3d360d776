//! Status lifecycles for opportunities and applications.
//!
//! Each lifecycle is a static table of permitted transitions. A transition
//! names who may perform it and whether a reason must accompany it. Every
//! check here is default-deny: a pair absent from the table is invalid.

mod application;
mod opportunity;

pub use application::application_roles;
pub use opportunity::opportunity_roles;

use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

use taiwanstay_common::{AppError, AppResult};

/// Relationship of a caller to the entity being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// Host user owning an opportunity, or the applicant of an application.
    Owner,
    /// Host user receiving an application.
    Counterparty,
    /// Platform administrator.
    Admin,
}

/// The set of actors a caller acts as for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub owner: bool,
    pub counterparty: bool,
    pub admin: bool,
}

impl Roles {
    #[must_use]
    pub const fn contains(&self, actor: Actor) -> bool {
        match actor {
            Actor::Owner => self.owner,
            Actor::Counterparty => self.counterparty,
            Actor::Admin => self.admin,
        }
    }

    /// No relationship at all to the entity.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.owner || self.counterparty || self.admin)
    }
}

/// One permitted status change.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition<S: 'static> {
    pub from: S,
    pub to: S,
    /// Machine name of the action (`approve`, `withdraw`, ...)
    pub action: &'static str,
    /// Button label
    pub label: &'static str,
    pub actors: &'static [Actor],
    pub requires_reason: bool,
}

impl<S> Transition<S> {
    /// Whether a caller with `roles` may perform this transition.
    #[must_use]
    pub fn permits(&self, roles: Roles) -> bool {
        self.actors.iter().any(|actor| roles.contains(*actor))
    }
}

/// A status enum governed by a transition table.
pub trait Lifecycle: Copy + Eq + Display + Send + Sync + 'static {
    /// Every permitted transition.
    fn transitions() -> &'static [Transition<Self>];

    /// Human readable name for badges.
    fn label(self) -> &'static str;

    /// No transition leaves this state.
    fn is_terminal(self) -> bool {
        !Self::transitions().iter().any(|t| t.from == self)
    }
}

/// Look up the rule for a pair.
#[must_use]
pub fn find_transition<S: Lifecycle>(from: S, to: S) -> Option<&'static Transition<S>> {
    S::transitions().iter().find(|t| t.from == from && t.to == to)
}

/// Whether moving from `current` to `target` is permitted by the table.
#[must_use]
pub fn is_valid_transition<S: Lifecycle>(current: S, target: S) -> bool {
    find_transition(current, target).is_some()
}

/// Whether the transition must carry a reason. False for unknown pairs.
#[must_use]
pub fn requires_reason<S: Lifecycle>(current: S, target: S) -> bool {
    find_transition(current, target).is_some_and(|t| t.requires_reason)
}

/// States reachable from `current` in one step, in table order.
#[must_use]
pub fn next_states<S: Lifecycle>(current: S) -> Vec<S> {
    S::transitions()
        .iter()
        .filter(|t| t.from == current)
        .map(|t| t.to)
        .collect()
}

/// Transitions out of `current` the caller may perform.
#[must_use]
pub fn available_actions<S: Lifecycle>(current: S, roles: Roles) -> Vec<&'static Transition<S>> {
    S::transitions()
        .iter()
        .filter(|t| t.from == current && t.permits(roles))
        .collect()
}

/// Check the pair against the table and the reason rule.
///
/// A reason counts as present only when it is non-blank after trimming.
pub fn validate_transition<S: Lifecycle>(
    current: S,
    target: S,
    reason: Option<&str>,
) -> AppResult<()> {
    let Some(transition) = find_transition(current, target) else {
        return Err(AppError::InvalidTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    };

    let has_reason = reason.is_some_and(|r| !r.trim().is_empty());
    if transition.requires_reason && !has_reason {
        return Err(AppError::ReasonRequired {
            from: current.to_string(),
            to: target.to_string(),
        });
    }

    Ok(())
}

/// Check that a caller with `roles` may attempt `current -> target`.
///
/// Pairs without a rule are left to [`validate_transition`] for anyone
/// related to the entity; strangers are refused outright.
pub fn authorize_transition<S: Lifecycle>(current: S, target: S, roles: Roles) -> AppResult<()> {
    let allowed = match find_transition(current, target) {
        Some(transition) => transition.permits(roles),
        None => !roles.is_empty(),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Not allowed to change status from {current} to {target}"
        )))
    }
}

/// Resolve a requested status name for an entity currently in `current`.
///
/// An unrecognised name is handled like a pair without a rule: strangers are
/// refused, anyone related to the entity gets `InvalidTransition`.
pub fn parse_target<S: Lifecycle + FromStr>(current: S, raw: &str, roles: Roles) -> AppResult<S> {
    raw.trim().parse().map_err(|_| {
        if roles.is_empty() {
            AppError::Forbidden(format!("Not allowed to change status from {current}"))
        } else {
            AppError::InvalidTransition {
                from: current.to_string(),
                to: raw.to_string(),
            }
        }
    })
}
