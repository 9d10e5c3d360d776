//! Core business logic for TaiwanStay.

pub mod services;
pub mod status;

pub use services::*;
pub use status::{
    Actor, Lifecycle, Roles, Transition, application_roles, authorize_transition,
    available_actions, find_transition, is_valid_transition, next_states, opportunity_roles,
    parse_target, requires_reason, validate_transition,
};
