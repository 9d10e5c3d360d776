//! Database entities.

#![allow(missing_docs)]

pub mod application;
pub mod email_usage;
pub mod host;
pub mod image;
pub mod opportunity;
pub mod review;
pub mod status_history;
pub mod user;

pub use application::Entity as Application;
pub use email_usage::Entity as EmailUsage;
pub use host::Entity as Host;
pub use image::Entity as Image;
pub use opportunity::Entity as Opportunity;
pub use review::Entity as Review;
pub use status_history::StatusHistoryEntry;
pub use user::Entity as User;
