//! Repositories wrapping sea-orm queries for each entity.

mod application;
mod email_usage;
mod host;
mod image;
mod opportunity;
mod review;
mod user;

pub use application::{ApplicationListFilter, ApplicationRepository};
pub use email_usage::EmailUsageRepository;
pub use host::{HostListFilter, HostRepository};
pub use image::ImageRepository;
pub use opportunity::{OpportunityListFilter, OpportunityRepository};
pub use review::{RatingSummary, ReviewRepository};
pub use user::UserRepository;
