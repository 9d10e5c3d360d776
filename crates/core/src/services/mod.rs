//! Business services.

pub mod application;
pub mod email;
pub mod host;
pub mod media;
pub mod opportunity;
pub mod review;
pub mod user;

pub use application::{ApplicationService, ApplicationStatusInput, CreateApplicationInput};
pub use email::{
    EmailCategory, EmailDeliveryResult, EmailMessage, EmailNotificationType, EmailService,
    EmailTemplateVars, EmailTransport, HttpEmailTransport, NewsletterReport,
};
pub use host::{CreateHostInput, HostService, UpdateHostInput};
pub use media::{MediaService, RegisterImageInput, SignedUpload};
pub use opportunity::{
    AvailableActions, CreateOpportunityInput, OpportunityService, StatusChangeInput,
    UpdateOpportunityInput, UpdateScope,
};
pub use review::{CreateReviewInput, ReviewService};
pub use user::{
    NewsletterInput, Session, SigninInput, SignupInput, UpdateProfileInput, UserService,
};
