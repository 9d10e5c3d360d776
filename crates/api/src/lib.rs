//! HTTP API layer for TaiwanStay.
//!
//! - **Endpoints**: JSON routes for accounts, hosts, opportunities,
//!   applications, reviews and images
//! - **Extractors**: Authentication and pagination
//! - **Middleware**: Bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{MAX_BODY_BYTES, router};
pub use middleware::{AppState, auth_middleware};
