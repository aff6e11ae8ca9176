//! All API endpoint setup

use axum::Router;
use axum::routing::get;

pub use request::Form;
pub use request::PathParameters;
pub use request::parse_expiry;
pub use response::Error;
pub use response::Success;

use crate::root::route_not_found;
use crate::storage::Storage;

mod health;
mod request;
mod response;
mod short_urls;

/// Get the Axum router for all API routes
///
/// Unsupported methods on these routes answer like unknown routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route(
            "/shorturls",
            get(short_urls::list::<S>).post(short_urls::create::<S>),
        )
        .route("/shorturls/{shortcode}", get(short_urls::single::<S>))
        .route("/shorturls/{shortcode}/stats", get(short_urls::stats::<S>))
        .route("/health", get(health::health))
        .method_not_allowed_fallback(route_not_found)
}
