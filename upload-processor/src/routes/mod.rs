mod events;
mod health;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

pub use events::EventResponse;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/health", get(health::handler))
        .api_route("/v1/events/object-finalized", post(events::object_finalized))
}
