//! Version 1 of the gallery API

/// Image listing, lookup and deletion
pub mod images;

use aide::axum::{routing::get, ApiRouter};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/image", get(images::list_images))
        .api_route(
            "/image/{id}",
            get(images::read_image).delete(images::delete_image),
        )
}
