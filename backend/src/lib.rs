//! Image gallery backend service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Gallery reads and deletes over processed images
pub mod gallery;

/// HTTP routes
pub mod routes;

/// Server setup
pub mod server;

/// Configuration and HTTP error types
pub mod types;
