//! Upload processor for the image gallery
//!
//! Reacts to object-finalize events under `uploads/`: picks collision-free destination paths,
//! generates a thumbnail, moves the original next to it and publishes both.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod event;
pub mod paths;
pub mod processor;
pub mod routes;
pub mod server;
pub mod thumbnail;
pub mod types;
