//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` authenticates with a `token` query parameter and
//! streams the caller's live transaction feed and visible domain events.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
