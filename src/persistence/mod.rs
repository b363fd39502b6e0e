//! Persistence layer: optional PostgreSQL mirror of the document store.
//!
//! The store runs in memory. When persistence is enabled, documents are
//! restored from PostgreSQL at startup and a background task mirrors
//! every committed change back, together with an append-only event log.

pub mod mirror;
pub mod models;
pub mod postgres;
