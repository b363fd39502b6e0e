//! # diamond-depot
//!
//! REST API and WebSocket backend for a game top-up storefront.
//!
//! Customers fund a wallet through manually reviewed top-up requests and
//! spend the balance on diamond packages. Every balance change happens
//! inside an optimistic transaction of the in-memory document store, so a
//! wallet debit and its order, or a review and its credit, commit together
//! or not at all.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Ledger / Catalog / Feed / Report / Settings services (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── DocumentStore, optimistic transactions (store/)
//!     │
//!     └── PostgreSQL mirror (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod store;
pub mod ws;
