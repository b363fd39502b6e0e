//! Document store: collections of storefront records with atomic
//! multi-document transactions under optimistic concurrency control.

pub mod doc_key;
pub mod document_store;
pub mod transaction;

pub use doc_key::DocKey;
pub use document_store::{DocumentStore, StoreStats};
pub use transaction::Transaction;
