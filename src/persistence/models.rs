//! Database rows for mirrored documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row from the `documents` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Collection name, e.g. `"wallets"`.
    pub collection: String,
    /// Document id within the collection.
    pub doc_id: String,
    /// Document content.
    pub body: serde_json::Value,
    /// Time of the last mirror write.
    pub updated_at: DateTime<Utc>,
}
