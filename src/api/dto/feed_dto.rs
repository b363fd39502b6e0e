//! Transaction feed DTOs.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::FeedEntry;

/// Query parameters for `GET /transactions`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Dashboard view: orders plus approved top-ups only.
    #[serde(default)]
    pub recent: bool,
    /// Maximum number of entries.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response body for `GET /transactions`.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    /// Entries, newest first. Each carries a `kind` of `order` or `top_up`.
    pub data: Vec<FeedEntry>,
}
