//! Merged transaction feed.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{FeedQuery, FeedResponse};
use crate::app_state::AppState;
use crate::auth::Authenticated;

/// Entries in the dashboard's recent-activity view unless a limit is given.
const RECENT_DEFAULT_LIMIT: usize = 5;

/// `GET /transactions` — Orders and top-ups in one timeline.
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "Transactions",
    summary = "Transaction feed",
    description = "Merges the caller's orders and top-up requests, newest first. With `recent=true` only orders and approved top-ups are returned.",
    params(FeedQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Feed entries tagged by `kind`", body = serde_json::Value),
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let data = if query.recent {
        let limit = query.limit.unwrap_or(RECENT_DEFAULT_LIMIT);
        state.feed.recent(&caller.user_id, limit).await
    } else {
        let mut entries = state.feed.snapshot(&caller.user_id).await;
        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }
        entries
    };
    Json(FeedResponse { data })
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions))
}
