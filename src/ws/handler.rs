//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::DepotError;

/// Query string of the upgrade request. Browsers cannot set headers on a
/// WebSocket handshake, so the bearer token travels here.
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    /// Bearer token issued by the identity provider.
    pub token: String,
}

/// `GET /ws?token=…` — Upgrade an authenticated HTTP connection to
/// WebSocket.
///
/// # Errors
///
/// Returns [`DepotError::Unauthenticated`] before the upgrade if the token
/// does not verify.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, DepotError> {
    let caller = state.auth.verify(&query.token)?;
    Ok(ws.on_upgrade(move |socket| run_connection(socket, state, caller)))
}
