//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod orders;
pub mod products;
pub mod settings;
pub mod system;
pub mod top_ups;
pub mod transactions;
pub mod wallet;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(wallet::routes())
        .merge(orders::routes())
        .merge(top_ups::routes())
        .merge(transactions::routes())
        .merge(settings::routes())
        .merge(admin::routes())
}
