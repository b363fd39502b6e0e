//! Sitewide settings: the promo banner.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::domain::PromoBanner;
use crate::error::{DepotError, ErrorResponse};

/// `GET /settings/banner` — Current promo banner.
#[utoipa::path(
    get,
    path = "/api/v1/settings/banner",
    tag = "Settings",
    summary = "Get promo banner",
    responses(
        (status = 200, description = "Banner", body = PromoBanner),
    )
)]
pub async fn get_banner(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.settings.banner().await)
}

/// `PUT /settings/banner` — Replace the promo banner (admin).
///
/// # Errors
///
/// Returns [`DepotError`] on missing privilege or an enabled banner
/// without text.
#[utoipa::path(
    put,
    path = "/api/v1/settings/banner",
    tag = "Settings",
    summary = "Update promo banner",
    request_body = PromoBanner,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Banner stored", body = PromoBanner),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn put_banner(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(banner): Json<PromoBanner>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.settings.set_banner(&caller, banner).await?))
}

/// Settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings/banner", get(get_banner).put(put_banner))
}
