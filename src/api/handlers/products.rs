//! Catalog handlers: public listing, admin create/update/delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::Authenticated;
use crate::domain::{Product, ProductDraft, ProductId};
use crate::error::{DepotError, ErrorResponse};

/// `GET /products` — List the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    summary = "List products",
    description = "Returns every product, cheapest first.",
    responses(
        (status = 200, description = "Catalog", body = Vec<Product>),
    )
)]
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.list().await)
}

/// `GET /products/{id}` — Get one product.
///
/// # Errors
///
/// Returns [`DepotError::ProductNotFound`] if the product does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Get product",
    params(("id" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.catalog.get(id).await?))
}

/// `POST /products` — Add a product (admin).
///
/// # Errors
///
/// Returns [`DepotError`] on invalid input or missing privilege.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    summary = "Create product",
    request_body = ProductDraft,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(draft): Json<ProductDraft>,
) -> Result<impl IntoResponse, DepotError> {
    let product = state.catalog.create(&caller, draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` — Replace a product (admin).
///
/// # Errors
///
/// Returns [`DepotError`] on invalid input, missing privilege or an unknown
/// product.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Update product",
    params(("id" = String, Path, description = "Product UUID")),
    request_body = ProductDraft,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> Result<impl IntoResponse, DepotError> {
    Ok(Json(state.catalog.update(&caller, id, draft).await?))
}

/// `DELETE /products/{id}` — Remove a product (admin).
///
/// # Errors
///
/// Returns [`DepotError`] on missing privilege or an unknown product.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    summary = "Delete product",
    params(("id" = String, Path, description = "Product UUID")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, DepotError> {
    state.catalog.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            put(update_product).get(get_product).delete(delete_product),
        )
}
