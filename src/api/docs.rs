//! OpenAPI document for the REST surface.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{dto, handlers};

/// Generated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Diamond Depot",
        description = "Wallet-backed game top-up storefront."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::payment_methods_handler,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::wallet::get_wallet,
        handlers::wallet::accept_agreement,
        handlers::orders::place_order,
        handlers::orders::list_orders,
        handlers::orders::orders_for_player,
        handlers::top_ups::submit_top_up,
        handlers::top_ups::list_top_ups,
        handlers::transactions::list_transactions,
        handlers::settings::get_banner,
        handlers::settings::put_banner,
        handlers::admin::list_orders,
        handlers::admin::update_order_status,
        handlers::admin::list_top_ups,
        handlers::admin::review_top_up,
        handlers::admin::list_customers,
        handlers::admin::edit_balance,
        handlers::admin::revenue,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::ErrorBody,
            crate::domain::Product,
            crate::domain::ProductDraft,
            crate::domain::Game,
            crate::domain::Order,
            crate::domain::OrderStatus,
            crate::domain::TopUpRequest,
            crate::domain::TopUpStatus,
            crate::domain::PaymentMethod,
            crate::domain::ReviewDecision,
            crate::domain::PromoBanner,
            crate::domain::BannerVariant,
            crate::domain::RevenueReport,
            crate::domain::DailyRevenue,
            crate::domain::OrderStatusCounts,
            crate::domain::CustomerSummary,
            dto::WalletResponse,
            dto::PlaceOrderRequest,
            dto::OrderListResponse,
            dto::AdminOrderListResponse,
            dto::UpdateOrderStatusRequest,
            dto::SubmitTopUpRequest,
            dto::TopUpListResponse,
            dto::ReviewTopUpRequest,
            dto::EditBalanceRequest,
            dto::BalanceOverrideResponse,
            dto::CustomerListResponse,
            dto::PaginationMeta,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health and payment configuration"),
        (name = "Products", description = "Diamond package catalog"),
        (name = "Wallet", description = "Caller's wallet"),
        (name = "Orders", description = "Purchases paid from the wallet"),
        (name = "Top-ups", description = "Manual wallet funding requests"),
        (name = "Transactions", description = "Merged order and top-up feed"),
        (name = "Settings", description = "Promo banner"),
        (name = "Admin", description = "Review, overrides and reports")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the handlers.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
