//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health and payment
//! configuration live at the root, next to the `/ws` upgrade endpoint.

pub mod docs;
pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the served application: REST routes, the WebSocket endpoint,
/// Swagger UI (with the `swagger-ui` feature) and the HTTP middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
    };

    with_middleware(router, request_timeout).with_state(state)
}

/// Wraps `router` in the timeout, trace and CORS layers. A request that
/// outlives `request_timeout` is answered with `408 Request Timeout`.
fn with_middleware<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::TokenIssuer;
    use crate::config::StorefrontConfig;
    use crate::domain::{EventBus, Identity};
    use crate::store::DocumentStore;

    const SECRET: &str = "router-test-secret";

    struct Harness {
        app: Router,
        issuer: TokenIssuer,
    }

    impl Harness {
        fn new() -> Self {
            let Ok(config) = StorefrontConfig::from_lookup(|key| match key {
                "AUTH_JWT_SECRET" => Some(SECRET.to_string()),
                "MIN_TOP_UP" => Some("100".to_string()),
                _ => None,
            }) else {
                panic!("config should load");
            };
            let state = AppState::new(
                Arc::new(DocumentStore::new(config.store_tx_max_attempts)),
                EventBus::new(64),
                &config,
            );
            Self {
                app: build_app(state, Duration::from_secs(5)),
                issuer: TokenIssuer::new(SECRET.as_bytes(), chrono::Duration::hours(1)),
            }
        }

        fn token(&self, who: &Identity) -> String {
            let Ok(token) = self.issuer.issue(who) else {
                panic!("token signing failed");
            };
            token
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            who: Option<&Identity>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(who) = who {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(who)));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            };
            let Ok(request) = request else {
                panic!("request build failed");
            };
            let Ok(response) = self.app.clone().oneshot(request).await else {
                panic!("router call failed");
            };
            let status = response.status();
            let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
                panic!("body read failed");
            };
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let harness = Harness::new();
        let (status, body) = harness.call(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["documents"]["wallets"], 0);
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let slow: Router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }),
        );
        let app = with_middleware(slow, Duration::from_millis(20));
        let Ok(request) = Request::builder().uri("/slow").body(Body::empty()) else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn wallet_requires_a_token() {
        let harness = Harness::new();
        let (status, body) = harness.call(Method::GET, "/api/v1/wallet", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 5001);
    }

    #[tokio::test]
    async fn customers_are_kept_out_of_admin_routes() {
        let harness = Harness::new();
        let customer = Identity::customer("c1", "c1@example.com");
        let (status, _) = harness
            .call(Method::GET, "/api/v1/admin/revenue", Some(&customer), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn top_up_then_purchase() {
        let harness = Harness::new();
        let admin = Identity::admin("admin", "ops@example.com");
        let buyer = Identity::customer("buyer", "buyer@example.com");

        let (status, product) = harness
            .call(
                Method::POST,
                "/api/v1/products",
                Some(&admin),
                Some(json!({"name": "100 Diamonds", "price": 300, "game": "Free Fire"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, top_up) = harness
            .call(
                Method::POST,
                "/api/v1/top-ups",
                Some(&buyer),
                Some(json!({"amount": 500, "payment_method": "bKash", "transaction_ref": "BK-12345"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(top_up_id) = top_up["id"].as_str() else {
            panic!("top-up id missing");
        };

        let (status, _) = harness
            .call(
                Method::POST,
                &format!("/api/v1/admin/top-ups/{top_up_id}/review"),
                Some(&admin),
                Some(json!({"decision": "approve"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, order) = harness
            .call(
                Method::POST,
                "/api/v1/orders",
                Some(&buyer),
                Some(json!({"product_id": product["id"], "player_id": "PLAYER-777"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["status"], "Pending");

        let (_, wallet) = harness.call(Method::GET, "/api/v1/wallet", Some(&buyer), None).await;
        assert_eq!(wallet["balance"], 200);

        let (status, _) = harness
            .call(
                Method::POST,
                "/api/v1/orders",
                Some(&buyer),
                Some(json!({"product_id": product["id"], "player_id": "PLAYER-777"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, feed) = harness
            .call(Method::GET, "/api/v1/transactions", Some(&buyer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(feed["data"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn second_review_conflicts() {
        let harness = Harness::new();
        let admin = Identity::admin("admin", "ops@example.com");
        let buyer = Identity::customer("buyer", "buyer@example.com");
        let (_, top_up) = harness
            .call(
                Method::POST,
                "/api/v1/top-ups",
                Some(&buyer),
                Some(json!({"amount": 150, "payment_method": "Nagad", "transaction_ref": "NG-99999"})),
            )
            .await;
        let uri = format!("/api/v1/admin/top-ups/{}/review", top_up["id"].as_str().unwrap_or_default());

        let (first, _) = harness
            .call(Method::POST, &uri, Some(&admin), Some(json!({"decision": "reject"})))
            .await;
        let (second, body) = harness
            .call(Method::POST, &uri, Some(&admin), Some(json!({"decision": "approve"})))
            .await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 2101);
    }
}
