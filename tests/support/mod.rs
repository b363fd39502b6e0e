//! Shared harness: a real server on an ephemeral port plus token minting.

use std::sync::Arc;
use std::time::Duration;

use diamond_depot::api;
use diamond_depot::app_state::AppState;
use diamond_depot::auth::TokenIssuer;
use diamond_depot::config::StorefrontConfig;
use diamond_depot::domain::{EventBus, Identity};
use diamond_depot::store::DocumentStore;

const SECRET: &str = "integration-secret";

/// A running storefront bound to `127.0.0.1`.
pub struct TestServer {
    /// `http://127.0.0.1:<port>`.
    pub base: String,
    /// `ws://127.0.0.1:<port>/ws`.
    pub ws: String,
    /// Shared HTTP client.
    pub client: reqwest::Client,
    issuer: TokenIssuer,
}

impl TestServer {
    /// Starts a server with a 100-subunit minimum top-up.
    pub async fn spawn() -> Self {
        let Ok(config) = StorefrontConfig::from_lookup(|key| match key {
            "AUTH_JWT_SECRET" => Some(SECRET.to_string()),
            "MIN_TOP_UP" => Some("100".to_string()),
            _ => None,
        }) else {
            panic!("config should load");
        };
        let state = AppState::new(
            Arc::new(DocumentStore::new(config.store_tx_max_attempts)),
            EventBus::new(256),
            &config,
        );
        let app = api::build_app(state, Duration::from_secs(10));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}"),
            ws: format!("ws://{addr}/ws"),
            client: reqwest::Client::new(),
            issuer: TokenIssuer::new(SECRET.as_bytes(), chrono::Duration::hours(1)),
        }
    }

    /// Signs a bearer token for `who`.
    pub fn token(&self, who: &Identity) -> String {
        let Ok(token) = self.issuer.issue(who) else {
            panic!("token signing failed");
        };
        token
    }

    /// Absolute URL of an `/api/v1` path.
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base)
    }

    /// Sends `request` and returns the status and JSON body.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> (u16, serde_json::Value) {
        let Ok(response) = request.send().await else {
            panic!("request failed");
        };
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    /// Submits a top-up for `who` and has `admin` approve it.
    pub async fn fund(&self, who: &Identity, admin: &Identity, amount: u64) {
        let (status, top_up) = self
            .send(
                self.client
                    .post(self.api("/top-ups"))
                    .bearer_auth(self.token(who))
                    .json(&serde_json::json!({
                        "amount": amount,
                        "payment_method": "bKash",
                        "transaction_ref": format!("BK-{amount:06}"),
                    })),
            )
            .await;
        assert_eq!(status, 201, "top-up submission failed: {top_up}");
        let Some(id) = top_up["id"].as_str() else {
            panic!("top-up id missing");
        };
        let (status, _) = self
            .send(
                self.client
                    .post(self.api(&format!("/admin/top-ups/{id}/review")))
                    .bearer_auth(self.token(admin))
                    .json(&serde_json::json!({"decision": "approve"})),
            )
            .await;
        assert_eq!(status, 200);
    }
}
