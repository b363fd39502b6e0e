//! End-to-end REST scenarios against a live server.
#![allow(clippy::panic, clippy::indexing_slicing)]

mod support;

use diamond_depot::domain::Identity;
use serde_json::{Value, json};
use support::TestServer;

fn admin() -> Identity {
    Identity::admin("admin-1", "ops@example.com")
}

async fn create_product(server: &TestServer, name: &str, price: u64) -> Value {
    let (status, product) = server
        .send(
            server
                .client
                .post(server.api("/products"))
                .bearer_auth(server.token(&admin()))
                .json(&json!({"name": name, "price": price, "game": "MLBB"})),
        )
        .await;
    assert_eq!(status, 201);
    product
}

async fn balance(server: &TestServer, who: &Identity) -> Value {
    let (status, wallet) = server
        .send(server.client.get(server.api("/wallet")).bearer_auth(server.token(who)))
        .await;
    assert_eq!(status, 200);
    wallet["balance"].clone()
}

#[tokio::test]
async fn failed_order_is_refunded_once() {
    let server = TestServer::spawn().await;
    let buyer = Identity::customer("buyer-1", "Buyer@Example.com");
    let product = create_product(&server, "86 Diamonds", 230).await;
    server.fund(&buyer, &admin(), 500).await;

    let (status, order) = server
        .send(
            server
                .client
                .post(server.api("/orders"))
                .bearer_auth(server.token(&buyer))
                .json(&json!({"product_id": product["id"], "player_id": "MLBB-556677"})),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(balance(&server, &buyer).await, 270);

    let status_uri = server.api(&format!(
        "/admin/orders/{}/status",
        order["id"].as_str().unwrap_or_default()
    ));
    for status in ["Failed", "Pending", "Failed"] {
        let (code, _) = server
            .send(
                server
                    .client
                    .put(&status_uri)
                    .bearer_auth(server.token(&admin()))
                    .json(&json!({ "status": status })),
            )
            .await;
        assert_eq!(code, 200);
    }
    assert_eq!(balance(&server, &buyer).await, 500);

    let (_, listing) = server
        .send(
            server
                .client
                .get(server.api("/admin/orders?status=Failed"))
                .bearer_auth(server.token(&admin())),
        )
        .await;
    assert_eq!(listing["counts"]["failed"], 1);
    assert_eq!(listing["data"][0]["refunded"], true);
}

#[tokio::test]
async fn purchases_need_funds_and_a_valid_player_id() {
    let server = TestServer::spawn().await;
    let buyer = Identity::customer("buyer-2", "b2@example.com");
    let product = create_product(&server, "Weekly Pass", 160).await;

    let order = |player: &str| {
        server
            .client
            .post(server.api("/orders"))
            .bearer_auth(server.token(&buyer))
            .json(&json!({"product_id": product["id"], "player_id": player}))
    };

    let (status, body) = server.send(order("PLAYER-1")).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], 4001);

    let (status, _) = server.send(order(" 12 ")).await;
    assert_eq!(status, 400);
    assert_eq!(balance(&server, &buyer).await, 0);
}

#[tokio::test]
async fn public_lookup_and_admin_reports() {
    let server = TestServer::spawn().await;
    let buyer = Identity::customer("buyer-3", "gamer@example.com");
    let product = create_product(&server, "172 Diamonds", 450).await;
    server.fund(&buyer, &admin(), 1000).await;

    let (_, order) = server
        .send(
            server
                .client
                .post(server.api("/orders"))
                .bearer_auth(server.token(&buyer))
                .json(&json!({"product_id": product["id"], "player_id": "TRACK-ME-01"})),
        )
        .await;
    let (status, _) = server
        .send(
            server
                .client
                .put(server.api(&format!(
                    "/admin/orders/{}/status",
                    order["id"].as_str().unwrap_or_default()
                )))
                .bearer_auth(server.token(&admin()))
                .json(&json!({"status": "Completed"})),
        )
        .await;
    assert_eq!(status, 200);

    let (status, tracked) = server
        .send(server.client.get(server.api("/orders/player/TRACK-ME-01")))
        .await;
    assert_eq!(status, 200);
    assert_eq!(tracked.as_array().map(Vec::len), Some(1));

    let (_, revenue) = server
        .send(
            server
                .client
                .get(server.api("/admin/revenue"))
                .bearer_auth(server.token(&admin())),
        )
        .await;
    assert_eq!(revenue["total"], 450);
    assert_eq!(revenue["today"], 450);

    let (_, customers) = server
        .send(
            server
                .client
                .get(server.api("/admin/customers?search=GAMER"))
                .bearer_auth(server.token(&admin())),
        )
        .await;
    assert_eq!(customers["total"], 1);
    assert_eq!(customers["data"][0]["balance"], 550);
    assert_eq!(customers["data"][0]["total_spent"], 450);

    let (status, overridden) = server
        .send(
            server
                .client
                .put(server.api("/admin/customers/buyer-3/balance"))
                .bearer_auth(server.token(&admin()))
                .json(&json!({"balance": 5})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(overridden["previous_balance"], 550);
    assert_eq!(balance(&server, &buyer).await, 5);
}

#[tokio::test]
async fn banner_and_payment_configuration() {
    let server = TestServer::spawn().await;

    let (status, methods) = server
        .send(server.client.get(format!("{}/config/payment-methods", server.base)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(methods["min_top_up"], 100);
    assert_eq!(methods["accounts"].as_array().map(Vec::len), Some(2));

    let (status, _) = server
        .send(
            server
                .client
                .put(server.api("/settings/banner"))
                .bearer_auth(server.token(&admin()))
                .json(&json!({"enabled": true, "text": "Eid bonus live", "variant": "info"})),
        )
        .await;
    assert_eq!(status, 200);

    let (_, banner) = server
        .send(server.client.get(server.api("/settings/banner")))
        .await;
    assert_eq!(banner["text"], "Eid bonus live");
    assert_eq!(banner["enabled"], true);
}
