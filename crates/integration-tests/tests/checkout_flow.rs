//! Checkout over HTTP: cart to order, stock accounting and rollback.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use grocery_mart_core::Role;
use grocery_mart_integration_tests::{TestApp, decimal};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let app = TestApp::new();
    let tomatoes = app.product("Tomatoes", 100, 5).await;
    let (_, token) = app.login("asha@example.com", Role::User).await;

    app.add_to_cart(&token, &tomatoes, 2).await;

    let (status, body) = app
        .post("/api/order/create", &token, json!({ "paymentMethod": "UPI" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Order created successfully");

    let order = &body["order"];
    assert_eq!(decimal(&order["totalAmount"]), Decimal::from(200));
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["paymentMethod"], "UPI");
    assert_eq!(order["items"][0]["name"], "Tomatoes");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["deliveryAddress"]["city"], "Pune");

    assert_eq!(app.stock_of(&tomatoes).await, 3);

    let (_, cart) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(cart["cart"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_checkout_defaults_to_cash_on_delivery() {
    let app = TestApp::new();
    let milk = app.product("Milk", 30, 10).await;
    let (_, token) = app.login("ravi@example.com", Role::User).await;
    app.add_to_cart(&token, &milk, 1).await;

    let (status, body) = app.post("/api/order/create", &token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["paymentMethod"], "COD");
}

#[tokio::test]
async fn test_checkout_uses_request_address() {
    let app = TestApp::new();
    let milk = app.product("Milk", 30, 10).await;
    let (_, token) = app.login("meera@example.com", Role::User).await;
    app.add_to_cart(&token, &milk, 1).await;

    let (status, body) = app
        .post(
            "/api/order/create",
            &token,
            json!({
                "deliveryAddress": {
                    "street": "7 Lake View",
                    "city": "Bhopal",
                    "state": "MP",
                    "zipCode": "462001"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["order"]["deliveryAddress"]["city"], "Bhopal");
    assert_eq!(body["order"]["deliveryAddress"]["zipCode"], "462001");
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let app = TestApp::new();
    let paneer = app.product("Paneer", 90, 2).await;
    let (_, token) = app.login("kiran@example.com", Role::User).await;
    app.add_to_cart(&token, &paneer, 2).await;

    // Someone else buys one before this user checks out
    let (_, other) = app.login("dev@example.com", Role::User).await;
    app.add_to_cart(&other, &paneer, 1).await;
    let (status, _) = app.post("/api/order/create", &other, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/order/create", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "insufficient_stock");
    assert_eq!(body["error"], "Insufficient stock for Paneer");

    assert_eq!(app.stock_of(&paneer).await, 1);
    let (_, cart) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(cart["cart"]["items"][0]["quantity"], 2);
    let (_, history) = app.get("/api/order/history", Some(&token)).await;
    assert!(history["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.login("nobody@example.com", Role::User).await;

    let (status, body) = app.post("/api/order/create", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "empty_cart");
    assert_eq!(body["error"], "Cart is empty");
}

#[tokio::test]
async fn test_invalid_address_is_a_validation_error() {
    let app = TestApp::new();
    let milk = app.product("Milk", 30, 10).await;
    let (_, token) = app.login("sam@example.com", Role::User).await;
    app.add_to_cart(&token, &milk, 1).await;

    let (status, body) = app
        .post(
            "/api/order/create",
            &token,
            json!({
                "deliveryAddress": { "street": "3 Hill Road", "city": "Pune" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(app.stock_of(&milk).await, 10);
}

#[tokio::test]
async fn test_unknown_payment_method_is_rejected() {
    let app = TestApp::new();
    let milk = app.product("Milk", 30, 10).await;
    let (_, token) = app.login("pay@example.com", Role::User).await;
    app.add_to_cart(&token, &milk, 1).await;

    let (status, body) = app
        .post("/api/order/create", &token, json!({ "paymentMethod": "Bitcoin" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_concurrent_checkouts_never_oversell() {
    let app = Arc::new(TestApp::new());
    let mangoes = app.product("Mangoes", 250, 3).await;

    let mut tokens = Vec::new();
    for i in 0..10 {
        let (_, token) = app.login(&format!("buyer{i}@example.com"), Role::User).await;
        app.add_to_cart(&token, &mangoes, 1).await;
        tokens.push(token);
    }

    let mut handles = Vec::new();
    for token in tokens {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.post("/api/order/create", &token, json!({})).await.0
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 3);
    assert_eq!(app.stock_of(&mangoes).await, 0);
}

#[tokio::test]
async fn test_order_history_and_ownership() {
    let app = TestApp::new();
    let rice = app.product("Basmati Rice", 180, 20).await;
    let (_, alice) = app.login("alice@example.com", Role::User).await;
    let (_, bob) = app.login("bob@example.com", Role::User).await;

    app.add_to_cart(&alice, &rice, 1).await;
    let (_, first) = app.post("/api/order/create", &alice, json!({})).await;
    app.add_to_cart(&alice, &rice, 2).await;
    let (_, second) = app.post("/api/order/create", &alice, json!({})).await;

    let (status, history) = app.get("/api/order/history", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = history["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second["order"]["id"]);
    assert_eq!(orders[1]["id"], first["order"]["id"]);

    let path = format!("/api/order/{}", first["order"]["id"]);
    let (status, body) = app.get(&path, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], first["order"]["id"]);

    let (status, body) = app.get(&path, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (_, bob_history) = app.get("/api/order/history", Some(&bob)).await;
    assert!(bob_history["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_order_snapshot_survives_product_edits() {
    let app = TestApp::new();
    let ghee = app.product("Ghee", 500, 10).await;
    let (_, token) = app.login("lata@example.com", Role::User).await;
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;

    app.add_to_cart(&token, &ghee, 1).await;
    let (_, placed) = app.post("/api/order/create", &token, json!({})).await;

    let (status, _) = app
        .put(
            &format!("/api/admin/products/update/{}", ghee.id),
            &admin,
            json!({ "name": "Desi Ghee", "price": "650" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let path = format!("/api/order/{}", placed["order"]["id"]);
    let (_, body) = app.get(&path, Some(&token)).await;
    let item = &body["order"]["items"][0];
    assert_eq!(item["name"], "Ghee");
    assert_eq!(decimal(&item["price"]), Decimal::from(500));
    assert_eq!(item["product"]["name"], "Desi Ghee");

    let (status, _) = app
        .delete(&format!("/api/admin/products/delete/{}", ghee.id), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&path, Some(&token)).await;
    let item = &body["order"]["items"][0];
    assert_eq!(item["name"], "Ghee");
    assert!(item["product"].is_null());
    assert_eq!(decimal(&body["order"]["totalAmount"]), Decimal::from(500));
}
