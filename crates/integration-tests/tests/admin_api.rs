//! Admin endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use grocery_mart_core::Role;
use grocery_mart_integration_tests::{TestApp, decimal};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_product_crud() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;

    let (status, body) = app
        .post(
            "/api/admin/products/add",
            &admin,
            json!({
                "name": "Green Tea",
                "description": "Organic green tea bags",
                "category": "Beverages",
                "price": "249.00",
                "stock": 40,
                "unit": "box",
                "rating": "4.2"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Product added successfully");
    let id = body["product"]["id"].clone();
    assert_eq!(body["product"]["unit"], "box");

    let (status, body) = app
        .put(
            &format!("/api/admin/products/update/{id}"),
            &admin,
            json!({ "stock": 35, "price": 199 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["product"]["stock"], 35);
    assert_eq!(decimal(&body["product"]["price"]), Decimal::from(199));
    assert_eq!(body["product"]["name"], "Green Tea");

    let (status, body) = app.get("/api/admin/products", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .delete(&format!("/api/admin/products/delete/{id}"), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = app
        .delete(&format!("/api/admin/products/delete/{id}"), &admin)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_add_product_defaults_and_validation() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;

    let (status, body) = app
        .post(
            "/api/admin/products/add",
            &admin,
            json!({
                "name": "Dish Soap",
                "description": "Lemon dish soap",
                "category": "Household",
                "price": 55,
                "stock": 12
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["product"]["unit"], "piece");
    assert_eq!(decimal(&body["product"]["rating"]), Decimal::ZERO);

    for bad in [
        json!({ "name": "X", "description": "d", "category": "Household", "price": -1, "stock": 1 }),
        json!({ "name": "X", "description": "d", "category": "Household", "price": "79228162514264337593543950335", "stock": 1 }),
        json!({ "name": "X", "description": "d", "category": "Household", "price": "1.005", "stock": 1 }),
        json!({ "name": "X", "description": "d", "category": "Household", "price": 1, "stock": -1 }),
        json!({ "name": " ", "description": "d", "category": "Household", "price": 1, "stock": 1 }),
        json!({ "name": "X", "description": "d", "category": "Household", "price": 1, "stock": 1, "rating": 6 }),
        json!({ "name": "X", "description": "d", "category": "Toys", "price": 1, "stock": 1 }),
        json!({ "name": "X", "category": "Household", "price": 1, "stock": 1 }),
    ] {
        let (status, body) = app.post("/api/admin/products/add", &admin, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["kind"], "validation");
    }
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;

    let (status, body) = app
        .put("/api/admin/products/update/777", &admin, json!({ "stock": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_customers_listing() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;
    app.user("first@example.com", Role::User).await;
    app.user("second@example.com", Role::User).await;

    let (status, body) = app.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "user"));
}

#[tokio::test]
async fn test_orders_listing_and_status_updates() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;
    let (customer, token) = app.login("buyer@example.com", Role::User).await;
    let atta = app.product("Wheat Atta", 320, 10).await;

    app.add_to_cart(&token, &atta, 1).await;
    let (_, placed) = app.post("/api/order/create", &token, json!({})).await;
    let order_id = placed["order"]["id"].clone();

    let (status, body) = app.get("/api/admin/orders", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id);
    assert_eq!(orders[0]["customer"]["email"], customer.email.as_str());

    let status_path = format!("/api/admin/orders/{order_id}/status");
    let (status, body) = app
        .put(&status_path, &admin, json!({ "status": "Out for Delivery" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Order status updated");
    assert_eq!(body["order"]["status"], "Out for Delivery");
    assert!(body["order"]["deliveryDate"].is_null());

    let (_, body) = app
        .get("/api/admin/orders?status=Out%20for%20Delivery", Some(&admin))
        .await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    let (_, body) = app.get("/api/admin/orders?status=Pending", Some(&admin)).await;
    assert!(body["orders"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(body["stats"]["deliveriesToday"], 1);
    assert_eq!(body["stats"]["pendingOrders"], 0);

    let (status, body) = app
        .put(&status_path, &admin, json!({ "status": "Delivered" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Delivered");
    assert!(body["order"]["deliveryDate"].is_string());

    // Repeating is accepted
    let (status, body) = app
        .put(&status_path, &admin, json!({ "status": "Delivered" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Delivered");

    let (status, body) = app
        .put(&status_path, &admin, json!({ "status": "Shipped" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) = app
        .put("/api/admin/orders/999/status", &admin, json!({ "status": "Confirmed" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/admin/orders?status=Lost", Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_dashboard_counts() {
    let app = TestApp::new();
    let (_, admin) = app.login("admin@example.com", Role::Admin).await;
    let (_, token) = app.login("shopper@example.com", Role::User).await;
    app.user("quiet@example.com", Role::User).await;

    let salt = app.product("Salt", 20, 3).await;
    app.product("Sugar", 45, 50).await;
    app.product("Jaggery", 90, 9).await;

    app.add_to_cart(&token, &salt, 1).await;
    app.post("/api/order/create", &token, json!({})).await;

    let (status, body) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["stats"];
    assert_eq!(stats["totalProducts"], 3);
    assert_eq!(stats["lowStockCount"], 2);
    assert_eq!(stats["totalCustomers"], 2);
    assert_eq!(stats["pendingOrders"], 1);
    assert_eq!(stats["deliveriesToday"], 0);
}
