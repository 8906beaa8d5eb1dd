//! Repository and router tests against a live database.
//!
//! Enabled with `--features database`; each test gets a fresh, migrated
//! database from `#[sqlx::test]`.

#![cfg(feature = "database")]
#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use food_admin::db::{CartRepository, ItemRepository, OrderFilter, OrderRepository};
use food_admin::models::{Item, NewItem};
use food_admin::services::auth::{MOCK_TOKEN, MOCK_USER_ID};
use food_admin_core::{ItemSize, OrderId, OrderStatus, Pagination, Price, ReportPeriod};
use food_admin_integration_tests::{app_with_pool, get, json_request, send};

const DELIVERY: &str = r#"{
    "firstName": "Ayesha",
    "lastName": "Malik",
    "phoneNumber": "03001234567",
    "street": "14 Canal View",
    "city": "Lahore"
}"#;

fn delivery() -> serde_json::Value {
    serde_json::from_str(DELIVERY).unwrap()
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

async fn create_item(pool: &PgPool, name: &str, price: &str, category: &str, available: bool) -> Item {
    ItemRepository::new(pool)
        .create(&NewItem {
            name: name.to_string(),
            price: Price::parse(price).unwrap(),
            category: category.to_string(),
            description: None,
            cover_image_url: format!("https://res.cloudinary.com/alifood/{name}.jpg"),
            detail_image_urls: vec![],
            sizes: vec![ItemSize::Small, ItemSize::Large],
            available,
        })
        .await
        .unwrap()
}

async fn insert_order(pool: &PgPool, total: &str, status: OrderStatus, created_at: &str) -> OrderId {
    let total: Decimal = total.parse().unwrap();
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO orders \
             (user_external_id, first_name, last_name, phone_number, street, city, \
              items, total, status, created_at) \
         VALUES ('user_2xK9', 'Ayesha', 'Malik', '03001234567', '14 Canal View', 'Lahore', \
                 $1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(json!([{ "Name": "Chicken Karahi", "quantity": 1, "price": total }]))
    .bind(total)
    .bind(status)
    .bind(at(created_at))
    .fetch_one(pool)
    .await
    .unwrap();
    OrderId::new(id)
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// March 2025 in the +05:00 store offset holds A, B and C only.
async fn seed_march(pool: &PgPool) {
    insert_order(pool, "450", OrderStatus::Pending, "2025-03-02T10:00:00Z").await;
    insert_order(pool, "1200", OrderStatus::Accepted, "2025-03-15T10:00:00Z").await;
    // 23:30 local on March 31st
    insert_order(pool, "99.50", OrderStatus::Delivered, "2025-03-31T18:30:00Z").await;
    // 00:30 local on April 1st
    insert_order(pool, "5000", OrderStatus::Delivered, "2025-03-31T19:30:00Z").await;
    // 23:00 local on February 28th
    insert_order(pool, "700", OrderStatus::Pending, "2025-02-28T18:00:00Z").await;
}

fn march(status: Option<OrderStatus>) -> OrderFilter {
    OrderFilter {
        period: ReportPeriod::Month { year: 2025, month: 3 },
        store_offset: chrono::FixedOffset::east_opt(5 * 3600).unwrap(),
        status,
    }
}

// =============================================================================
// Orders report
// =============================================================================

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_report_aggregates_cover_whole_range_not_page(pool: PgPool) {
    seed_march(&pool).await;
    let orders = OrderRepository::new(&pool);

    let first = orders
        .report(&march(None), Pagination::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(first.orders.len(), 2);
    assert_eq!(first.total_count, 3);
    assert_eq!(first.total_revenue.to_plain_string(), "1749.50");
    assert_eq!(first.orders[0].total.to_plain_string(), "99.50");
    assert_eq!(first.orders[1].total.to_plain_string(), "1200.00");

    let second = orders
        .report(&march(None), Pagination::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(second.orders.len(), 1);
    assert_eq!(second.total_count, 3);
    assert_eq!(second.total_revenue, first.total_revenue);

    let accepted = orders
        .report(&march(Some(OrderStatus::Accepted)), Pagination::default())
        .await
        .unwrap();
    assert_eq!(accepted.total_count, 1);
    assert_eq!(accepted.total_revenue.to_plain_string(), "1200.00");
}

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_unrepresentable_period_matches_nothing(pool: PgPool) {
    seed_march(&pool).await;

    let filter = OrderFilter {
        period: ReportPeriod::Year { year: i32::MAX },
        ..march(None)
    };
    let report = OrderRepository::new(&pool)
        .report(&filter, Pagination::default())
        .await
        .unwrap();
    assert!(report.orders.is_empty());
    assert_eq!(report.total_count, 0);
    assert_eq!(report.total_revenue, Price::ZERO);
}

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_report_endpoint(pool: PgPool) {
    seed_march(&pool).await;
    let app = app_with_pool(pool);

    let response = send(
        app.clone(),
        get("/api/orders?mode=month&year=2025&month=3&limit=2", Some(MOCK_TOKEN)),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["totalCount"], 3);
    assert_eq!(response.body["totalRevenue"], 1749.5);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["limit"], 2);
    assert_eq!(response.body["hasMore"], true);

    let orders = response.body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["total"], 99.5);
    assert_eq!(orders[0]["status"], "delivered");
    assert_eq!(orders[0]["PhoneNumber"], "03001234567");
    assert_eq!(orders[0]["items"][0]["Name"], "Chicken Karahi");

    let response = send(app, get("/api/orders", Some(MOCK_TOKEN))).await;
    assert_eq!(response.body["totalCount"], 5);
    assert_eq!(response.body["hasMore"], false);
}

// =============================================================================
// Status updates
// =============================================================================

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_conditional_status_update_loses_race(pool: PgPool) {
    let id = insert_order(&pool, "450", OrderStatus::Pending, "2025-03-02T10:00:00Z").await;
    let orders = OrderRepository::new(&pool);

    let accepted = orders
        .update_status(id, OrderStatus::Pending, OrderStatus::Accepted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status, OrderStatus::Accepted);

    // A second admin still holding the `pending` read
    let stale = orders
        .update_status(id, OrderStatus::Pending, OrderStatus::Accepted)
        .await
        .unwrap();
    assert!(stale.is_none());
    assert_eq!(
        orders.get(id).await.unwrap().unwrap().status,
        OrderStatus::Accepted
    );
}

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_status_endpoint_walks_forward_only(pool: PgPool) {
    let id = insert_order(&pool, "450", OrderStatus::Pending, "2025-03-02T10:00:00Z").await;
    let app = app_with_pool(pool);
    let uri = format!("/api/orders/{id}");

    let response = send(
        app.clone(),
        json_request("PATCH", &uri, Some(MOCK_TOKEN), &json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"]["code"], "INVALID_TRANSITION");

    let response = send(
        app.clone(),
        json_request("PATCH", &uri, Some(MOCK_TOKEN), &json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["order"]["status"], "accepted");

    let response = send(
        app.clone(),
        json_request("PATCH", &uri, Some(MOCK_TOKEN), &json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(
        app.clone(),
        json_request("PATCH", &uri, Some(MOCK_TOKEN), &json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = send(app, get(&uri, Some(MOCK_TOKEN))).await;
    assert_eq!(response.body["order"]["status"], "accepted");
}

// =============================================================================
// Checkout
// =============================================================================

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_checkout_with_empty_cart(pool: PgPool) {
    let app = app_with_pool(pool.clone());

    let response = send(
        app,
        json_request("POST", "/api/orders", Some(MOCK_TOKEN), &delivery()),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "CART_EMPTY");
    assert_eq!(count(&pool, "orders").await, 0);
}

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_checkout_with_unavailable_item_writes_nothing(pool: PgPool) {
    let lassi = create_item(&pool, "Mango Lassi", "300", "Drinks", false).await;
    let carts = CartRepository::new(&pool);
    let cart_id = carts.get_or_create_id(MOCK_USER_ID).await.unwrap();
    carts.add(cart_id, lassi.id, 2, None).await.unwrap();

    let response = send(
        app_with_pool(pool.clone()),
        json_request("POST", "/api/orders", Some(MOCK_TOKEN), &delivery()),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "ITEM_UNAVAILABLE");
    assert!(
        response.body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Mango Lassi")
    );
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "cart_items").await, 1);
}

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_checkout_places_order_and_clears_cart(pool: PgPool) {
    let zinger = create_item(&pool, "Zinger Burger", "650", "Burgers", true).await;
    let app = app_with_pool(pool.clone());

    let response = send(
        app.clone(),
        json_request(
            "POST",
            "/api/cart",
            Some(MOCK_TOKEN),
            &json!({ "itemId": zinger.id, "quantity": 2, "size": "large" }),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(
        app.clone(),
        json_request("POST", "/api/orders", Some(MOCK_TOKEN), &delivery()),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let order = &response.body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], 1300.0);
    assert_eq!(order["user_id"], MOCK_USER_ID);
    assert_eq!(order["first_name"], "Ayesha");
    assert_eq!(order["items"][0]["Name"], "Zinger Burger");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["items"][0]["size"], "Large");

    assert_eq!(count(&pool, "orders").await, 1);
    assert_eq!(count(&pool, "cart_items").await, 0);

    let response = send(app, get("/api/cart", Some(MOCK_TOKEN))).await;
    assert_eq!(response.body["cart"]["itemCount"], 0);
}

// =============================================================================
// Cart
// =============================================================================

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_cart_merge_cannot_exceed_line_limit(pool: PgPool) {
    let fries = create_item(&pool, "Loaded Fries", "399", "Sides", true).await;
    let app = app_with_pool(pool);
    let body = json!({ "itemId": fries.id, "quantity": 600 });

    let response = send(
        app.clone(),
        json_request("POST", "/api/cart", Some(MOCK_TOKEN), &body),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(
        app.clone(),
        json_request("POST", "/api/cart", Some(MOCK_TOKEN), &body),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(response.body["error"]["details"][0]["field"], "quantity");

    let response = send(app, get("/api/cart", Some(MOCK_TOKEN))).await;
    let cart = &response.body["cart"];
    assert_eq!(cart["itemCount"], 1);
    assert_eq!(cart["items"][0]["quantity"], 600);
    assert_eq!(cart["total"], "239400.00");
}

// =============================================================================
// Items
// =============================================================================

#[sqlx::test(migrator = "food_admin::db::MIGRATOR")]
async fn test_item_list_and_show(pool: PgPool) {
    let zinger = create_item(&pool, "Zinger Burger", "650", "Burgers", true).await;
    create_item(&pool, "Mango Lassi", "300", "Drinks", false).await;
    let app = app_with_pool(pool);

    let response = send(app.clone(), get("/api/items", Some(MOCK_TOKEN))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["count"], 2);

    let response = send(
        app.clone(),
        get("/api/items?category=burgers&available=true", Some(MOCK_TOKEN)),
    )
    .await;
    assert_eq!(response.body["count"], 1);
    let item = &response.body["items"][0];
    assert_eq!(item["id"], zinger.id.to_string());
    assert_eq!(item["price"], 650.0);
    assert_eq!(item["imageUrl"], zinger.cover_image_url);
    assert_eq!(item["sizes"], json!(["Small", "Large"]));
    assert_eq!(item["detail_image_url"], json!([]));
    assert!(item["createdAt"].is_string());

    let response = send(
        app.clone(),
        get(&format!("/api/items/{}", zinger.id), Some(MOCK_TOKEN)),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item"]["name"], "Zinger Burger");
    assert_eq!(response.body["item"]["available"], true);

    let response = send(
        app,
        get(&format!("/api/items/{}", Uuid::new_v4()), Some(MOCK_TOKEN)),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
