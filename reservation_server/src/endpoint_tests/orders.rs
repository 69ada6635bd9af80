use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use srg_common::Money;
use stock_reservation_engine::{
    db_types::{Order, OrderId, OrderItem, OrderStatus, StockLevel},
    events::EventProducers,
    order_objects::OrderWithItems,
    traits::ReservationError,
    ExpiryQueue,
    OrderFlowApi,
    OrderQueryApi,
};

use super::helpers::{delete_request, get_request, post_request, put_request};
use crate::{
    endpoint_tests::mocks::MockReservationBackend,
    routes::{
        health,
        CancelOrderRoute,
        CreateOrderRoute,
        OrderByIdRoute,
        OrdersSearchRoute,
        PayOrderRoute,
        ResetOrdersRoute,
        SetStockRoute,
        StockLevelRoute,
    },
};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/health", configure_health).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn create_order_reserves_stock() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders", "cust-42", NEW_ORDER_BODY, configure_create_ok).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, ORDER_WITH_ITEMS_JSON);
}

#[actix_web::test]
async fn create_order_requires_customer_header() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders", "", NEW_ORDER_BODY, configure_create_ok).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: The SRG-Customer-Id header is missing."}"#);
}

#[actix_web::test]
async fn create_order_with_insufficient_stock() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders", "cust-42", NEW_ORDER_BODY, configure_create_insufficient)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Insufficient stock for product 10 size 2. Requested 5, available 1"}"#);
}

#[actix_web::test]
async fn fetch_order_with_items() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/ord-0001", configure_query).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_WITH_ITEMS_JSON);
}

#[actix_web::test]
async fn fetch_missing_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/ord-9999", configure_query_missing).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #ord-9999 does not exist."}"#);
}

#[actix_web::test]
async fn search_orders_by_customer() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request("/search/orders?customer_id=cust-42", configure_search).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_LIST_JSON);
}

#[actix_web::test]
async fn pay_waiting_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders/ord-0001/pay", "", "", configure_pay_ok).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PAID_ORDER_JSON);
}

#[actix_web::test]
async fn pay_finalized_order_conflicts() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders/ord-0001/pay", "", "", configure_pay_finalized).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order #ord-0001 is already Expired and cannot change state"}"#);
}

#[actix_web::test]
async fn cancel_waiting_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders/ord-0001/cancel", "", "", configure_cancel).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CANCELLED_ORDER_JSON);
}

#[actix_web::test]
async fn fetch_stock_level() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/stock/10/2", configure_stock).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, STOCK_JSON);
}

#[actix_web::test]
async fn seed_stock_level() {
    let _ = env_logger::try_init().ok();
    let (status, body) = put_request("/test/stock", r#"{"product_id":10,"size_id":2,"available":25}"#, configure_seed_stock)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"product_id":10,"size_id":2,"available":25,"updated_at":"2024-08-20T12:00:00Z"}"#);
}

#[actix_web::test]
async fn reset_cancels_waiting_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = delete_request("/test/orders", configure_reset).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"cancelled":2}"#);
}

fn configure_health(cfg: &mut ServiceConfig) {
    cfg.service(health);
}

fn flow_api(backend: MockReservationBackend) -> OrderFlowApi<MockReservationBackend> {
    OrderFlowApi::new(backend, ExpiryQueue::new(), EventProducers::default(), Duration::minutes(15))
}

fn configure_create_ok(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend
        .expect_create_order()
        .returning(|_, _| Ok(OrderWithItems { order: waiting_order(), items: order_items() }));
    cfg.service(CreateOrderRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_create_insufficient(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_create_order().returning(|_, _| {
        Err(ReservationError::InsufficientStock { product_id: 10, size_id: 2, requested: 5, available: 1 })
    });
    cfg.service(CreateOrderRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_query(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend
        .expect_fetch_order_with_items()
        .returning(|_| Ok(Some(OrderWithItems { order: waiting_order(), items: order_items() })));
    cfg.service(OrderByIdRoute::<MockReservationBackend>::new()).app_data(web::Data::new(OrderQueryApi::new(backend)));
}

fn configure_query_missing(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_fetch_order_with_items().returning(|_| Ok(None));
    cfg.service(OrderByIdRoute::<MockReservationBackend>::new()).app_data(web::Data::new(OrderQueryApi::new(backend)));
}

fn configure_search(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_search_orders().returning(|query| {
        assert_eq!(query.customer_id.as_deref(), Some("cust-42"));
        Ok(vec![waiting_order()])
    });
    cfg.service(OrdersSearchRoute::<MockReservationBackend>::new())
        .app_data(web::Data::new(OrderQueryApi::new(backend)));
}

fn configure_pay_ok(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_mark_order_paid().returning(|_| Ok(paid_order()));
    cfg.service(PayOrderRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_pay_finalized(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend
        .expect_mark_order_paid()
        .returning(|_| Err(ReservationError::OrderAlreadyFinalized(OrderId("ord-0001".into()), OrderStatus::Expired)));
    cfg.service(PayOrderRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_cancel(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_cancel_order().returning(|_| Ok(cancelled_order()));
    cfg.service(CancelOrderRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_stock(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_fetch_stock_level().returning(|_, _| Ok(Some(stock_level(7))));
    cfg.service(StockLevelRoute::<MockReservationBackend>::new())
        .app_data(web::Data::new(OrderQueryApi::new(backend)));
}

fn configure_seed_stock(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_set_stock_level().returning(|_, _, available| Ok(stock_level(available)));
    cfg.service(SetStockRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

fn configure_reset(cfg: &mut ServiceConfig) {
    let mut backend = MockReservationBackend::new();
    backend.expect_cancel_all_waiting_orders().returning(|| Ok(vec![cancelled_order(), cancelled_order()]));
    cfg.service(ResetOrdersRoute::<MockReservationBackend>::new()).app_data(web::Data::new(flow_api(backend)));
}

// Mock rows returned by the reservation backend
fn waiting_order() -> Order {
    Order {
        id: 1,
        order_id: OrderId("ord-0001".into()),
        customer_id: "cust-42".to_string(),
        recipient_name: "Ben Chang".to_string(),
        recipient_phone: "021-555-0101".to_string(),
        recipient_address: "12 Harbour Lane".to_string(),
        subtotal: Money::from(5400),
        total_quantity: 3,
        points_used: 0,
        status: OrderStatus::WaitingPayment,
        expires_at: Some(Utc.with_ymd_and_hms(2024, 8, 20, 12, 15, 0).unwrap()),
        created_at: Utc.with_ymd_and_hms(2024, 8, 20, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 8, 20, 12, 0, 0).unwrap(),
    }
}

fn paid_order() -> Order {
    Order {
        status: OrderStatus::Paid,
        expires_at: None,
        updated_at: Utc.with_ymd_and_hms(2024, 8, 20, 12, 5, 0).unwrap(),
        ..waiting_order()
    }
}

fn cancelled_order() -> Order {
    Order {
        status: OrderStatus::Cancelled,
        expires_at: None,
        updated_at: Utc.with_ymd_and_hms(2024, 8, 20, 12, 7, 0).unwrap(),
        ..waiting_order()
    }
}

fn order_items() -> Vec<OrderItem> {
    vec![
        OrderItem { id: 1, order_id: 1, product_id: 10, size_id: 2, quantity: 1, unit_price: Money::from(2000) },
        OrderItem { id: 2, order_id: 1, product_id: 11, size_id: 3, quantity: 2, unit_price: Money::from(1700) },
    ]
}

fn stock_level(available: i64) -> StockLevel {
    StockLevel { product_id: 10, size_id: 2, available, updated_at: Utc.with_ymd_and_hms(2024, 8, 20, 12, 0, 0).unwrap() }
}

const NEW_ORDER_BODY: &str = r#"{"name":"Ben Chang","phone":"021-555-0101","address":"12 Harbour Lane","items":[{"product_id":10,"size_id":2,"quantity":1,"unit_price":2000},{"product_id":11,"size_id":3,"quantity":2,"unit_price":1700}]}"#;

const ORDER_WITH_ITEMS_JSON: &str = r#"{"order":{"id":1,"order_id":"ord-0001","customer_id":"cust-42","recipient_name":"Ben Chang","recipient_phone":"021-555-0101","recipient_address":"12 Harbour Lane","subtotal":5400,"total_quantity":3,"points_used":0,"status":"WaitingPayment","expires_at":"2024-08-20T12:15:00Z","created_at":"2024-08-20T12:00:00Z","updated_at":"2024-08-20T12:00:00Z"},"items":[{"id":1,"order_id":1,"product_id":10,"size_id":2,"quantity":1,"unit_price":2000},{"id":2,"order_id":1,"product_id":11,"size_id":3,"quantity":2,"unit_price":1700}]}"#;

const ORDER_LIST_JSON: &str = r#"[{"id":1,"order_id":"ord-0001","customer_id":"cust-42","recipient_name":"Ben Chang","recipient_phone":"021-555-0101","recipient_address":"12 Harbour Lane","subtotal":5400,"total_quantity":3,"points_used":0,"status":"WaitingPayment","expires_at":"2024-08-20T12:15:00Z","created_at":"2024-08-20T12:00:00Z","updated_at":"2024-08-20T12:00:00Z"}]"#;

const PAID_ORDER_JSON: &str =r#"{"id":1,"order_id":"ord-0001","customer_id":"cust-42","recipient_name":"Ben Chang","recipient_phone":"021-555-0101","recipient_address":"12 Harbour Lane","subtotal":5400,"total_quantity":3,"points_used":0,"status":"Paid","expires_at":null,"created_at":"2024-08-20T12:00:00Z","updated_at":"2024-08-20T12:05:00Z"}"#;

const CANCELLED_ORDER_JSON: &str = r#"{"id":1,"order_id":"ord-0001","customer_id":"cust-42","recipient_name":"Ben Chang","recipient_phone":"021-555-0101","recipient_address":"12 Harbour Lane","subtotal":5400,"total_quantity":3,"points_used":0,"status":"Cancelled","expires_at":null,"created_at":"2024-08-20T12:00:00Z","updated_at":"2024-08-20T12:07:00Z"}"#;

const STOCK_JSON: &str = r#"{"product_id":10,"size_id":2,"available":7,"updated_at":"2024-08-20T12:00:00Z"}"#;
