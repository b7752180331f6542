use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use log::debug;
use recharge_engine::{
    db_types::{Order, OrderStatus, Role, User},
    helpers::ResolutionError,
    order_objects::OrderWithNames,
    traits::OrderApiError,
    OrderFlowApi,
    UserApi,
};
use rgp_common::MinorUnits;
use serde_json::json;

use super::helpers::{claims_for, get_request, issue_token, post_request};
use crate::{
    config::{IdentityMode, ServerOptions},
    endpoint_tests::mocks::{MockOrderManager, MockUserManager},
    routes::{CreateOrderRoute, DemoPayRoute, MyOrdersRoute},
};

#[actix_web::test]
async fn create_order_requires_authentication() {
    let _ = env_logger::try_init().ok();
    let err = post_request("", "/orders", json!({"sku_id": "s1"}), configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Authentication required.");
}

#[actix_web::test]
async fn place_an_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let (status, body) = post_request(&token, "/orders", json!({"sku_id": "s1"}), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let (status, body) = get_request(&token, "/orders/me", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn tampered_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token();
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("🚀️ Calling /orders/me with tampered token {token}");
    let err = get_request(&token, "/orders/me", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Access token is invalid. signature has failed verification");
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(claims_for("auth0|alice", vec![Role::User], None), Duration::hours(-1));
    let err = get_request(&token, "/orders/me", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Access token is invalid. token has expired");
}

#[actix_web::test]
async fn empty_sku_ids_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err = post_request(&token, "/orders", json!({"sku_id": "  "}), configure).await.expect_err("Expected error");
    assert_eq!(err, "Invalid request. sku_id must not be empty");
}

#[actix_web::test]
async fn unknown_skus_are_not_found() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err = post_request(&token, "/orders", json!({"sku_id": "sku_x"}), configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. SKU sku_x does not exist");
}

#[actix_web::test]
async fn orders_without_an_active_seller_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err =
        post_request(&token, "/orders", json!({"sku_id": "s_drought"}), configure).await.expect_err("Expected error");
    assert_eq!(err, "No merchant can fulfil this order. No active merchant available for this game");
}

#[actix_web::test]
async fn demo_pay_is_hidden_outside_demo_mode() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err = post_request(&token, "/orders/ord_1/demo-pay", json!({}), configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. Demo checkout is not enabled");
}

fn valid_token() -> String {
    issue_token(claims_for("auth0|alice", vec![Role::User], None), Duration::hours(1))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_process_new_order().returning(|_, order| match order.sku_id.as_str() {
        "s1" => Ok(pending_order()),
        "s_drought" => Err(OrderApiError::Unresolvable(ResolutionError::NoActiveMerchant)),
        other => Err(OrderApiError::SkuNotFound(other.to_string())),
    });
    orders.expect_fetch_orders_for_user().returning(|_| Ok(vec![pending_order(), paid_order()]));
    let mut users = MockUserManager::new();
    users.expect_upsert_user().returning(|_| Ok(alice()));
    let order_api = OrderFlowApi::new(orders);
    let user_api = UserApi::new(users);
    cfg.service(CreateOrderRoute::<MockOrderManager, MockUserManager>::new())
        .service(MyOrdersRoute::<MockOrderManager, MockUserManager>::new())
        .service(DemoPayRoute::<MockOrderManager, MockUserManager>::new())
        .app_data(web::Data::new(order_api))
        .app_data(web::Data::new(user_api))
        .app_data(web::Data::new(ServerOptions { identity_mode: IdentityMode::Jwt }));
}

fn alice() -> User {
    let ts = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    User {
        id: "u1".to_string(),
        sub: "auth0|alice".to_string(),
        email: Some("alice@example.com".to_string()),
        name: Some("Alice".to_string()),
        role: Role::User,
        created_at: ts,
        updated_at: ts,
    }
}

// Mock response to `process_new_order`
fn pending_order() -> OrderWithNames {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    OrderWithNames {
        order: Order {
            id: "ord_1".to_string(),
            user_id: "u1".to_string(),
            merchant_id: "m1".to_string(),
            game_id: "g1".to_string(),
            sku_id: "s1".to_string(),
            visitor_id: "auth0|alice".to_string(),
            amount: MinorUnits::from(500),
            currency: "JPY".to_string(),
            status: OrderStatus::Pending,
            provider: None,
            provider_payment_id: None,
            created_at: ts,
            updated_at: ts,
        },
        game_name: "Star Forge".to_string(),
        sku_name: "60 crystals".to_string(),
    }
}

fn paid_order() -> OrderWithNames {
    OrderWithNames {
        order: Order {
            id: "ord_2".to_string(),
            user_id: "u1".to_string(),
            merchant_id: "m1".to_string(),
            game_id: "g1".to_string(),
            sku_id: "s2".to_string(),
            visitor_id: "auth0|alice".to_string(),
            amount: MinorUnits::from(1200),
            currency: "JPY".to_string(),
            status: OrderStatus::Paid,
            provider: Some("STRIPE".to_string()),
            provider_payment_id: Some("pi_123".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap(),
        },
        game_name: "Star Forge".to_string(),
        sku_name: "120 crystals".to_string(),
    }
}

const ORDER_JSON: &str = r#"{"id":"ord_1","user_id":"u1","merchant_id":"m1","game_id":"g1","sku_id":"s1","visitor_id":"auth0|alice","amount":500,"currency":"JPY","status":"PENDING","provider":null,"provider_payment_id":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","game_name":"Star Forge","sku_name":"60 crystals"}"#;

const ORDERS_JSON: &str = r#"[{"id":"ord_1","user_id":"u1","merchant_id":"m1","game_id":"g1","sku_id":"s1","visitor_id":"auth0|alice","amount":500,"currency":"JPY","status":"PENDING","provider":null,"provider_payment_id":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","game_name":"Star Forge","sku_name":"60 crystals"},{"id":"ord_2","user_id":"u1","merchant_id":"m1","game_id":"g1","sku_id":"s2","visitor_id":"auth0|alice","amount":1200,"currency":"JPY","status":"PAID","provider":"STRIPE","provider_payment_id":"pi_123","created_at":"2024-03-15T18:30:00Z","updated_at":"2024-03-16T11:20:00Z","game_name":"Star Forge","sku_name":"120 crystals"}]"#;
