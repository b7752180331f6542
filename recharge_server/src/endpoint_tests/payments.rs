//! Tests for the checkout preconditions. The provider clients are real but never called: every
//! test here fails the ownership or status check before a network request would go out.
use actix_web::{web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use payment_providers::{PayPalApi, PayPalConfig, StripeApi, StripeConfig};
use recharge_engine::{
    db_types::{Order, OrderStatus, Role, User},
    OrderFlowApi,
    UserApi,
};
use rgp_common::MinorUnits;
use serde_json::json;

use super::helpers::{claims_for, issue_token, post_request};
use crate::{
    endpoint_tests::mocks::{MockOrderManager, MockUserManager},
    payment_routes::{PaypalCaptureRoute, PaypalOrderRoute, StripeIntentRoute},
};

#[actix_web::test]
async fn checkout_requires_authentication() {
    let _ = env_logger::try_init().ok();
    let err = post_request("", "/payments/stripe/intent", json!({"order_id": "ord_1"}), configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Authentication required.");
}

#[actix_web::test]
async fn only_pending_orders_can_start_checkout() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err = post_request(&token, "/payments/stripe/intent", json!({"order_id": "ord_paid"}), configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "The order cannot be paid. Order is not pending");
}

#[actix_web::test]
async fn foreign_orders_are_indistinguishable_from_missing_ones() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let err = post_request(&token, "/payments/paypal/order", json!({"order_id": "ord_x"}), configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "The data was not found. Order ord_x does not exist");
}

#[actix_web::test]
async fn captures_need_an_owned_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = json!({"order_id": "ord_x", "provider_order_id": "PP-1"});
    let err = post_request(&token, "/payments/paypal/capture", body, configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. Order ord_x does not exist");
}

fn valid_token() -> String {
    issue_token(claims_for("auth0|alice", vec![Role::User], None), Duration::hours(1))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_for_user().returning(|order_id, _| match order_id {
        "ord_paid" => Ok(Some(paid_order())),
        _ => Ok(None),
    });
    let mut users = MockUserManager::new();
    users.expect_upsert_user().returning(|_| Ok(alice()));
    let stripe = StripeApi::new(StripeConfig::default()).expect("Stripe client should build");
    let paypal = PayPalApi::new(PayPalConfig::default()).expect("PayPal client should build");
    cfg.service(StripeIntentRoute::<MockOrderManager, MockUserManager>::new())
        .service(PaypalOrderRoute::<MockOrderManager, MockUserManager>::new())
        .service(PaypalCaptureRoute::<MockOrderManager, MockUserManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(orders)))
        .app_data(web::Data::new(UserApi::new(users)))
        .app_data(web::Data::new(stripe))
        .app_data(web::Data::new(paypal));
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

fn paid_order() -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    Order {
        id: "ord_paid".to_string(),
        user_id: "u1".to_string(),
        merchant_id: "m1".to_string(),
        game_id: "g1".to_string(),
        sku_id: "s1".to_string(),
        visitor_id: "auth0|alice".to_string(),
        amount: MinorUnits::from(500),
        currency: "JPY".to_string(),
        status: OrderStatus::Paid,
        provider: Some("STRIPE".to_string()),
        provider_payment_id: Some("pi_123".to_string()),
        created_at: ts,
        updated_at: ts,
    }
}
