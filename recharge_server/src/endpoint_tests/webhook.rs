//! Tests for the Stripe webhook: the signature middleware in front of it and the
//! always-acknowledge behavior of the handler behind it.
use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use recharge_engine::{
    db_types::{Order, OrderStatus},
    order_objects::OrderWithNames,
    OrderFlowApi,
};
use rgp_common::{MinorUnits, Secret};

use crate::{
    endpoint_tests::mocks::MockOrderManager,
    helpers::stripe_signature,
    middleware::StripeSignatureMiddlewareFactory,
    payment_routes::StripeWebhookRoute,
};

const WEBHOOK_SECRET: &str = "whsec_test_do_not_reuse";

#[actix_web::test]
async fn webhooks_without_a_signature_are_rejected() {
    let _ = env_logger::try_init().ok();
    let err = webhook_request(SUCCEEDED_EVENT, None, true, configure).await.expect_err("Expected error");
    assert_eq!(err, "No Stripe signature found.");
}

#[actix_web::test]
async fn malformed_signature_headers_are_rejected() {
    let _ = env_logger::try_init().ok();
    let err = webhook_request(SUCCEEDED_EVENT, Some("not-a-signature".to_string()), true, configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Malformed Stripe signature.");
}

#[actix_web::test]
async fn stale_timestamps_are_rejected() {
    let _ = env_logger::try_init().ok();
    let stale = Utc::now().timestamp() - 4000;
    let err =
        webhook_request(SUCCEEDED_EVENT, Some(signed(stale, SUCCEEDED_EVENT)), true, configure).await.expect_err("Expected error");
    assert_eq!(err, "Stripe signature is outside the tolerance window.");
}

#[actix_web::test]
async fn wrong_signatures_are_rejected() {
    let _ = env_logger::try_init().ok();
    let now = Utc::now().timestamp();
    let err = webhook_request(SUCCEEDED_EVENT, Some(format!("t={now},v1=deadbeef")), true, configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Invalid Stripe signature.");
}

#[actix_web::test]
async fn a_signed_success_event_marks_the_order_paid() {
    let _ = env_logger::try_init().ok();
    let now = Utc::now().timestamp();
    let (status, body) = webhook_request(SUCCEEDED_EVENT, Some(signed(now, SUCCEEDED_EVENT)), true, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order ord_1 marked PAID"}"#);
}

#[actix_web::test]
async fn a_failed_payment_event_marks_the_order_failed() {
    let _ = env_logger::try_init().ok();
    let now = Utc::now().timestamp();
    let (status, body) = webhook_request(FAILED_EVENT, Some(signed(now, FAILED_EVENT)), true, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order ord_9 marked FAILED"}"#);
}

#[actix_web::test]
async fn unknown_orders_are_acknowledged_not_retried() {
    let _ = env_logger::try_init().ok();
    let now = Utc::now().timestamp();
    let (status, body) = webhook_request(UNKNOWN_ORDER_EVENT, Some(signed(now, UNKNOWN_ORDER_EVENT)), true, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":false,"message":"Unknown order ord_404"}"#);
}

#[actix_web::test]
async fn unhandled_event_types_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let now = Utc::now().timestamp();
    let (status, body) =
        webhook_request(REFUND_EVENT, Some(signed(now, REFUND_EVENT)), true, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Ignored event of type charge.refunded"}"#);
}

#[actix_web::test]
async fn disabled_checks_skip_verification() {
    let _ = env_logger::try_init().ok();
    let (status, body) = webhook_request(SUCCEEDED_EVENT, None, false, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order ord_1 marked PAID"}"#);
}

fn signed(timestamp: i64, body: &str) -> String {
    format!("t={timestamp},v1={}", stripe_signature(WEBHOOK_SECRET, timestamp, body.as_bytes()))
}

async fn webhook_request(
    body: &'static str,
    signature: Option<String>,
    checks: bool,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri("/webhook/stripe").set_payload(body);
    if let Some(signature) = signature {
        req = req.insert_header(("Stripe-Signature", signature));
    }
    let req = req.to_request();
    let app = App::new().service(
        web::scope("/webhook")
            .wrap(StripeSignatureMiddlewareFactory::new(Secret::new(WEBHOOK_SECRET.to_string()), checks))
            .configure(configure),
    );
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_attach_payment_provider().returning(|_, _, _| Ok(None));
    orders.expect_update_order_status().returning(|order_id, status| match order_id {
        "ord_1" | "ord_9" => Ok(Some(stripe_order(order_id, status))),
        _ => Ok(None),
    });
    orders.expect_fetch_order_with_names().returning(|order_id| {
        let status = if order_id == "ord_9" { OrderStatus::Failed } else { OrderStatus::Paid };
        Ok(Some(OrderWithNames {
            order: stripe_order(order_id, status),
            game_name: "Star Forge".to_string(),
            sku_name: "60 crystals".to_string(),
        }))
    });
    let order_api = OrderFlowApi::new(orders);
    cfg.service(StripeWebhookRoute::<MockOrderManager>::new()).app_data(web::Data::new(order_api));
}

fn stripe_order(order_id: &str, status: OrderStatus) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    Order {
        id: order_id.to_string(),
        user_id: "u1".to_string(),
        merchant_id: "m1".to_string(),
        game_id: "g1".to_string(),
        sku_id: "s1".to_string(),
        visitor_id: "auth0|alice".to_string(),
        amount: MinorUnits::from(500),
        currency: "JPY".to_string(),
        status,
        provider: Some("STRIPE".to_string()),
        provider_payment_id: Some("pi_1".to_string()),
        created_at: ts,
        updated_at: ts,
    }
}

const SUCCEEDED_EVENT: &str =
    r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","metadata":{"order_id":"ord_1"}}}}"#;

const FAILED_EVENT: &str =
    r#"{"id":"evt_4","type":"payment_intent.payment_failed","data":{"object":{"id":"pi_4","metadata":{"order_id":"ord_9"}}}}"#;

const UNKNOWN_ORDER_EVENT: &str =
    r#"{"id":"evt_2","type":"payment_intent.succeeded","data":{"object":{"id":"pi_2","metadata":{"order_id":"ord_404"}}}}"#;

const REFUND_EVENT: &str = r#"{"id":"evt_3","type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
