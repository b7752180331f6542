//! Tests for the demo identity source. The mode is fixed at server startup; these tests pin down
//! that the `X-Demo-*` headers only mean something when the demo source is configured.
use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use recharge_engine::{
    db_types::{Merchant, MerchantStatus, Order, OrderStatus, Role, User, UserIdentity},
    order_objects::{MerchantStats, OrderWithNames},
    MerchantApi,
    OrderFlowApi,
    UserApi,
};
use rgp_common::MinorUnits;

use super::helpers::send_request_with_source;
use crate::{
    config::{IdentityMode, ServerOptions},
    endpoint_tests::mocks::{MockConsoleManager, MockOrderManager},
    middleware::IdentitySource,
    routes::{AdminUsersRoute, DemoPayRoute, MerchantStatsRoute, MyProfileRoute},
};

#[actix_web::test]
async fn demo_headers_are_inert_in_jwt_mode() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/users").insert_header(("X-Demo-Role", "admin"));
    let err = send_request_with_source(req, "", jwt_source(), configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication required");
}

#[actix_web::test]
async fn demo_admin_headers_grant_access() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/users").insert_header(("X-Demo-Role", "admin"));
    let (status, body) =
        send_request_with_source(req, "", IdentitySource::Demo, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn unknown_demo_roles_are_ignored() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/users").insert_header(("X-Demo-Role", "superuser"));
    let err = send_request_with_source(req, "", IdentitySource::Demo, configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication required");
}

#[actix_web::test]
async fn demo_requests_without_headers_are_anonymous() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/me");
    let err = send_request_with_source(req, "", IdentitySource::Demo, configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. Authentication required.");
}

#[actix_web::test]
async fn demo_merchant_headers_set_the_merchant_scope() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/merchant/stats")
        .insert_header(("X-Demo-Role", "merchant"))
        .insert_header(("X-Demo-Merchant-Id", "m77"));
    let (status, body) =
        send_request_with_source(req, "", IdentitySource::Demo, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, STATS_JSON);
}

#[actix_web::test]
async fn demo_pay_marks_the_callers_order_paid() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/orders/ord_1/demo-pay").insert_header(("X-Demo-Role", "user"));
    let (status, body) =
        send_request_with_source(req, "", IdentitySource::Demo, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, DEMO_ORDER_JSON);
}

fn jwt_source() -> IdentitySource {
    IdentitySource::Jwt(crate::auth::hs256_key(&super::helpers::get_auth_config()))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().returning(|order_id| match order_id {
        "ord_1" => Ok(Some(demo_order(OrderStatus::Pending))),
        _ => Ok(None),
    });
    orders.expect_update_order_status().returning(|_, status| Ok(Some(demo_order(status))));
    orders.expect_fetch_order_with_names().returning(|_| {
        Ok(Some(OrderWithNames {
            order: demo_order(OrderStatus::Paid),
            game_name: "Star Forge".to_string(),
            sku_name: "60 crystals".to_string(),
        }))
    });
    let mut merchants = MockConsoleManager::new();
    merchants.expect_fetch_merchant().returning(|merchant_id| match merchant_id {
        "m77" => Ok(Some(Merchant {
            id: "m77".to_string(),
            name: "Demo Merchant".to_string(),
            email: None,
            status: MerchantStatus::Active,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        })),
        _ => Ok(None),
    });
    merchants.expect_fetch_merchant_stats().returning(|_, _| Ok(MerchantStats::default()));
    let mut users = MockConsoleManager::new();
    users.expect_upsert_user().returning(|identity| Ok(demo_user(identity)));
    users.expect_fetch_users_with_counts().returning(|| Ok(vec![]));
    let order_api = OrderFlowApi::new(orders);
    let merchant_api = MerchantApi::new(merchants);
    let user_api = UserApi::new(users);
    cfg.service(AdminUsersRoute::<MockConsoleManager>::new())
        .service(MyProfileRoute::<MockConsoleManager>::new())
        .service(MerchantStatsRoute::<MockConsoleManager>::new())
        .service(DemoPayRoute::<MockOrderManager, MockConsoleManager>::new())
        .app_data(web::Data::new(order_api))
        .app_data(web::Data::new(merchant_api))
        .app_data(web::Data::new(user_api))
        .app_data(web::Data::new(ServerOptions { identity_mode: IdentityMode::Demo }));
}

fn demo_user(identity: &UserIdentity) -> User {
    let ts = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    User {
        id: "u_demo".to_string(),
        sub: identity.sub.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        role: identity.role,
        created_at: ts,
        updated_at: ts,
    }
}

fn demo_order(status: OrderStatus) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    Order {
        id: "ord_1".to_string(),
        user_id: "u_demo".to_string(),
        merchant_id: "m1".to_string(),
        game_id: "g1".to_string(),
        sku_id: "s1".to_string(),
        visitor_id: "demo|user".to_string(),
        amount: MinorUnits::from(500),
        currency: "JPY".to_string(),
        status,
        provider: None,
        provider_payment_id: None,
        created_at: ts,
        updated_at: ts,
    }
}

const STATS_JSON: &str =
    r#"{"total_orders":0,"paid_orders":0,"revenue":0,"today_orders":0,"today_paid_orders":0,"today_revenue":0}"#;

const DEMO_ORDER_JSON: &str = r#"{"id":"ord_1","user_id":"u_demo","merchant_id":"m1","game_id":"g1","sku_id":"s1","visitor_id":"demo|user","amount":500,"currency":"JPY","status":"PAID","provider":null,"provider_payment_id":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","game_name":"Star Forge","sku_name":"60 crystals"}"#;
