//! Tests for the merchant console routes: the role guard, merchant scope resolution and the
//! game access checks that keep one merchant out of another's catalogue.
use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use recharge_engine::{
    db_types::{Game, Merchant, MerchantStatus, Role, Sku, User, UserIdentity},
    MerchantApi,
    UserApi,
};
use rgp_common::MinorUnits;
use serde_json::json;

use super::helpers::{claims_for, delete_request, get_request, issue_token, put_request};
use crate::{
    endpoint_tests::mocks::MockConsoleManager,
    routes::{DeleteMerchantGameRoute, MerchantGamesRoute, UpdateMerchantSkuRoute},
};

#[actix_web::test]
async fn console_rejects_unauthenticated_requests() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/merchant/games", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication required");
}

#[actix_web::test]
async fn console_rejects_plain_users() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(claims_for("auth0|alice", vec![Role::User], None), Duration::hours(1));
    let err = get_request(&token, "/merchant/games", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn games_for_the_linked_merchant() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|mia", Some("m1"));
    let (status, body) = get_request(&token, "/merchant/games", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn the_merchant_link_is_a_fallback_for_the_claim() {
    let _ = env_logger::try_init().ok();
    // No merchant id in the token, but the user record is linked to m1.
    let token = merchant_token("auth0|mia", None);
    let (status, body) = get_request(&token, "/merchant/games", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn unlinked_accounts_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|nolink", None);
    let err = get_request(&token, "/merchant/games", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. No merchant is linked to this account");
}

#[actix_web::test]
async fn suspended_merchants_are_locked_out() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|sam", Some("m9"));
    let err = get_request(&token, "/merchant/games", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Merchant m9 is suspended");
}

#[actix_web::test]
async fn admins_bypass_suspension() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(claims_for("auth0|root", vec![Role::User, Role::Admin], Some("m9")), Duration::hours(1));
    let (status, body) = get_request(&token, "/merchant/games", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn sku_updates_need_game_access() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|mia", Some("m1"));
    // s9 belongs to g2, which m1 is not bound to.
    let err = put_request(&token, "/merchant/skus/s9", json!({"price": 700}), configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Merchant m1 has no access to game g2");
}

#[actix_web::test]
async fn owners_delete_their_games_outright() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|mia", Some("m1"));
    let (status, body) = delete_request(&token, "/merchant/games/g1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Game g1 deleted"}"#);
}

#[actix_web::test]
async fn other_sellers_only_step_out_of_their_binding() {
    let _ = env_logger::try_init().ok();
    let token = merchant_token("auth0|noa", Some("m2"));
    let (status, body) = delete_request(&token, "/merchant/games/g1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Binding for game g1 deactivated"}"#);
}

fn merchant_token(sub: &str, merchant_id: Option<&str>) -> String {
    issue_token(claims_for(sub, vec![Role::User, Role::Merchant], merchant_id), Duration::hours(1))
}

fn configure(cfg: &mut ServiceConfig) {
    let mut merchants = MockConsoleManager::new();
    merchants.expect_fetch_merchant().returning(|merchant_id| match merchant_id {
        "m1" => Ok(Some(merchant(merchant_id, MerchantStatus::Active))),
        "m2" => Ok(Some(merchant(merchant_id, MerchantStatus::Active))),
        "m9" => Ok(Some(merchant(merchant_id, MerchantStatus::Suspended))),
        _ => Ok(None),
    });
    merchants.expect_fetch_games_for_merchant().returning(|_| Ok(vec![]));
    merchants.expect_fetch_sku().returning(|sku_id| match sku_id {
        "s9" => Ok(Some(sku_in_g2())),
        _ => Ok(None),
    });
    merchants.expect_merchant_has_game_access().returning(|merchant_id, game_id| Ok(merchant_id == "m1" && game_id == "g1"));
    merchants.expect_fetch_game_record().returning(|game_id| match game_id {
        "g1" => Ok(Some(game_owned_by_m1())),
        _ => Ok(None),
    });
    merchants.expect_delete_game().returning(|_| Ok(true));
    merchants.expect_deactivate_binding().returning(|merchant_id, _| Ok(merchant_id == "m2"));
    let mut users = MockConsoleManager::new();
    users.expect_upsert_user().returning(|identity| Ok(user_for(identity)));
    users.expect_merchant_id_for_user().returning(|user_id| match user_id {
        "u_mia" => Ok(Some("m1".to_string())),
        _ => Ok(None),
    });
    let merchant_api = MerchantApi::new(merchants);
    let user_api = UserApi::new(users);
    cfg.service(MerchantGamesRoute::<MockConsoleManager>::new())
        .service(UpdateMerchantSkuRoute::<MockConsoleManager>::new())
        .service(DeleteMerchantGameRoute::<MockConsoleManager>::new())
        .app_data(web::Data::new(merchant_api))
        .app_data(web::Data::new(user_api));
}

// The user row mirrors whatever identity the middleware verified.
fn user_for(identity: &UserIdentity) -> User {
    let ts = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    let short = identity.sub.strip_prefix("auth0|").unwrap_or(&identity.sub);
    User {
        id: format!("u_{short}"),
        sub: identity.sub.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        role: identity.role,
        created_at: ts,
        updated_at: ts,
    }
}

fn merchant(id: &str, status: MerchantStatus) -> Merchant {
    let ts = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    Merchant {
        id: id.to_string(),
        name: format!("Merchant {id}"),
        email: None,
        status,
        created_at: ts,
        updated_at: ts,
    }
}

fn game_owned_by_m1() -> Game {
    let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
    Game {
        id: "g1".to_string(),
        merchant_id: "m1".to_string(),
        name_zh: "星际熔炉".to_string(),
        name_ja: "スターフォージ".to_string(),
        name_en: "Star Forge".to_string(),
        developer: "Nova Games".to_string(),
        icon_url: "https://cdn.example.com/g1/icon.png".to_string(),
        banner_url: "https://cdn.example.com/g1/banner.png".to_string(),
        badge: "hot".to_string(),
        rating: 4.5,
        downloads: None,
        created_at: ts,
        updated_at: ts,
    }
}

fn sku_in_g2() -> Sku {
    let ts = Utc.with_ymd_and_hms(2024, 1, 20, 8, 0, 0).unwrap();
    Sku {
        id: "s9".to_string(),
        game_id: "g2".to_string(),
        name_zh: "月卡".to_string(),
        name_ja: "月パス".to_string(),
        name_en: "Monthly pass".to_string(),
        price: MinorUnits::from(980),
        original_price: MinorUnits::from(980),
        bonus: String::new(),
        currency: "JPY".to_string(),
        limited: false,
        image_url: None,
        sort_order: 1,
        created_at: ts,
        updated_at: ts,
    }
}
