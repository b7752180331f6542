use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use recharge_engine::{
    catalog_objects::{GameSeller, GameWithSkus},
    db_types::{Game, Sku},
    CatalogApi,
};
use rgp_common::MinorUnits;

use super::helpers::get_request;
use crate::{
    endpoint_tests::mocks::MockCatalogManager,
    routes::{GameRoute, GameSellersRoute, GamesRoute},
};

#[actix_web::test]
async fn fetch_the_game_list() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/games", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, GAMES_JSON);
}

#[actix_web::test]
async fn fetch_a_single_game() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/games/g1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, GAME_JSON);
}

#[actix_web::test]
async fn unknown_games_are_not_found() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/games/g404", configure).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. No game with id g404");
}

#[actix_web::test]
async fn fetch_the_sellers_for_a_game() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/games/g1/merchants", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SELLERS_JSON);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog.expect_fetch_games().returning(|| Ok(vec![star_forge()]));
    catalog.expect_fetch_game().returning(|game_id| match game_id {
        "g1" => Ok(Some(star_forge())),
        _ => Ok(None),
    });
    catalog.expect_fetch_game_sellers().returning(|game_id| match game_id {
        "g1" => Ok(Some(vec![nova_games()])),
        _ => Ok(None),
    });
    let catalog_api = CatalogApi::new(catalog);
    cfg.service(GamesRoute::<MockCatalogManager>::new())
        .service(GameRoute::<MockCatalogManager>::new())
        .service(GameSellersRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(catalog_api));
}

// Mock response to the catalog fetches
fn star_forge() -> GameWithSkus {
    let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
    GameWithSkus {
        game: Game {
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
            downloads: Some("1.2M".to_string()),
            created_at: ts,
            updated_at: ts,
        },
        skus: vec![Sku {
            id: "s1".to_string(),
            game_id: "g1".to_string(),
            name_zh: "60水晶".to_string(),
            name_ja: "60クリスタル".to_string(),
            name_en: "60 crystals".to_string(),
            price: MinorUnits::from(500),
            original_price: MinorUnits::from(600),
            bonus: "+5 bonus".to_string(),
            currency: "JPY".to_string(),
            limited: false,
            image_url: None,
            sort_order: 1,
            created_at: ts,
            updated_at: ts,
        }],
    }
}

fn nova_games() -> GameSeller {
    GameSeller {
        merchant_id: "m1".to_string(),
        name: "Nova Games".to_string(),
        bound_since: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
    }
}

const GAME_JSON: &str = r#"{"id":"g1","merchant_id":"m1","name_zh":"星际熔炉","name_ja":"スターフォージ","name_en":"Star Forge","developer":"Nova Games","icon_url":"https://cdn.example.com/g1/icon.png","banner_url":"https://cdn.example.com/g1/banner.png","badge":"hot","rating":4.5,"downloads":"1.2M","created_at":"2024-01-15T08:00:00Z","updated_at":"2024-01-15T08:00:00Z","skus":[{"id":"s1","game_id":"g1","name_zh":"60水晶","name_ja":"60クリスタル","name_en":"60 crystals","price":500,"original_price":600,"bonus":"+5 bonus","currency":"JPY","limited":false,"image_url":null,"sort_order":1,"created_at":"2024-01-15T08:00:00Z","updated_at":"2024-01-15T08:00:00Z"}]}"#;

const GAMES_JSON: &str = r#"[{"id":"g1","merchant_id":"m1","name_zh":"星际熔炉","name_ja":"スターフォージ","name_en":"Star Forge","developer":"Nova Games","icon_url":"https://cdn.example.com/g1/icon.png","banner_url":"https://cdn.example.com/g1/banner.png","badge":"hot","rating":4.5,"downloads":"1.2M","created_at":"2024-01-15T08:00:00Z","updated_at":"2024-01-15T08:00:00Z","skus":[{"id":"s1","game_id":"g1","name_zh":"60水晶","name_ja":"60クリスタル","name_en":"60 crystals","price":500,"original_price":600,"bonus":"+5 bonus","currency":"JPY","limited":false,"image_url":null,"sort_order":1,"created_at":"2024-01-15T08:00:00Z","updated_at":"2024-01-15T08:00:00Z"}]}]"#;

const SELLERS_JSON: &str = r#"[{"merchant_id":"m1","name":"Nova Games","bound_since":"2024-01-15T08:00:00Z"}]"#;
