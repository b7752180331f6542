//! Shared fixtures for the integration tests. Each test gets its own throwaway Sqlite database.
#![allow(dead_code)]

use recharge_engine::{
    db_types::{
        Game,
        Merchant,
        MerchantStatus,
        MerchantUpdate,
        NewGame,
        NewMerchant,
        NewSku,
        Role,
        Sku,
        User,
        UserIdentity,
    },
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    MerchantApi,
    SqliteDatabase,
    UserApi,
};
use rgp_common::MinorUnits;

pub async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to the test database")
}

pub fn identity(sub: &str) -> UserIdentity {
    UserIdentity {
        sub: sub.to_string(),
        email: Some(format!("{sub}@example.com")),
        name: Some(sub.to_string()),
        role: Role::User,
    }
}

pub async fn seed_user(db: &SqliteDatabase, sub: &str) -> User {
    UserApi::new(db.clone()).sync_user(&identity(sub)).await.expect("Error syncing user")
}

pub async fn seed_merchant(db: &SqliteDatabase, name: &str, game_ids: &[String]) -> Merchant {
    MerchantApi::new(db.clone())
        .create_merchant(NewMerchant { name: name.to_string(), email: None }, game_ids)
        .await
        .expect("Error creating merchant")
}

pub async fn suspend_merchant(db: &SqliteDatabase, merchant_id: &str) {
    let update = MerchantUpdate { status: Some(MerchantStatus::Suspended), ..Default::default() };
    MerchantApi::new(db.clone())
        .update_merchant(merchant_id, update)
        .await
        .expect("Error updating merchant")
        .expect("Merchant to suspend does not exist");
}

pub fn game_fixture(owner_id: &str, name: &str) -> NewGame {
    NewGame {
        merchant_id: owner_id.to_string(),
        name_zh: format!("{name} (zh)"),
        name_ja: format!("{name} (ja)"),
        name_en: name.to_string(),
        developer: "Umbrella Interactive".to_string(),
        icon_url: format!("https://cdn.example.com/{name}/icon.png"),
        banner_url: format!("https://cdn.example.com/{name}/banner.png"),
        badge: "hot".to_string(),
        rating: Some(4.6),
        downloads: Some("1M+".to_string()),
    }
}

pub fn sku_fixture(game_id: &str, name: &str, price: i64) -> NewSku {
    NewSku {
        game_id: game_id.to_string(),
        name_zh: format!("{name} (zh)"),
        name_ja: format!("{name} (ja)"),
        name_en: name.to_string(),
        price: MinorUnits::from(price),
        original_price: MinorUnits::from(price + 200),
        bonus: "+80 bonus crystals".to_string(),
        currency: "JPY".to_string(),
        limited: None,
        image_url: None,
        sort_order: None,
    }
}

/// Seeds an owner merchant, one game they own (no binding row) and one SKU on that game.
pub async fn seed_catalog(db: &SqliteDatabase) -> (Merchant, Game, Sku) {
    let api = MerchantApi::new(db.clone());
    let owner = seed_merchant(db, "Owner Arcade", &[]).await;
    let game = api.create_game(game_fixture(&owner.id, "Starlight Drift")).await.expect("Error creating game");
    let sku = api.create_sku(sku_fixture(&game.id, "60 crystals", 980)).await.expect("Error creating SKU");
    (owner, game, sku)
}
