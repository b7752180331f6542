//! The merchant console, the admin console and the application workflow.
use std::fmt::Debug;

use chrono::Utc;

use crate::{
    db_types::{
        ApplicationStatus,
        Game,
        GameUpdate,
        Merchant,
        MerchantApplication,
        MerchantGameLink,
        MerchantUpdate,
        NewGame,
        NewMerchant,
        NewMerchantApplication,
        NewSku,
        Sku,
        SkuUpdate,
    },
    rge_api::{
        catalog_objects::GameWithSkus,
        merchant_objects::{ApprovedApplication, MerchantWithStats},
        order_objects::{MerchantStats, OrderWithNames},
    },
    traits::{MerchantApiError, MerchantManagement},
};

/// The merchant order list is capped; dashboards page through history elsewhere.
pub const MERCHANT_ORDER_CAP: i64 = 100;

pub struct MerchantApi<B> {
    db: B,
}

impl<B: Debug> Debug for MerchantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MerchantApi ({:?})", self.db)
    }
}

impl<B> MerchantApi<B>
where B: MerchantManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError> {
        self.db.fetch_merchant(merchant_id).await
    }

    pub async fn game_record(&self, game_id: &str) -> Result<Option<Game>, MerchantApiError> {
        self.db.fetch_game_record(game_id).await
    }

    pub async fn games_for_merchant(&self, merchant_id: &str) -> Result<Vec<GameWithSkus>, MerchantApiError> {
        self.db.fetch_games_for_merchant(merchant_id).await
    }

    /// True when the merchant owns the game or holds an active binding to it. Admin callers
    /// bypass this check at the route layer.
    pub async fn has_game_access(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError> {
        self.db.merchant_has_game_access(merchant_id, game_id).await
    }

    pub async fn create_game_with_binding(&self, game: NewGame) -> Result<Game, MerchantApiError> {
        self.db.create_game_with_binding(game).await
    }

    pub async fn create_game(&self, game: NewGame) -> Result<Game, MerchantApiError> {
        self.db.create_game(game).await
    }

    pub async fn update_game(&self, game_id: &str, update: GameUpdate) -> Result<Option<Game>, MerchantApiError> {
        self.db.update_game(game_id, update).await
    }

    pub async fn delete_game(&self, game_id: &str) -> Result<bool, MerchantApiError> {
        self.db.delete_game(game_id).await
    }

    pub async fn deactivate_binding(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError> {
        self.db.deactivate_binding(merchant_id, game_id).await
    }

    pub async fn sku(&self, sku_id: &str) -> Result<Option<Sku>, MerchantApiError> {
        self.db.fetch_sku(sku_id).await
    }

    pub async fn skus_for_game(&self, game_id: &str) -> Result<Vec<Sku>, MerchantApiError> {
        self.db.fetch_skus_for_game(game_id).await
    }

    pub async fn create_sku(&self, sku: NewSku) -> Result<Sku, MerchantApiError> {
        self.db.create_sku(sku).await
    }

    pub async fn update_sku(&self, sku_id: &str, update: SkuUpdate) -> Result<Option<Sku>, MerchantApiError> {
        self.db.update_sku(sku_id, update).await
    }

    pub async fn delete_sku(&self, sku_id: &str) -> Result<bool, MerchantApiError> {
        self.db.delete_sku(sku_id).await
    }

    pub async fn orders_for_merchant(&self, merchant_id: &str) -> Result<Vec<OrderWithNames>, MerchantApiError> {
        self.db.fetch_orders_for_merchant(merchant_id, MERCHANT_ORDER_CAP).await
    }

    pub async fn stats_for_merchant(&self, merchant_id: &str) -> Result<MerchantStats, MerchantApiError> {
        self.db.fetch_merchant_stats(merchant_id, Utc::now()).await
    }

    //---------------------------------------- Admin console ----------------------------------------

    pub async fn merchants_with_stats(&self) -> Result<Vec<MerchantWithStats>, MerchantApiError> {
        self.db.fetch_merchants_with_stats().await
    }

    pub async fn create_merchant(
        &self,
        merchant: NewMerchant,
        game_ids: &[String],
    ) -> Result<Merchant, MerchantApiError> {
        self.db.create_merchant(merchant, game_ids).await
    }

    pub async fn update_merchant(
        &self,
        merchant_id: &str,
        update: MerchantUpdate,
    ) -> Result<Option<Merchant>, MerchantApiError> {
        self.db.update_merchant(merchant_id, update).await
    }

    pub async fn replace_merchant_bindings(
        &self,
        merchant_id: &str,
        game_ids: &[String],
    ) -> Result<Vec<MerchantGameLink>, MerchantApiError> {
        self.db.replace_merchant_bindings(merchant_id, game_ids).await
    }

    //---------------------------------------- Applications ----------------------------------------

    pub async fn apply(
        &self,
        user_id: &str,
        application: NewMerchantApplication,
    ) -> Result<MerchantApplication, MerchantApiError> {
        self.db.create_application(user_id, application).await
    }

    pub async fn newest_application_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<MerchantApplication>, MerchantApiError> {
        self.db.newest_application_for_user(user_id).await
    }

    pub async fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<MerchantApplication>, MerchantApiError> {
        self.db.fetch_applications(status).await
    }

    pub async fn approve_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<ApprovedApplication, MerchantApiError> {
        self.db.approve_application(application_id, review_note).await
    }

    pub async fn reject_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<MerchantApplication, MerchantApiError> {
        self.db.reject_application(application_id, review_note).await
    }
}
