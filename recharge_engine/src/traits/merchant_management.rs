use chrono::{DateTime, Utc};
use thiserror::Error;

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
};

#[derive(Debug, Clone, Error)]
pub enum MerchantApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Merchant {0} does not exist")]
    MerchantNotFound(String),
    #[error("Game {0} does not exist")]
    GameNotFound(String),
    #[error("SKU {0} does not exist")]
    SkuNotFound(String),
    #[error("Application {0} does not exist")]
    ApplicationNotFound(String),
    #[error("User is already linked to a merchant")]
    AlreadyMerchant,
    #[error("A pending application already exists")]
    DuplicateApplication,
    #[error("Application is not pending")]
    ApplicationNotPending,
}

impl From<sqlx::Error> for MerchantApiError {
    fn from(e: sqlx::Error) -> Self {
        MerchantApiError::DatabaseError(e.to_string())
    }
}

/// Merchant lifecycle: the merchant console (games, SKUs, orders, stats), the admin console
/// (merchant CRUD and binding management) and the application workflow that turns users into
/// merchants.
///
/// Access control does not live here. The server layer resolves the caller's merchant scope and
/// checks game access (via [`merchant_has_game_access`][Self::merchant_has_game_access]) before
/// calling the mutating methods.
#[allow(async_fn_in_trait)]
pub trait MerchantManagement {
    async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError>;

    /// The bare game row. The console delete flow needs the owner without the SKU payload.
    async fn fetch_game_record(&self, game_id: &str) -> Result<Option<Game>, MerchantApiError>;

    /// Games the merchant owns or is actively bound to, each with its SKUs.
    async fn fetch_games_for_merchant(&self, merchant_id: &str) -> Result<Vec<GameWithSkus>, MerchantApiError>;

    /// True when the merchant owns the game or holds an active binding to it.
    async fn merchant_has_game_access(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError>;

    /// Creates a game owned by `game.merchant_id` together with an active self-binding, in one
    /// transaction.
    async fn create_game_with_binding(&self, game: NewGame) -> Result<Game, MerchantApiError>;

    /// Creates a game without touching the binding table. Admin use.
    async fn create_game(&self, game: NewGame) -> Result<Game, MerchantApiError>;

    async fn update_game(&self, game_id: &str, update: GameUpdate) -> Result<Option<Game>, MerchantApiError>;

    /// Deletes the game, cascading its SKUs, bindings and orders. Returns false if the game did
    /// not exist.
    async fn delete_game(&self, game_id: &str) -> Result<bool, MerchantApiError>;

    /// Deactivates the merchant's binding to the game, leaving the game itself alone. Returns
    /// false if no binding existed.
    async fn deactivate_binding(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError>;

    async fn fetch_sku(&self, sku_id: &str) -> Result<Option<Sku>, MerchantApiError>;

    async fn fetch_skus_for_game(&self, game_id: &str) -> Result<Vec<Sku>, MerchantApiError>;

    /// Inserts a SKU. When `sku.sort_order` is `None`, assigns max(sort_order) + 1 within the
    /// game, in the same transaction as the insert.
    async fn create_sku(&self, sku: NewSku) -> Result<Sku, MerchantApiError>;

    async fn update_sku(&self, sku_id: &str, update: SkuUpdate) -> Result<Option<Sku>, MerchantApiError>;

    async fn delete_sku(&self, sku_id: &str) -> Result<bool, MerchantApiError>;

    /// The merchant's orders, newest first, at most `limit` rows.
    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<OrderWithNames>, MerchantApiError>;

    /// Dashboard aggregates. `now` anchors the "today" window (the UTC day containing it).
    async fn fetch_merchant_stats(
        &self,
        merchant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MerchantStats, MerchantApiError>;

    //---------------------------------------- Admin console ----------------------------------------

    async fn fetch_merchants_with_stats(&self) -> Result<Vec<MerchantWithStats>, MerchantApiError>;

    /// Creates a merchant and, in the same transaction, active bindings to each game in
    /// `game_ids`.
    async fn create_merchant(
        &self,
        merchant: NewMerchant,
        game_ids: &[String],
    ) -> Result<Merchant, MerchantApiError>;

    async fn update_merchant(
        &self,
        merchant_id: &str,
        update: MerchantUpdate,
    ) -> Result<Option<Merchant>, MerchantApiError>;

    /// Replaces the merchant's bindings with active bindings to exactly `game_ids`, in one
    /// transaction.
    async fn replace_merchant_bindings(
        &self,
        merchant_id: &str,
        game_ids: &[String],
    ) -> Result<Vec<MerchantGameLink>, MerchantApiError>;

    //---------------------------------------- Applications ----------------------------------------

    /// Files a merchant application for the user. Fails with [`MerchantApiError::AlreadyMerchant`]
    /// when the user is linked to a merchant, and with
    /// [`MerchantApiError::DuplicateApplication`] when a `PENDING` application exists.
    async fn create_application(
        &self,
        user_id: &str,
        application: NewMerchantApplication,
    ) -> Result<MerchantApplication, MerchantApiError>;

    /// The user's newest application, if any.
    async fn newest_application_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<MerchantApplication>, MerchantApiError>;

    /// All applications, newest first, optionally filtered by status.
    async fn fetch_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<MerchantApplication>, MerchantApiError>;

    /// Approves a `PENDING` application. In one transaction: creates an `ACTIVE` merchant named
    /// after the company, links the applicant to it, promotes the applicant's role to
    /// `MERCHANT`, and marks the application `APPROVED` with the optional review note.
    async fn approve_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<ApprovedApplication, MerchantApiError>;

    /// Rejects a `PENDING` application with the optional review note.
    async fn reject_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<MerchantApplication, MerchantApiError>;
}
