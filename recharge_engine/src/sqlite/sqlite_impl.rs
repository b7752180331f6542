//! `SqliteDatabase` is a concrete implementation of a recharge engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module. Multi-row flows (order creation, application approval, binding
//! replacement) run inside a single transaction; everything else borrows a pool connection.
use std::{collections::HashMap, fmt::Debug};

use chrono::{DateTime, NaiveTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{applications, db_url, games, merchant_games, merchants, new_pool, orders, skus, users};
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
        NewOrder,
        NewSku,
        Order,
        OrderStatus,
        Role,
        Sku,
        SkuUpdate,
        User,
        UserIdentity,
    },
    helpers::{resolve_seller, SellerCandidate},
    rge_api::{
        catalog_objects::{GameSeller, GameWithSkus},
        merchant_objects::{ApprovedApplication, MerchantWithStats},
        order_objects::{MerchantStats, OrderWithNames},
        user_objects::{UserDetail, UserWithCounts},
    },
    traits::{
        CatalogApiError,
        CatalogManagement,
        MerchantApiError,
        MerchantManagement,
        OrderApiError,
        OrderManagement,
        UserApiError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool using the value of the `RGP_DATABASE_URL` environment
    /// variable (or the default path).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await
    }
}

fn utc_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(now.date_naive().and_time(NaiveTime::MIN), Utc)
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_games(&self) -> Result<Vec<GameWithSkus>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let games = games::all_games(&mut conn).await?;
        let mut skus_by_game: HashMap<String, Vec<Sku>> = HashMap::new();
        for sku in skus::all_skus(&mut conn).await? {
            skus_by_game.entry(sku.game_id.clone()).or_default().push(sku);
        }
        let games = games
            .into_iter()
            .map(|game| {
                let skus = skus_by_game.remove(&game.id).unwrap_or_default();
                GameWithSkus { game, skus }
            })
            .collect();
        Ok(games)
    }

    async fn fetch_game(&self, game_id: &str) -> Result<Option<GameWithSkus>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let Some(game) = games::game_by_id(game_id, &mut conn).await? else {
            return Ok(None);
        };
        let skus = skus::skus_for_game(game_id, &mut conn).await?;
        Ok(Some(GameWithSkus { game, skus }))
    }

    async fn fetch_game_sellers(&self, game_id: &str) -> Result<Option<Vec<GameSeller>>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        if games::game_by_id(game_id, &mut conn).await?.is_none() {
            return Ok(None);
        }
        let sellers = merchant_games::sellers_for_game(game_id, &mut conn).await?;
        Ok(Some(sellers))
    }
}

impl OrderManagement for SqliteDatabase {
    async fn process_new_order(&self, user: &User, order: NewOrder) -> Result<OrderWithNames, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let sku = skus::sku_by_id(&order.sku_id, &mut tx)
            .await?
            .ok_or_else(|| OrderApiError::SkuNotFound(order.sku_id.clone()))?;
        let game = games::game_by_id(&sku.game_id, &mut tx).await?.ok_or_else(|| {
            OrderApiError::DatabaseError(format!("Game {} referenced by SKU {} is missing", sku.game_id, sku.id))
        })?;
        let owner = merchants::merchant_by_id(&game.merchant_id, &mut tx).await?.ok_or_else(|| {
            OrderApiError::DatabaseError(format!("Owning merchant {} of game {} is missing", game.merchant_id, game.id))
        })?;
        let owner = SellerCandidate::new(owner.id, owner.status);
        let candidates = merchant_games::seller_candidates(&game.id, &mut tx).await?;
        let merchant_id = resolve_seller(order.merchant_id.as_deref(), &candidates, &owner)?;
        let inserted = orders::insert_order(user, &merchant_id, &sku, &mut tx).await?;
        let order = orders::order_with_names(&inserted.id, &mut tx)
            .await?
            .ok_or_else(|| OrderApiError::DatabaseError("Order vanished before it could be read back".to_string()))?;
        tx.commit().await?;
        debug!("🗃️ Order {} resolved to merchant {merchant_id} for user {}", order.order.id, user.id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_by_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_for_user(&self, order_id: &str, user_id: &str) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_for_user(order_id, user_id, &mut conn).await?)
    }

    async fn fetch_order_with_names(&self, order_id: &str) -> Result<Option<OrderWithNames>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_with_names(order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<OrderWithNames>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::orders_for_user(user_id, None, &mut conn).await?)
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::set_status(order_id, status, &mut conn).await?;
        if order.is_some() {
            debug!("🗃️ Order {order_id} status set to {status}");
        }
        Ok(order)
    }

    async fn attach_payment_provider(
        &self,
        order_id: &str,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::attach_provider(order_id, provider, provider_payment_id, &mut conn).await?;
        if order.is_some() {
            debug!("🗃️ Order {order_id} is being handled by {provider} ({provider_payment_id})");
        }
        Ok(order)
    }
}

impl MerchantManagement for SqliteDatabase {
    async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(merchants::merchant_by_id(merchant_id, &mut conn).await?)
    }

    async fn fetch_game_record(&self, game_id: &str) -> Result<Option<Game>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(games::game_by_id(game_id, &mut conn).await?)
    }

    async fn fetch_games_for_merchant(&self, merchant_id: &str) -> Result<Vec<GameWithSkus>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        let games = games::games_for_merchant(merchant_id, &mut conn).await?;
        let mut result = Vec::with_capacity(games.len());
        for game in games {
            let skus = skus::skus_for_game(&game.id, &mut conn).await?;
            result.push(GameWithSkus { game, skus });
        }
        Ok(result)
    }

    async fn merchant_has_game_access(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(games::has_game_access(merchant_id, game_id, &mut conn).await?)
    }

    async fn create_game_with_binding(&self, game: NewGame) -> Result<Game, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        let owner = game.merchant_id.clone();
        if merchants::merchant_by_id(&owner, &mut tx).await?.is_none() {
            return Err(MerchantApiError::MerchantNotFound(owner));
        }
        let game = games::insert_game(game, &mut tx).await?;
        merchant_games::upsert_binding(&owner, &game.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Game {} created and bound to owner {owner}", game.id);
        Ok(game)
    }

    async fn create_game(&self, game: NewGame) -> Result<Game, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        if merchants::merchant_by_id(&game.merchant_id, &mut conn).await?.is_none() {
            return Err(MerchantApiError::MerchantNotFound(game.merchant_id));
        }
        Ok(games::insert_game(game, &mut conn).await?)
    }

    async fn update_game(&self, game_id: &str, update: GameUpdate) -> Result<Option<Game>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(games::update_game(game_id, update, &mut conn).await?)
    }

    async fn delete_game(&self, game_id: &str) -> Result<bool, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = games::delete_game(game_id, &mut conn).await?;
        if deleted {
            debug!("🗃️ Game {game_id} deleted (SKUs, bindings and orders cascade)");
        }
        Ok(deleted)
    }

    async fn deactivate_binding(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(merchant_games::deactivate_binding(merchant_id, game_id, &mut conn).await?)
    }

    async fn fetch_sku(&self, sku_id: &str) -> Result<Option<Sku>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(skus::sku_by_id(sku_id, &mut conn).await?)
    }

    async fn fetch_skus_for_game(&self, game_id: &str) -> Result<Vec<Sku>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(skus::skus_for_game(game_id, &mut conn).await?)
    }

    async fn create_sku(&self, sku: NewSku) -> Result<Sku, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        if games::game_by_id(&sku.game_id, &mut tx).await?.is_none() {
            return Err(MerchantApiError::GameNotFound(sku.game_id));
        }
        let sku = skus::insert_sku(sku, &mut tx).await?;
        tx.commit().await?;
        Ok(sku)
    }

    async fn update_sku(&self, sku_id: &str, update: SkuUpdate) -> Result<Option<Sku>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(skus::update_sku(sku_id, update, &mut conn).await?)
    }

    async fn delete_sku(&self, sku_id: &str) -> Result<bool, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(skus::delete_sku(sku_id, &mut conn).await?)
    }

    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: &str,
        limit: i64,
    ) -> Result<Vec<OrderWithNames>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::orders_for_merchant(merchant_id, limit, &mut conn).await?)
    }

    async fn fetch_merchant_stats(
        &self,
        merchant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MerchantStats, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::merchant_stats(merchant_id, utc_day_start(now), &mut conn).await?)
    }

    async fn fetch_merchants_with_stats(&self) -> Result<Vec<MerchantWithStats>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(merchants::merchants_with_stats(&mut conn).await?)
    }

    async fn create_merchant(&self, merchant: NewMerchant, game_ids: &[String]) -> Result<Merchant, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        let merchant = merchants::insert_merchant(merchant, &mut tx).await?;
        for game_id in game_ids {
            if games::game_by_id(game_id, &mut tx).await?.is_none() {
                return Err(MerchantApiError::GameNotFound(game_id.clone()));
            }
            merchant_games::upsert_binding(&merchant.id, game_id, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Merchant {} created with {} initial bindings", merchant.id, game_ids.len());
        Ok(merchant)
    }

    async fn update_merchant(
        &self,
        merchant_id: &str,
        update: MerchantUpdate,
    ) -> Result<Option<Merchant>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(merchants::update_merchant(merchant_id, update, &mut conn).await?)
    }

    async fn replace_merchant_bindings(
        &self,
        merchant_id: &str,
        game_ids: &[String],
    ) -> Result<Vec<MerchantGameLink>, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        if merchants::merchant_by_id(merchant_id, &mut tx).await?.is_none() {
            return Err(MerchantApiError::MerchantNotFound(merchant_id.to_string()));
        }
        merchant_games::delete_bindings_for_merchant(merchant_id, &mut tx).await?;
        for game_id in game_ids {
            if games::game_by_id(game_id, &mut tx).await?.is_none() {
                return Err(MerchantApiError::GameNotFound(game_id.clone()));
            }
            merchant_games::upsert_binding(merchant_id, game_id, &mut tx).await?;
        }
        let links = merchant_games::links_for_merchant(merchant_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Merchant {merchant_id} bindings replaced with {} games", game_ids.len());
        Ok(links)
    }

    async fn create_application(
        &self,
        user_id: &str,
        application: NewMerchantApplication,
    ) -> Result<MerchantApplication, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        if users::merchant_for_user(user_id, &mut tx).await?.is_some() {
            return Err(MerchantApiError::AlreadyMerchant);
        }
        if applications::pending_exists_for_user(user_id, &mut tx).await? {
            return Err(MerchantApiError::DuplicateApplication);
        }
        let application = applications::insert_application(user_id, application, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Application {} filed by user {user_id}", application.id);
        Ok(application)
    }

    async fn newest_application_for_user(&self, user_id: &str) -> Result<Option<MerchantApplication>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(applications::newest_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<MerchantApplication>, MerchantApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(applications::fetch_applications(status, &mut conn).await?)
    }

    async fn approve_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<ApprovedApplication, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        let application = applications::application_by_id(application_id, &mut tx)
            .await?
            .ok_or_else(|| MerchantApiError::ApplicationNotFound(application_id.to_string()))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MerchantApiError::ApplicationNotPending);
        }
        let merchant = NewMerchant {
            name: application.company_name.clone(),
            email: Some(application.contact_email.clone()),
        };
        let merchant = merchants::insert_merchant(merchant, &mut tx).await?;
        users::link_user_to_merchant(&merchant.id, &application.user_id, &mut tx).await?;
        users::set_role(&application.user_id, Role::Merchant, &mut tx).await?;
        let application = applications::set_review(application_id, ApplicationStatus::Approved, review_note, &mut tx)
            .await?
            .ok_or_else(|| MerchantApiError::ApplicationNotFound(application_id.to_string()))?;
        tx.commit().await?;
        info!("🗃️ Application {application_id} approved. Merchant {} created", merchant.id);
        Ok(ApprovedApplication { application, merchant })
    }

    async fn reject_application(
        &self,
        application_id: &str,
        review_note: Option<String>,
    ) -> Result<MerchantApplication, MerchantApiError> {
        let mut tx = self.pool.begin().await?;
        let application = applications::application_by_id(application_id, &mut tx)
            .await?
            .ok_or_else(|| MerchantApiError::ApplicationNotFound(application_id.to_string()))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MerchantApiError::ApplicationNotPending);
        }
        let application = applications::set_review(application_id, ApplicationStatus::Rejected, review_note, &mut tx)
            .await?
            .ok_or_else(|| MerchantApiError::ApplicationNotFound(application_id.to_string()))?;
        tx.commit().await?;
        info!("🗃️ Application {application_id} rejected");
        Ok(application)
    }
}

impl UserManagement for SqliteDatabase {
    async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::upsert_user(identity, &mut conn).await?)
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::user_by_id(user_id, &mut conn).await?)
    }

    async fn merchant_id_for_user(&self, user_id: &str) -> Result<Option<String>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::merchant_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_users_with_counts(&self) -> Result<Vec<UserWithCounts>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::users_with_counts(&mut conn).await?)
    }

    async fn fetch_user_detail(&self, user_id: &str) -> Result<Option<UserDetail>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = users::user_by_id(user_id, &mut conn).await? else {
            return Ok(None);
        };
        let merchant_id = users::merchant_for_user(user_id, &mut conn).await?;
        let recent_orders = orders::orders_for_user(user_id, Some(10), &mut conn).await?;
        let applications = applications::applications_for_user(user_id, &mut conn).await?;
        Ok(Some(UserDetail { user, merchant_id, recent_orders, applications }))
    }

    async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::set_role(user_id, role, &mut conn).await?;
        if user.is_some() {
            info!("🗃️ User {user_id} role set to {role}");
        }
        Ok(user)
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = users::delete_user(user_id, &mut conn).await?;
        if deleted {
            info!("🗃️ User {user_id} deleted (orders, applications and links cascade)");
        }
        Ok(deleted)
    }
}
