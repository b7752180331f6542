use thiserror::Error;

use crate::rge_api::catalog_objects::{GameSeller, GameWithSkus};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Read-only access to the public storefront catalog. Everything here is served without
/// authentication, so nothing in this trait may leak merchant or user internals.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches all games, each with its SKUs ordered by (sort_order, price).
    async fn fetch_games(&self) -> Result<Vec<GameWithSkus>, CatalogApiError>;

    /// Fetches a single game with its SKUs. Returns `None` if the game does not exist.
    async fn fetch_game(&self, game_id: &str) -> Result<Option<GameWithSkus>, CatalogApiError>;

    /// Fetches the game's active sellers (active bindings to `ACTIVE` merchants), oldest binding
    /// first. Returns `None` if the game does not exist.
    async fn fetch_game_sellers(&self, game_id: &str) -> Result<Option<Vec<GameSeller>>, CatalogApiError>;
}
