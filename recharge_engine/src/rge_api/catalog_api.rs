//! Public storefront reads.
use std::fmt::Debug;

use crate::{
    rge_api::catalog_objects::{GameSeller, GameWithSkus},
    traits::{CatalogApiError, CatalogManagement},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn games(&self) -> Result<Vec<GameWithSkus>, CatalogApiError> {
        self.db.fetch_games().await
    }

    pub async fn game(&self, game_id: &str) -> Result<Option<GameWithSkus>, CatalogApiError> {
        self.db.fetch_game(game_id).await
    }

    pub async fn game_sellers(&self, game_id: &str) -> Result<Option<Vec<GameSeller>>, CatalogApiError> {
        self.db.fetch_game_sellers(game_id).await
    }
}
