use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{Game, Sku};

/// A game together with its SKUs, ordered by (sort_order, price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWithSkus {
    #[serde(flatten)]
    pub game: Game,
    pub skus: Vec<Sku>,
}

/// An active seller for a game: an active binding to an `ACTIVE` merchant. `bound_since` is the
/// binding creation time, which also orders default seller resolution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameSeller {
    pub merchant_id: String,
    pub name: String,
    pub bound_since: DateTime<Utc>,
}
