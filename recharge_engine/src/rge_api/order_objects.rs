use rgp_common::MinorUnits;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::Order;

/// An order row joined with the (English) names of its game and SKU, as rendered in order lists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub game_name: String,
    pub sku_name: String,
}

/// Dashboard aggregates for a single merchant. Revenue sums the `amount` of `PAID` orders. The
/// `today_*` fields cover the current UTC day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
pub struct MerchantStats {
    pub total_orders: i64,
    pub paid_orders: i64,
    pub revenue: MinorUnits,
    pub today_orders: i64,
    pub today_paid_orders: i64,
    pub today_revenue: MinorUnits,
}
