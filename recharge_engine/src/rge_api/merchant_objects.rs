use rgp_common::MinorUnits;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{Merchant, MerchantApplication};

/// A merchant row with the aggregates shown on the admin console list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub merchant: Merchant,
    /// Games this merchant owns directly.
    pub owned_games: i64,
    /// Games this merchant is actively bound to.
    pub bound_games: i64,
    pub total_orders: i64,
    /// Sum over `PAID` orders resolved to this merchant.
    pub paid_revenue: MinorUnits,
}

/// The outcome of approving a merchant application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedApplication {
    pub application: MerchantApplication,
    pub merchant: Merchant,
}
