use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db_types::{MerchantApplication, User},
    rge_api::order_objects::OrderWithNames,
};

/// The caller's own profile: the stored user row plus the linked merchant, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub merchant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    pub total_orders: i64,
    pub total_applications: i64,
}

/// The admin view of a single user: the row itself, a handful of recent orders, the application
/// history and the linked merchant, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    pub user: User,
    pub merchant_id: Option<String>,
    pub recent_orders: Vec<OrderWithNames>,
    pub applications: Vec<MerchantApplication>,
}
