//! Sqlite operations on the `orders` table.
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderStatus, Sku, User},
    helpers::new_order_id,
    rge_api::order_objects::{MerchantStats, OrderWithNames},
};

const WITH_NAMES: &str = r#"
    SELECT o.*, g.name_en AS game_name, s.name_en AS sku_name
    FROM orders o
    JOIN games g ON g.id = o.game_id
    JOIN skus s ON s.id = o.sku_id
"#;

/// Inserts a `PENDING` order for the user, snapshotting the SKU's price and currency. The
/// merchant must already have been resolved. Not atomic on its own; run inside the resolution
/// transaction.
pub async fn insert_order(
    user: &User,
    merchant_id: &str,
    sku: &Sku,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let id = new_order_id();
    let now = Utc::now();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id, user_id, merchant_id, game_id, sku_id, visitor_id,
                amount, currency, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(&user.id)
    .bind(merchant_id)
    .bind(&sku.game_id)
    .bind(&sku.id)
    .bind(&user.sub)
    .bind(sku.price)
    .bind(&sku.currency)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} created for user {} with merchant {merchant_id}", order.id, user.id);
    Ok(order)
}

pub async fn order_by_id(order_id: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn order_for_user(
    order_id: &str,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn order_with_names(order_id: &str, conn: &mut SqliteConnection) -> Result<Option<OrderWithNames>, sqlx::Error> {
    let sql = format!("{WITH_NAMES} WHERE o.id = $1");
    let order = sqlx::query_as(&sql).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn orders_for_user(
    user_id: &str,
    limit: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderWithNames>, sqlx::Error> {
    let sql = match limit {
        Some(_) => format!("{WITH_NAMES} WHERE o.user_id = $1 ORDER BY o.created_at DESC LIMIT $2"),
        None => format!("{WITH_NAMES} WHERE o.user_id = $1 ORDER BY o.created_at DESC"),
    };
    let mut query = sqlx::query_as(&sql).bind(user_id);
    if let Some(limit) = limit {
        query = query.bind(limit);
    }
    let orders = query.fetch_all(conn).await?;
    Ok(orders)
}

pub async fn orders_for_merchant(
    merchant_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderWithNames>, sqlx::Error> {
    let sql = format!("{WITH_NAMES} WHERE o.merchant_id = $1 ORDER BY o.created_at DESC LIMIT $2");
    let orders = sqlx::query_as(&sql).bind(merchant_id).bind(limit).fetch_all(conn).await?;
    Ok(orders)
}

/// Sets the status. Re-applying the current status is a no-op that still returns the row.
pub async fn set_status(
    order_id: &str,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(order_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn attach_provider(
    order_id: &str,
    provider: &str,
    provider_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET provider = $2, provider_payment_id = $3, updated_at = $4
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(provider)
    .bind(provider_payment_id)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Aggregates for the merchant dashboard. `day_start` is the start of the current UTC day; rows
/// created at or after it count towards the `today_*` figures.
pub async fn merchant_stats(
    merchant_id: &str,
    day_start: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<MerchantStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
            SELECT
                COUNT(*) AS total_orders,
                COALESCE(SUM(CASE WHEN status = $2 THEN 1 ELSE 0 END), 0) AS paid_orders,
                COALESCE(SUM(CASE WHEN status = $2 THEN amount ELSE 0 END), 0) AS revenue,
                COALESCE(SUM(CASE WHEN created_at >= $3 THEN 1 ELSE 0 END), 0) AS today_orders,
                COALESCE(SUM(CASE WHEN created_at >= $3 AND status = $2 THEN 1 ELSE 0 END), 0)
                    AS today_paid_orders,
                COALESCE(SUM(CASE WHEN created_at >= $3 AND status = $2 THEN amount ELSE 0 END), 0)
                    AS today_revenue
            FROM orders
            WHERE merchant_id = $1;
        "#,
    )
    .bind(merchant_id)
    .bind(OrderStatus::Paid)
    .bind(day_start)
    .fetch_one(conn)
    .await?;
    Ok(stats)
}
