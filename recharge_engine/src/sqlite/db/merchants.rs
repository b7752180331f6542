//! Sqlite operations on the `merchants` table.
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Merchant, MerchantUpdate, NewMerchant, OrderStatus},
    helpers::new_merchant_id,
    rge_api::merchant_objects::MerchantWithStats,
};

pub async fn insert_merchant(merchant: NewMerchant, conn: &mut SqliteConnection) -> Result<Merchant, sqlx::Error> {
    let id = new_merchant_id();
    let now = Utc::now();
    let merchant = sqlx::query_as(
        r#"
            INSERT INTO merchants (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(merchant.name)
    .bind(merchant.email)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(merchant)
}

pub async fn merchant_by_id(merchant_id: &str, conn: &mut SqliteConnection) -> Result<Option<Merchant>, sqlx::Error> {
    let merchant =
        sqlx::query_as("SELECT * FROM merchants WHERE id = $1").bind(merchant_id).fetch_optional(conn).await?;
    Ok(merchant)
}

/// Applies the non-`None` fields of the update. Returns `None` if the merchant does not exist.
pub async fn update_merchant(
    merchant_id: &str,
    update: MerchantUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, sqlx::Error> {
    let merchant = sqlx::query_as(
        r#"
            UPDATE merchants SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                status = COALESCE($4, status),
                updated_at = $5
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(merchant_id)
    .bind(update.name)
    .bind(update.email)
    .bind(update.status)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(merchant)
}

/// All merchants with the admin-console aggregates, newest first.
pub async fn merchants_with_stats(conn: &mut SqliteConnection) -> Result<Vec<MerchantWithStats>, sqlx::Error> {
    let merchants = sqlx::query_as(
        r#"
            SELECT m.*,
                (SELECT COUNT(*) FROM games g WHERE g.merchant_id = m.id) AS owned_games,
                (SELECT COUNT(*) FROM merchant_games mg
                    WHERE mg.merchant_id = m.id AND mg.is_active = 1) AS bound_games,
                (SELECT COUNT(*) FROM orders o WHERE o.merchant_id = m.id) AS total_orders,
                (SELECT COALESCE(SUM(o.amount), 0) FROM orders o
                    WHERE o.merchant_id = m.id AND o.status = $1) AS paid_revenue
            FROM merchants m
            ORDER BY m.created_at DESC;
        "#,
    )
    .bind(OrderStatus::Paid)
    .fetch_all(conn)
    .await?;
    Ok(merchants)
}
