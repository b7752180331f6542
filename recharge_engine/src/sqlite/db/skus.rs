//! Sqlite operations on the `skus` table.
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewSku, Sku, SkuUpdate},
    helpers::new_sku_id,
};

pub async fn sku_by_id(sku_id: &str, conn: &mut SqliteConnection) -> Result<Option<Sku>, sqlx::Error> {
    let sku = sqlx::query_as("SELECT * FROM skus WHERE id = $1").bind(sku_id).fetch_optional(conn).await?;
    Ok(sku)
}

pub async fn skus_for_game(game_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Sku>, sqlx::Error> {
    let skus = sqlx::query_as("SELECT * FROM skus WHERE game_id = $1 ORDER BY sort_order ASC, price ASC")
        .bind(game_id)
        .fetch_all(conn)
        .await?;
    Ok(skus)
}

/// All SKUs, grouped-ready: ordered by game, then (sort_order, price).
pub async fn all_skus(conn: &mut SqliteConnection) -> Result<Vec<Sku>, sqlx::Error> {
    let skus = sqlx::query_as("SELECT * FROM skus ORDER BY game_id ASC, sort_order ASC, price ASC")
        .fetch_all(conn)
        .await?;
    Ok(skus)
}

/// Inserts a SKU. When no sort order is given, the SKU goes to the end of the game's list. Run
/// inside a transaction so the max(sort_order) read and the insert are atomic.
pub async fn insert_sku(sku: NewSku, conn: &mut SqliteConnection) -> Result<Sku, sqlx::Error> {
    let sort_order = match sku.sort_order {
        Some(sort_order) => sort_order,
        None => next_sort_order(&sku.game_id, conn).await?,
    };
    let id = new_sku_id();
    let now = Utc::now();
    let sku = sqlx::query_as(
        r#"
            INSERT INTO skus (
                id, game_id, name_zh, name_ja, name_en, price, original_price,
                bonus, currency, limited, image_url, sort_order, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(sku.game_id)
    .bind(sku.name_zh)
    .bind(sku.name_ja)
    .bind(sku.name_en)
    .bind(sku.price)
    .bind(sku.original_price)
    .bind(sku.bonus)
    .bind(sku.currency)
    .bind(sku.limited.unwrap_or(false))
    .bind(sku.image_url)
    .bind(sort_order)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(sku)
}

async fn next_sort_order(game_id: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(sort_order), 0) FROM skus WHERE game_id = $1")
        .bind(game_id)
        .fetch_one(conn)
        .await?;
    Ok(max + 1)
}

pub async fn update_sku(
    sku_id: &str,
    update: SkuUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Sku>, sqlx::Error> {
    let sku = sqlx::query_as(
        r#"
            UPDATE skus SET
                name_zh = COALESCE($2, name_zh),
                name_ja = COALESCE($3, name_ja),
                name_en = COALESCE($4, name_en),
                price = COALESCE($5, price),
                original_price = COALESCE($6, original_price),
                bonus = COALESCE($7, bonus),
                currency = COALESCE($8, currency),
                limited = COALESCE($9, limited),
                image_url = COALESCE($10, image_url),
                sort_order = COALESCE($11, sort_order),
                updated_at = $12
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(sku_id)
    .bind(update.name_zh)
    .bind(update.name_ja)
    .bind(update.name_en)
    .bind(update.price)
    .bind(update.original_price)
    .bind(update.bonus)
    .bind(update.currency)
    .bind(update.limited)
    .bind(update.image_url)
    .bind(update.sort_order)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(sku)
}

pub async fn delete_sku(sku_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM skus WHERE id = $1").bind(sku_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
