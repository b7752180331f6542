//! Sqlite operations on the `merchant_games` binding table.
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{MerchantGameLink, MerchantStatus},
    helpers::SellerCandidate,
    rge_api::catalog_objects::GameSeller,
};

/// The game's active bindings paired with each merchant's current status, ordered by binding
/// creation time, oldest first. This is the candidate list for seller resolution.
pub async fn seller_candidates(game_id: &str, conn: &mut SqliteConnection) -> Result<Vec<SellerCandidate>, sqlx::Error> {
    let rows: Vec<(String, MerchantStatus)> = sqlx::query_as(
        r#"
            SELECT mg.merchant_id, m.status
            FROM merchant_games mg
            JOIN merchants m ON m.id = mg.merchant_id
            WHERE mg.game_id = $1 AND mg.is_active = 1
            ORDER BY mg.created_at ASC, mg.id ASC;
        "#,
    )
    .bind(game_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(merchant_id, status)| SellerCandidate::new(merchant_id, status)).collect())
}

/// The public seller list for a game: active bindings to `ACTIVE` merchants, oldest first.
pub async fn sellers_for_game(game_id: &str, conn: &mut SqliteConnection) -> Result<Vec<GameSeller>, sqlx::Error> {
    let sellers = sqlx::query_as(
        r#"
            SELECT mg.merchant_id, m.name, mg.created_at AS bound_since
            FROM merchant_games mg
            JOIN merchants m ON m.id = mg.merchant_id
            WHERE mg.game_id = $1 AND mg.is_active = 1 AND m.status = $2
            ORDER BY mg.created_at ASC, mg.id ASC;
        "#,
    )
    .bind(game_id)
    .bind(MerchantStatus::Active)
    .fetch_all(conn)
    .await?;
    Ok(sellers)
}

/// Creates the binding, or re-activates it if it already exists.
pub async fn upsert_binding(
    merchant_id: &str,
    game_id: &str,
    conn: &mut SqliteConnection,
) -> Result<MerchantGameLink, sqlx::Error> {
    let link = sqlx::query_as(
        r#"
            INSERT INTO merchant_games (merchant_id, game_id, is_active, created_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (merchant_id, game_id) DO UPDATE SET is_active = 1
            RETURNING *;
        "#,
    )
    .bind(merchant_id)
    .bind(game_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(link)
}

/// Marks the binding inactive. Returns false when no binding row exists at all.
pub async fn deactivate_binding(
    merchant_id: &str,
    game_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE merchant_games SET is_active = 0 WHERE merchant_id = $1 AND game_id = $2")
        .bind(merchant_id)
        .bind(game_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_bindings_for_merchant(merchant_id: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM merchant_games WHERE merchant_id = $1").bind(merchant_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn links_for_merchant(
    merchant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<MerchantGameLink>, sqlx::Error> {
    let links = sqlx::query_as(
        "SELECT * FROM merchant_games WHERE merchant_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(merchant_id)
    .fetch_all(conn)
    .await?;
    Ok(links)
}
