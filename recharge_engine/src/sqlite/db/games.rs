//! Sqlite operations on the `games` table.
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Game, GameUpdate, NewGame},
    helpers::new_game_id,
};

pub async fn insert_game(game: NewGame, conn: &mut SqliteConnection) -> Result<Game, sqlx::Error> {
    let id = new_game_id();
    let now = Utc::now();
    let game = sqlx::query_as(
        r#"
            INSERT INTO games (
                id, merchant_id, name_zh, name_ja, name_en, developer,
                icon_url, banner_url, badge, rating, downloads, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(game.merchant_id)
    .bind(game.name_zh)
    .bind(game.name_ja)
    .bind(game.name_en)
    .bind(game.developer)
    .bind(game.icon_url)
    .bind(game.banner_url)
    .bind(game.badge)
    .bind(game.rating.unwrap_or(0.0))
    .bind(game.downloads)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(game)
}

pub async fn game_by_id(game_id: &str, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as("SELECT * FROM games WHERE id = $1").bind(game_id).fetch_optional(conn).await?;
    Ok(game)
}

pub async fn all_games(conn: &mut SqliteConnection) -> Result<Vec<Game>, sqlx::Error> {
    let games = sqlx::query_as("SELECT * FROM games ORDER BY created_at ASC").fetch_all(conn).await?;
    Ok(games)
}

/// Games the merchant owns, or holds an active binding to.
pub async fn games_for_merchant(merchant_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Game>, sqlx::Error> {
    let games = sqlx::query_as(
        r#"
            SELECT * FROM games g
            WHERE g.merchant_id = $1
               OR EXISTS (
                    SELECT 1 FROM merchant_games mg
                    WHERE mg.game_id = g.id AND mg.merchant_id = $1 AND mg.is_active = 1
               )
            ORDER BY g.created_at ASC;
        "#,
    )
    .bind(merchant_id)
    .fetch_all(conn)
    .await?;
    Ok(games)
}

/// True when the merchant owns the game or is actively bound to it.
pub async fn has_game_access(
    merchant_id: &str,
    game_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let access: bool = sqlx::query_scalar(
        r#"
            SELECT EXISTS (
                SELECT 1 FROM games g WHERE g.id = $2 AND g.merchant_id = $1
                UNION
                SELECT 1 FROM merchant_games mg
                WHERE mg.game_id = $2 AND mg.merchant_id = $1 AND mg.is_active = 1
            );
        "#,
    )
    .bind(merchant_id)
    .bind(game_id)
    .fetch_one(conn)
    .await?;
    Ok(access)
}

pub async fn update_game(
    game_id: &str,
    update: GameUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as(
        r#"
            UPDATE games SET
                merchant_id = COALESCE($2, merchant_id),
                name_zh = COALESCE($3, name_zh),
                name_ja = COALESCE($4, name_ja),
                name_en = COALESCE($5, name_en),
                developer = COALESCE($6, developer),
                icon_url = COALESCE($7, icon_url),
                banner_url = COALESCE($8, banner_url),
                badge = COALESCE($9, badge),
                rating = COALESCE($10, rating),
                downloads = COALESCE($11, downloads),
                updated_at = $12
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(game_id)
    .bind(update.merchant_id)
    .bind(update.name_zh)
    .bind(update.name_ja)
    .bind(update.name_en)
    .bind(update.developer)
    .bind(update.icon_url)
    .bind(update.banner_url)
    .bind(update.badge)
    .bind(update.rating)
    .bind(update.downloads)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(game)
}

/// Deletes the game. SKUs, bindings and orders cascade via foreign keys.
pub async fn delete_game(game_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM games WHERE id = $1").bind(game_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
