//! Sqlite operations on the `users` and `merchant_users` tables.
use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{MerchantUserLink, Role, User, UserIdentity},
    helpers::new_user_id,
    rge_api::user_objects::UserWithCounts,
};

/// Inserts the user on first sight, otherwise refreshes the profile fields. The stored role is
/// deliberately not updated on conflict; promotions survive stale tokens.
pub async fn upsert_user(identity: &UserIdentity, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let id = new_user_id();
    let now = Utc::now();
    let user: User = sqlx::query_as(
        r#"
            INSERT INTO users (id, sub, email, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (sub) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                updated_at = excluded.updated_at
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(&identity.sub)
    .bind(&identity.email)
    .bind(&identity.name)
    .bind(identity.role)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ User {} synced from identity {}", user.id, identity.sub);
    Ok(user)
}

pub async fn user_by_id(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

/// The merchant the user is linked to, earliest link first.
pub async fn merchant_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<String>, sqlx::Error> {
    let merchant_id = sqlx::query_scalar(
        "SELECT merchant_id FROM merchant_users WHERE user_id = $1 ORDER BY created_at ASC, id ASC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(merchant_id)
}

pub async fn link_user_to_merchant(
    merchant_id: &str,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<MerchantUserLink, sqlx::Error> {
    let link = sqlx::query_as(
        r#"
            INSERT INTO merchant_users (merchant_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (merchant_id, user_id) DO UPDATE SET user_id = excluded.user_id
            RETURNING *;
        "#,
    )
    .bind(merchant_id)
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(link)
}

pub async fn users_with_counts(conn: &mut SqliteConnection) -> Result<Vec<UserWithCounts>, sqlx::Error> {
    let users = sqlx::query_as(
        r#"
            SELECT u.*,
                (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) AS total_orders,
                (SELECT COUNT(*) FROM merchant_applications a WHERE a.user_id = u.id)
                    AS total_applications
            FROM users u
            ORDER BY u.created_at DESC;
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(users)
}

pub async fn set_role(user_id: &str, role: Role, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

/// Deletes the user. Orders, applications and merchant links cascade via foreign keys.
pub async fn delete_user(user_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
