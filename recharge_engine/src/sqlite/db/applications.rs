//! Sqlite operations on the `merchant_applications` table.
use chrono::Utc;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{ApplicationStatus, MerchantApplication, NewMerchantApplication},
    helpers::new_application_id,
};

pub async fn insert_application(
    user_id: &str,
    application: NewMerchantApplication,
    conn: &mut SqliteConnection,
) -> Result<MerchantApplication, sqlx::Error> {
    let id = new_application_id();
    let now = Utc::now();
    let application = sqlx::query_as(
        r#"
            INSERT INTO merchant_applications (
                id, user_id, company_name, contact_name, contact_email,
                description, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(application.company_name)
    .bind(application.contact_name)
    .bind(application.contact_email)
    .bind(application.description)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(application)
}

pub async fn application_by_id(
    application_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<MerchantApplication>, sqlx::Error> {
    let application = sqlx::query_as("SELECT * FROM merchant_applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(conn)
        .await?;
    Ok(application)
}

pub async fn newest_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<MerchantApplication>, sqlx::Error> {
    let application = sqlx::query_as(
        "SELECT * FROM merchant_applications WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(application)
}

pub async fn applications_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<MerchantApplication>, sqlx::Error> {
    let applications =
        sqlx::query_as("SELECT * FROM merchant_applications WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(applications)
}

pub async fn pending_exists_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM merchant_applications WHERE user_id = $1 AND status = $2)",
    )
    .bind(user_id)
    .bind(ApplicationStatus::Pending)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// All applications, newest first, optionally filtered by status.
pub async fn fetch_applications(
    status: Option<ApplicationStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MerchantApplication>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM merchant_applications ");
    if let Some(status) = status {
        builder.push("WHERE status = ").push_bind(status);
    }
    builder.push(" ORDER BY created_at DESC, rowid DESC");
    let applications = builder.build_query_as().fetch_all(conn).await?;
    Ok(applications)
}

pub async fn set_review(
    application_id: &str,
    status: ApplicationStatus,
    review_note: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Option<MerchantApplication>, sqlx::Error> {
    let application = sqlx::query_as(
        r#"
            UPDATE merchant_applications SET status = $2, review_note = $3, updated_at = $4
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(application_id)
    .bind(status)
    .bind(review_note)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(application)
}
