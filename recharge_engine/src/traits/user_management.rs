use thiserror::Error;

use crate::{
    db_types::{Role, User, UserIdentity},
    rge_api::user_objects::{UserDetail, UserWithCounts},
};

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(String),
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}

/// User records and the admin user console.
///
/// Users are mirrored from the identity provider: `upsert_user` inserts a row the first time a
/// subject is seen and refreshes the profile fields afterwards. The stored role is only written
/// on insert (and by explicit admin action or application approval), so a stale token cannot
/// demote a promoted user.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Inserts the user on first sight, otherwise refreshes `email` and `name`. Returns the
    /// stored row.
    async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, UserApiError>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, UserApiError>;

    /// The merchant the user is linked to, if any. With multiple links, the earliest wins.
    async fn merchant_id_for_user(&self, user_id: &str) -> Result<Option<String>, UserApiError>;

    /// All users with their order and application counts, newest first.
    async fn fetch_users_with_counts(&self) -> Result<Vec<UserWithCounts>, UserApiError>;

    /// One user with recent orders, application history and the linked merchant.
    async fn fetch_user_detail(&self, user_id: &str) -> Result<Option<UserDetail>, UserApiError>;

    async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Option<User>, UserApiError>;

    /// Deletes the user, cascading orders, applications and merchant links. Returns false if the
    /// user did not exist.
    async fn delete_user(&self, user_id: &str) -> Result<bool, UserApiError>;
}
