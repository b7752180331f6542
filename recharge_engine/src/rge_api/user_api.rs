use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Role, User, UserIdentity},
    rge_api::user_objects::{UserDetail, UserProfile, UserWithCounts},
    traits::{UserApiError, UserManagement},
};

pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Mirrors the identity into the user table and returns the stored row. Every authenticated
    /// request goes through here, so the profile fields track the identity provider.
    pub async fn sync_user(&self, identity: &UserIdentity) -> Result<User, UserApiError> {
        let user = self.db.upsert_user(identity).await?;
        trace!("👤️ Synced user {} ({})", user.id, user.sub);
        Ok(user)
    }

    /// The caller's own profile: the synced user row plus the linked merchant, if any.
    pub async fn profile(&self, identity: &UserIdentity) -> Result<UserProfile, UserApiError> {
        let user = self.db.upsert_user(identity).await?;
        let merchant_id = self.db.merchant_id_for_user(&user.id).await?;
        Ok(UserProfile { user, merchant_id })
    }

    pub async fn user(&self, user_id: &str) -> Result<Option<User>, UserApiError> {
        self.db.fetch_user(user_id).await
    }

    pub async fn merchant_id_for_user(&self, user_id: &str) -> Result<Option<String>, UserApiError> {
        self.db.merchant_id_for_user(user_id).await
    }

    //---------------------------------------- Admin console ----------------------------------------

    pub async fn users_with_counts(&self) -> Result<Vec<UserWithCounts>, UserApiError> {
        self.db.fetch_users_with_counts().await
    }

    pub async fn user_detail(&self, user_id: &str) -> Result<Option<UserDetail>, UserApiError> {
        self.db.fetch_user_detail(user_id).await
    }

    pub async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Option<User>, UserApiError> {
        let updated = self.db.set_user_role(user_id, role).await?;
        if let Some(user) = &updated {
            info!("👤️ User {} is now a {role}", user.id);
        }
        Ok(updated)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<bool, UserApiError> {
        let deleted = self.db.delete_user(user_id).await?;
        if deleted {
            info!("👤️ User {user_id} and their history have been deleted");
        }
        Ok(deleted)
    }
}
