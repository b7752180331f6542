use chrono::{DateTime, Utc};
use mockall::mock;
use recharge_engine::{
    catalog_objects::{GameSeller, GameWithSkus},
    db_types::{
        ApplicationStatus,
        Game,
        GameUpdate,
        Merchant,
        MerchantApplication,
        MerchantGameLink,
        MerchantUpdate,
        NewGame,
        NewMerchant,
        NewMerchantApplication,
        NewOrder,
        NewSku,
        Order,
        OrderStatus,
        Role,
        Sku,
        SkuUpdate,
        User,
        UserIdentity,
    },
    merchant_objects::{ApprovedApplication, MerchantWithStats},
    order_objects::{MerchantStats, OrderWithNames},
    traits::{
        CatalogApiError,
        CatalogManagement,
        MerchantApiError,
        MerchantManagement,
        OrderApiError,
        OrderManagement,
        UserApiError,
        UserManagement,
    },
    user_objects::{UserDetail, UserWithCounts},
};

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_games(&self) -> Result<Vec<GameWithSkus>, CatalogApiError>;
        async fn fetch_game(&self, game_id: &str) -> Result<Option<GameWithSkus>, CatalogApiError>;
        async fn fetch_game_sellers(&self, game_id: &str) -> Result<Option<Vec<GameSeller>>, CatalogApiError>;
    }
}

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn process_new_order(&self, user: &User, order: NewOrder) -> Result<OrderWithNames, OrderApiError>;
        async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_order_for_user(&self, order_id: &str, user_id: &str) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_order_with_names(&self, order_id: &str) -> Result<Option<OrderWithNames>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<OrderWithNames>, OrderApiError>;
        async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Option<Order>, OrderApiError>;
        async fn attach_payment_provider(&self, order_id: &str, provider: &str, provider_payment_id: &str) -> Result<Option<Order>, OrderApiError>;
    }
}

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, UserApiError>;
        async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, UserApiError>;
        async fn merchant_id_for_user(&self, user_id: &str) -> Result<Option<String>, UserApiError>;
        async fn fetch_users_with_counts(&self) -> Result<Vec<UserWithCounts>, UserApiError>;
        async fn fetch_user_detail(&self, user_id: &str) -> Result<Option<UserDetail>, UserApiError>;
        async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Option<User>, UserApiError>;
        async fn delete_user(&self, user_id: &str) -> Result<bool, UserApiError>;
    }
}

// The console routes take a single backend that covers both the merchant tables and the user
// tables, mirroring what SqliteDatabase provides in production.
mock! {
    pub ConsoleManager {}
    impl MerchantManagement for ConsoleManager {
        async fn fetch_merchant(&self, merchant_id: &str) -> Result<Option<Merchant>, MerchantApiError>;
        async fn fetch_game_record(&self, game_id: &str) -> Result<Option<Game>, MerchantApiError>;
        async fn fetch_games_for_merchant(&self, merchant_id: &str) -> Result<Vec<GameWithSkus>, MerchantApiError>;
        async fn merchant_has_game_access(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError>;
        async fn create_game_with_binding(&self, game: NewGame) -> Result<Game, MerchantApiError>;
        async fn create_game(&self, game: NewGame) -> Result<Game, MerchantApiError>;
        async fn update_game(&self, game_id: &str, update: GameUpdate) -> Result<Option<Game>, MerchantApiError>;
        async fn delete_game(&self, game_id: &str) -> Result<bool, MerchantApiError>;
        async fn deactivate_binding(&self, merchant_id: &str, game_id: &str) -> Result<bool, MerchantApiError>;
        async fn fetch_sku(&self, sku_id: &str) -> Result<Option<Sku>, MerchantApiError>;
        async fn fetch_skus_for_game(&self, game_id: &str) -> Result<Vec<Sku>, MerchantApiError>;
        async fn create_sku(&self, sku: NewSku) -> Result<Sku, MerchantApiError>;
        async fn update_sku(&self, sku_id: &str, update: SkuUpdate) -> Result<Option<Sku>, MerchantApiError>;
        async fn delete_sku(&self, sku_id: &str) -> Result<bool, MerchantApiError>;
        async fn fetch_orders_for_merchant(&self, merchant_id: &str, limit: i64) -> Result<Vec<OrderWithNames>, MerchantApiError>;
        async fn fetch_merchant_stats(&self, merchant_id: &str, now: DateTime<Utc>) -> Result<MerchantStats, MerchantApiError>;
        async fn fetch_merchants_with_stats(&self) -> Result<Vec<MerchantWithStats>, MerchantApiError>;
        async fn create_merchant(&self, merchant: NewMerchant, game_ids: &[String]) -> Result<Merchant, MerchantApiError>;
        async fn update_merchant(&self, merchant_id: &str, update: MerchantUpdate) -> Result<Option<Merchant>, MerchantApiError>;
        async fn replace_merchant_bindings(&self, merchant_id: &str, game_ids: &[String]) -> Result<Vec<MerchantGameLink>, MerchantApiError>;
        async fn create_application(&self, user_id: &str, application: NewMerchantApplication) -> Result<MerchantApplication, MerchantApiError>;
        async fn newest_application_for_user(&self, user_id: &str) -> Result<Option<MerchantApplication>, MerchantApiError>;
        async fn fetch_applications(&self, status: Option<ApplicationStatus>) -> Result<Vec<MerchantApplication>, MerchantApiError>;
        async fn approve_application(&self, application_id: &str, review_note: Option<String>) -> Result<ApprovedApplication, MerchantApiError>;
        async fn reject_application(&self, application_id: &str, review_note: Option<String>) -> Result<MerchantApplication, MerchantApiError>;
    }
    impl UserManagement for ConsoleManager {
        async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, UserApiError>;
        async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, UserApiError>;
        async fn merchant_id_for_user(&self, user_id: &str) -> Result<Option<String>, UserApiError>;
        async fn fetch_users_with_counts(&self) -> Result<Vec<UserWithCounts>, UserApiError>;
        async fn fetch_user_detail(&self, user_id: &str) -> Result<Option<UserDetail>, UserApiError>;
        async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Option<User>, UserApiError>;
        async fn delete_user(&self, user_id: &str) -> Result<bool, UserApiError>;
    }
}
