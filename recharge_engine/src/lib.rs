//! Recharge Engine
//!
//! The recharge engine is the storage and domain layer of a multi-merchant game top-up store.
//! Players buy in-game currency packs; merchants run the catalogue and fulfil the orders. This
//! library contains the core logic and is payment-provider agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`] and the contracts in [`mod@traits`]).
//!    Sqlite is the supported backend. You should never need to access the database directly;
//!    use the public API instead. The exception is the data types stored in the database, which
//!    are defined in [`mod@db_types`] and are public.
//! 2. The engine public API ([`mod@rge_api`]). This provides the public-facing functionality:
//!    the storefront catalogue, order placement with seller resolution, payment outcomes, the
//!    merchant and admin consoles, and user records. A backend acts as a store for the server by
//!    implementing the traits this module requires.
pub mod db_types;
pub mod helpers;
mod rge_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use rge_api::{
    catalog_api::CatalogApi,
    catalog_objects,
    errors::OrderFlowError,
    merchant_api::{MerchantApi, MERCHANT_ORDER_CAP},
    merchant_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    user_api::UserApi,
    user_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    CatalogApiError,
    CatalogManagement,
    MerchantApiError,
    MerchantManagement,
    OrderApiError,
    OrderManagement,
    UserApiError,
    UserManagement,
};
