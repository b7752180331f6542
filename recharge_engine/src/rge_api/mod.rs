//! # Recharge engine public API
//!
//! The `rge_api` module exposes the programmatic API for the recharge engine. The API is modular,
//! so clients can pick and choose the functionality they need, or run different parts against
//! different backends.
//!
//! * [`catalog_api`] serves the public storefront: game listings, game detail and seller rosters.
//! * [`order_flow_api`] is the primary API for placing orders and applying payment outcomes from
//!   provider webhooks (or the demo checkout).
//! * [`merchant_api`] drives the merchant console, the admin console and the merchant application
//!   workflow.
//! * [`user_api`] mirrors identities into user records and backs the admin user console.
//!
//! # API usage
//!
//! The pattern is the same for every API. An instance is created by supplying a database backend
//! that implements the backend traits the API requires.
//!
//! ```rust,ignore
//! use recharge_engine::{CatalogApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CatalogManagement
//! let api = CatalogApi::new(db);
//! let games = api.games().await?;
//! ```

pub mod catalog_api;
pub mod catalog_objects;
pub mod errors;
pub mod merchant_api;
pub mod merchant_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod user_api;
pub mod user_objects;
