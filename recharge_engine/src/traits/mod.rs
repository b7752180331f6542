//! # Storage backend contracts
//!
//! This module defines the interface contracts a database backend must implement to power the
//! recharge server. The split mirrors the route surface:
//!
//! * [`CatalogManagement`] serves the public storefront reads.
//! * [`OrderManagement`] owns order creation (including seller resolution) and the status flow
//!   driven by payment providers.
//! * [`MerchantManagement`] covers the merchant console, the admin console and the application
//!   workflow.
//! * [`UserManagement`] mirrors identities into user rows and serves the admin user console.
//!
//! Each trait carries its own error enum so that callers can map storage failures onto HTTP
//! responses without inspecting strings.
mod catalog_management;
mod merchant_management;
mod order_management;
mod user_management;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use merchant_management::{MerchantApiError, MerchantManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use user_management::{UserApiError, UserManagement};
