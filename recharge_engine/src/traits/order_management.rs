use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderStatus, User},
    helpers::ResolutionError,
    rge_api::order_objects::OrderWithNames,
};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("SKU {0} does not exist")]
    SkuNotFound(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("{0}")]
    Unresolvable(#[from] ResolutionError),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

/// Order creation and status flow.
///
/// `process_new_order` is the only write path that creates order rows. It runs the seller
/// resolution policy and the insert inside a single transaction, so a failed resolution never
/// leaves a partial order behind.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Takes a purchase request and, in a single atomic transaction:
    /// * resolves the SKU (failing with [`OrderApiError::SkuNotFound`] if it does not exist),
    /// * resolves the merchant of record via [`crate::helpers::resolve_seller`],
    /// * snapshots the SKU's price and currency onto a new `PENDING` order for `user`, recording
    ///   the user's identity subject as the order's `visitor_id`.
    ///
    /// On any failure no order row is written.
    async fn process_new_order(&self, user: &User, order: NewOrder) -> Result<OrderWithNames, OrderApiError>;

    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, OrderApiError>;

    /// Fetches an order only if it belongs to the given user. Used by the payment routes, which
    /// must not disclose whether a foreign order id exists.
    async fn fetch_order_for_user(&self, order_id: &str, user_id: &str) -> Result<Option<Order>, OrderApiError>;

    /// The order with game and SKU names attached, as returned to clients after a status change.
    async fn fetch_order_with_names(&self, order_id: &str) -> Result<Option<OrderWithNames>, OrderApiError>;

    /// The user's orders, newest first, with game and SKU names attached.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<OrderWithNames>, OrderApiError>;

    /// Sets the order status. Idempotent: re-applying the same status is a no-op that still
    /// returns the order. Returns `None` if the order does not exist.
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderApiError>;

    /// Records which payment provider is handling the order, and the provider-side payment id.
    async fn attach_payment_provider(
        &self,
        order_id: &str,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, OrderApiError>;
}
