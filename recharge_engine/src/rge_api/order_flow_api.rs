//! The primary API for placing orders and driving their status through payment outcomes.
use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::{NewOrder, Order, OrderStatus, User},
    rge_api::{errors::OrderFlowError, order_objects::OrderWithNames},
    traits::{OrderApiError, OrderManagement},
};

pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Resolves the seller and creates a `PENDING` order for the user, all in one transaction.
    pub async fn place_order(&self, user: &User, order: NewOrder) -> Result<OrderWithNames, OrderApiError> {
        self.db.process_new_order(user, order).await
    }

    /// The user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderWithNames>, OrderApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// Fetches the order for a payment call. The order must belong to the user (missing and
    /// foreign ids are indistinguishable) and must still be `PENDING`.
    pub async fn pending_order_for_user(&self, order_id: &str, user_id: &str) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_for_user(order_id, user_id)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.to_string()))?;
        if order.status != OrderStatus::Pending {
            return Err(OrderFlowError::OrderNotPending);
        }
        Ok(order)
    }

    /// Fetches the order for a capture confirmation. Ownership is required but any status is
    /// accepted, so a capture can be retried after a failed attempt.
    pub async fn order_for_user(&self, order_id: &str, user_id: &str) -> Result<Order, OrderFlowError> {
        self.db
            .fetch_order_for_user(order_id, user_id)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.to_string()).into())
    }

    /// Records the provider handling the order, and the provider-side payment id.
    pub async fn attach_payment_provider(
        &self,
        order_id: &str,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, OrderApiError> {
        self.db.attach_payment_provider(order_id, provider, provider_payment_id).await
    }

    /// Applies a payment outcome delivered by a provider (webhook or capture). Returns `None`
    /// when the order id is unknown; the caller decides whether that is worth more than a log
    /// line. Idempotent.
    pub async fn apply_payment_outcome(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Option<OrderWithNames>, OrderApiError> {
        if self.db.update_order_status(order_id, status).await?.is_none() {
            return Ok(None);
        }
        self.db.fetch_order_with_names(order_id).await
    }

    /// The demo-mode shortcut: marks the caller's own `PENDING` order `PAID` without a provider.
    pub async fn demo_pay(&self, user_id: &str, order_id: &str) -> Result<OrderWithNames, OrderFlowError> {
        let order = self
            .db
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.to_string()))?;
        if order.user_id != user_id {
            return Err(OrderFlowError::NotOrderOwner);
        }
        if order.status != OrderStatus::Pending {
            return Err(OrderFlowError::OrderNotPending);
        }
        debug!("💳️ Demo payment for order {order_id}");
        self.apply_payment_outcome(order_id, OrderStatus::Paid)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.to_string()).into())
    }
}
