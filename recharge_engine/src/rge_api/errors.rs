use thiserror::Error;

use crate::traits::OrderApiError;

/// Errors surfaced by the order flow on top of the raw storage errors. The extra variants carry
/// the ownership and status checks the payment endpoints run before talking to a provider.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error(transparent)]
    OrderError(#[from] OrderApiError),
    #[error("Order does not belong to this user")]
    NotOrderOwner,
    #[error("Order is not pending")]
    OrderNotPending,
}
