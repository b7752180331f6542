//! # Order to merchant resolution
//!
//! Every order carries exactly one merchant of record, fixed at creation time. The merchant is
//! either requested explicitly by the purchaser (a storefront "buy from this seller" action) or
//! resolved automatically from the game's seller bindings.
//!
//! The rules:
//! * An explicitly requested merchant must hold an active binding to the SKU's game and must
//!   itself be `ACTIVE`. Anything else is a hard failure; there is no silent fallback onto a
//!   different seller than the one the purchaser picked.
//! * Without an explicit request, the oldest active binding whose merchant is `ACTIVE` wins.
//!   Suspended merchants are skipped, not terminal. If no binding qualifies, the game's owning
//!   merchant is used, provided it is `ACTIVE`.
//!
//! The decision is pure: callers fetch the candidate set and the owner first, then apply this
//! function inside the same transaction that writes the order row.
use thiserror::Error;

use crate::db_types::MerchantStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Merchant is not bound to this game")]
    MerchantNotBound,
    #[error("Merchant is suspended")]
    MerchantSuspended,
    #[error("No active merchant available for this game")]
    NoActiveMerchant,
}

/// A merchant that could be resolved onto an order, with the status it had when fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerCandidate {
    pub merchant_id: String,
    pub status: MerchantStatus,
}

impl SellerCandidate {
    pub fn new<S: Into<String>>(merchant_id: S, status: MerchantStatus) -> Self {
        Self { merchant_id: merchant_id.into(), status }
    }

    fn is_active(&self) -> bool {
        self.status == MerchantStatus::Active
    }
}

/// Picks the merchant of record for a new order.
///
/// `bindings` must hold the game's *active* bindings only, ordered by binding creation time,
/// oldest first. `owner` is the game's owning merchant. Returns the resolved merchant id.
pub fn resolve_seller(
    requested: Option<&str>,
    bindings: &[SellerCandidate],
    owner: &SellerCandidate,
) -> Result<String, ResolutionError> {
    if let Some(merchant_id) = requested {
        let candidate =
            bindings.iter().find(|c| c.merchant_id == merchant_id).ok_or(ResolutionError::MerchantNotBound)?;
        if !candidate.is_active() {
            return Err(ResolutionError::MerchantSuspended);
        }
        return Ok(candidate.merchant_id.clone());
    }
    if let Some(candidate) = bindings.iter().find(|c| c.is_active()) {
        return Ok(candidate.merchant_id.clone());
    }
    if owner.is_active() {
        return Ok(owner.merchant_id.clone());
    }
    Err(ResolutionError::NoActiveMerchant)
}
