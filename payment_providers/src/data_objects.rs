use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The slice of a Stripe PaymentIntent the storefront needs: the id to record against the order
/// and the client secret the frontend confirms the payment with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

/// A Stripe webhook event. Only the fields the order flow acts on are deserialized; the rest of
/// the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: StripeEventObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// What a provider event means for the order, independent of which provider sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

impl StripeEvent {
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Maps the event type onto a payment outcome. Events the order flow does not act on
    /// return `None` and are acknowledged without side effects.
    pub fn outcome(&self) -> Option<PaymentOutcome> {
        match self.event_type.as_str() {
            "payment_intent.succeeded" => Some(PaymentOutcome::Succeeded),
            "payment_intent.payment_failed" => Some(PaymentOutcome::Failed),
            _ => None,
        }
    }

    /// The order this event refers to, as recorded in the intent metadata at creation time.
    pub fn order_id(&self) -> Option<&str> {
        self.data.object.metadata.get("order_id").map(|s| s.as_str())
    }

    pub fn payment_intent_id(&self) -> &str {
        &self.data.object.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayPalToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalOrder {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalCapture {
    pub id: String,
    pub status: String,
}

impl PayPalCapture {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}
