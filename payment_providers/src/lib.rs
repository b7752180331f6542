//! HTTP clients for the hosted payment providers.
//!
//! Each provider gets a thin client over its REST API, configured from the environment. The
//! clients know nothing about the order store; they take amounts and order ids and return the
//! provider-side handles the caller records against the order.
mod config;
mod error;
mod helpers;
mod paypal_api;
mod stripe_api;

mod data_objects;

pub use config::{PayPalConfig, PayPalEnv, StripeConfig};
pub use data_objects::{PayPalCapture, PayPalOrder, PaymentIntent, PaymentOutcome, StripeEvent};
pub use error::ProviderApiError;
pub use helpers::paypal_amount;
pub use paypal_api::PayPalApi;
pub use stripe_api::StripeApi;
