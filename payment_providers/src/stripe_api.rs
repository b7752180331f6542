use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use rgp_common::MinorUnits;
use serde::de::DeserializeOwned;

use crate::{config::StripeConfig, data_objects::PaymentIntent, ProviderApiError};

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// A client for the handful of Stripe endpoints the storefront uses. Stripe's API is
/// form-encoded on the way in and JSON on the way out.
#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, ProviderApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn webhook_secret(&self) -> &str {
        self.config.webhook_secret.reveal()
    }

    async fn form_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderApiError> {
        let url = format!("{STRIPE_API_BASE}{path}");
        trace!("💳️ Sending Stripe request: {url}");
        let response =
            self.client.post(url).form(params).send().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Stripe request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }

    /// Creates a PaymentIntent for the order. The amount is already in the smallest unit of the
    /// currency, which is exactly what Stripe expects. The order id travels in the intent
    /// metadata and comes back on the webhook.
    pub async fn create_payment_intent(
        &self,
        order_id: &str,
        amount: MinorUnits,
        currency: &str,
    ) -> Result<PaymentIntent, ProviderApiError> {
        let params = [
            ("amount", amount.value().to_string()),
            ("currency", currency.to_lowercase()),
            ("metadata[order_id]", order_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        debug!("💳️ Creating Stripe PaymentIntent for order {order_id}");
        let intent = self.form_query::<PaymentIntent>("/v1/payment_intents", &params).await?;
        info!("💳️ Created PaymentIntent {} for order {order_id}", intent.id);
        Ok(intent)
    }
}
