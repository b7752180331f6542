use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use log::*;
use reqwest::Client;
use rgp_common::MinorUnits;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    config::PayPalConfig,
    data_objects::{PayPalCapture, PayPalOrder, PayPalToken},
    helpers::paypal_amount,
    ProviderApiError,
};

/// Tokens are refreshed this long before PayPal says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// A client for the PayPal Checkout Orders API. Access tokens are fetched with the client
/// credentials grant and cached until shortly before they expire.
#[derive(Clone)]
pub struct PayPalApi {
    config: PayPalConfig,
    client: Arc<Client>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl PayPalApi {
    pub fn new(config: PayPalConfig) -> Result<Self, ProviderApiError> {
        let client = Client::builder().build().map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(Mutex::new(None)) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base())
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard.as_ref().filter(|t| t.expires_at > Instant::now()).map(|t| t.value.clone())
    }

    async fn access_token(&self) -> Result<String, ProviderApiError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        trace!("💳️ Fetching a fresh PayPal access token");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ProviderApiError::AuthError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderApiError::AuthError(format!("Token request failed with {status}: {message}")));
        }
        let token = response.json::<PayPalToken>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))?;
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(CachedToken { value: token.access_token.clone(), expires_at });
        }
        Ok(token.access_token)
    }

    async fn json_query<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ProviderApiError> {
        let token = self.access_token().await?;
        let url = self.url(path);
        trace!("💳️ Sending PayPal request: {url}");
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ PayPal request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }

    /// Creates a PayPal order mirroring the store order, with the store order id as both the
    /// reference and custom id so the capture can be tied back to it.
    pub async fn create_order(
        &self,
        order_id: &str,
        amount: MinorUnits,
        currency: &str,
    ) -> Result<PayPalOrder, ProviderApiError> {
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": order_id,
                "custom_id": order_id,
                "amount": {
                    "currency_code": currency,
                    "value": paypal_amount(amount, currency),
                },
            }],
        });
        debug!("💳️ Creating PayPal order for store order {order_id}");
        let order = self.json_query::<PayPalOrder>("/v2/checkout/orders", &body).await?;
        info!("💳️ Created PayPal order {} for store order {order_id}", order.id);
        Ok(order)
    }

    /// Captures a previously approved PayPal order. The caller inspects the returned status;
    /// anything other than `COMPLETED` means the payment did not go through.
    pub async fn capture_order(&self, paypal_order_id: &str) -> Result<PayPalCapture, ProviderApiError> {
        let path = format!("/v2/checkout/orders/{paypal_order_id}/capture");
        debug!("💳️ Capturing PayPal order {paypal_order_id}");
        let capture = self.json_query::<PayPalCapture>(&path, &json!({})).await?;
        info!("💳️ PayPal order {paypal_order_id} capture finished with status {}", capture.status);
        Ok(capture)
    }
}
