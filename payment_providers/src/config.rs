use log::*;
use rgp_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    /// The endpoint signing secret used to verify `Stripe-Signature` headers on webhook calls.
    pub webhook_secret: Secret<String>,
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let secret_key = Secret::new(std::env::var("RGP_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("RGP_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("RGP_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("RGP_STRIPE_WEBHOOK_SECRET not set, using (probably useless) default");
            "whsec_00000000000000".to_string()
        }));
        Self { secret_key, webhook_secret }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayPalEnv {
    #[default]
    Sandbox,
    Live,
}

#[derive(Debug, Clone, Default)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub env: PayPalEnv,
}

impl PayPalConfig {
    pub fn new_from_env_or_default() -> Self {
        let client_id = std::env::var("RGP_PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("RGP_PAYPAL_CLIENT_ID not set, using (probably useless) default");
            "paypal-client-id".to_string()
        });
        let client_secret = Secret::new(std::env::var("RGP_PAYPAL_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("RGP_PAYPAL_CLIENT_SECRET not set, using (probably useless) default");
            "paypal-client-secret".to_string()
        }));
        let env = match std::env::var("RGP_PAYPAL_ENV").as_deref() {
            Ok("live") => PayPalEnv::Live,
            Ok("sandbox") | Err(_) => PayPalEnv::Sandbox,
            Ok(other) => {
                warn!("RGP_PAYPAL_ENV is '{other}', expected 'sandbox' or 'live'. Using sandbox.");
                PayPalEnv::Sandbox
            },
        };
        Self { client_id, client_secret, env }
    }

    pub fn api_base(&self) -> &'static str {
        match self.env {
            PayPalEnv::Sandbox => "https://api-m.sandbox.paypal.com",
            PayPalEnv::Live => "https://api-m.paypal.com",
        }
    }
}
