use std::{env, io::Write};

use log::*;
use payment_providers::{PayPalConfig, StripeConfig};
use rand::{thread_rng, RngCore};
use rgp_common::Secret;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::{errors::ServerError, helpers::to_hex};

const DEFAULT_RGP_HOST: &str = "127.0.0.1";
const DEFAULT_RGP_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Where verified identities come from. The demo source is for local development only and
    /// must be selected explicitly; request headers can never switch the mode.
    pub identity_mode: IdentityMode,
    /// If false, the Stripe webhook route accepts unsigned payloads. **DANGER**
    pub stripe_webhook_checks: bool,
    pub stripe: StripeConfig,
    pub paypal: PayPalConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RGP_HOST.to_string(),
            port: DEFAULT_RGP_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            identity_mode: IdentityMode::default(),
            stripe_webhook_checks: true,
            stripe: StripeConfig::default(),
            paypal: PayPalConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RGP_HOST").ok().unwrap_or_else(|| DEFAULT_RGP_HOST.into());
        let port = env::var("RGP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RGP_PORT. {e} Using the default, {DEFAULT_RGP_PORT}, instead."
                    );
                    DEFAULT_RGP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RGP_PORT);
        let database_url = env::var("RGP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ RGP_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let identity_mode = IdentityMode::from_env();
        let stripe_webhook_checks =
            env::var("RGP_STRIPE_WEBHOOK_CHECKS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        if !stripe_webhook_checks {
            warn!(
                "🚨️ Stripe webhook signature checks are DISABLED. Anyone can mark orders as paid. Never run \
                 production like this."
            );
        }
        let stripe = StripeConfig::new_from_env_or_default();
        let paypal = PayPalConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, identity_mode, stripe_webhook_checks, stripe, paypal }
    }
}

//-------------------------------------------------  IdentityMode  -----------------------------------------------------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentityMode {
    /// Bearer tokens verified against the configured HS256 secret.
    #[default]
    Jwt,
    /// Identities minted from `X-Demo-*` headers. Local development only.
    Demo,
}

impl IdentityMode {
    pub fn from_env() -> Self {
        match env::var("RGP_IDENTITY_MODE").map(|s| s.to_lowercase()).as_deref() {
            Ok("demo") => {
                warn!(
                    "🚨️ The server is running in DEMO identity mode. Anyone can claim any role via request \
                     headers. Never run production like this."
                );
                Self::Demo
            },
            Ok("jwt") | Err(_) => Self::Jwt,
            Ok(other) => {
                warn!("🪛️ {other} is not a valid RGP_IDENTITY_MODE. Using 'jwt' instead.");
                Self::Jwt
            },
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo)
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
/// The HS256 secret used to sign and verify access tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this since every restart invalidates all issued tokens. 🚨️🚨️🚨️"
        );
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        let secret = to_hex(&bytes);
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the RGP_JWT_SECRET environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("RGP_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [RGP_JWT_SECRET]")))?;
        // A short HMAC key undermines every access token, so refuse to start with one.
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "RGP_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that handlers need at request time. Kept as small as
/// possible and free of secrets.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub identity_mode: IdentityMode,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { identity_mode: config.identity_mode }
    }
}
