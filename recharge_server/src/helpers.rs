use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::ServerError;

type HmacSha256 = Hmac<Sha256>;

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The parsed `Stripe-Signature` header: a unix timestamp and one or more `v1` signatures.
/// Several `v1` entries appear while the endpoint secret is being rotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeSignature {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl StripeSignature {
    /// True when any of the `v1` signatures matches the expected one.
    pub fn matches(&self, expected: &str) -> bool {
        self.signatures.iter().any(|s| s == expected)
    }
}

impl FromStr for StripeSignature {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in s.split(',') {
            match part.trim().split_once('=') {
                Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
                Some(("v1", v)) => signatures.push(v.to_string()),
                // v0 and future schemes are ignored
                _ => {},
            }
        }
        let timestamp = timestamp.ok_or_else(|| {
            ServerError::InvalidRequestBody("Stripe signature header has no valid timestamp".to_string())
        })?;
        if signatures.is_empty() {
            return Err(ServerError::InvalidRequestBody("Stripe signature header has no v1 signature".to_string()));
        }
        Ok(Self { timestamp, signatures })
    }
}

/// The signed-payload scheme Stripe uses for webhooks: HMAC-SHA256 over `"{timestamp}.{body}"`,
/// hex encoded.
pub fn stripe_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // Hmac accepts keys of any length. The empty string can never match a real signature.
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    to_hex(&mac.finalize().into_bytes())
}
