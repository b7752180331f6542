//! Access tokens and the claims attached to authenticated requests.
//!
//! Production tokens are minted by the identity provider and shared-secret signed with HS256.
//! The server only verifies them; [`TokenIssuer`] exists for operators bootstrapping a local
//! instance and for the endpoint tests.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Duration;
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    UntrustedToken,
};
use recharge_engine::db_types::{Role, Roles, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The custom claims carried by an access token. `roles` is expected to hold every role the
/// subject has, so a plain user carries `["user"]` and an admin `["user", "admin"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Roles,
    #[serde(default)]
    pub merchant_id: Option<String>,
}

impl JwtClaims {
    /// The single role stored on the user row: the highest-ranking role in the claim set.
    pub fn primary_role(&self) -> Role {
        if self.roles.contains(Role::Admin) {
            Role::Admin
        } else if self.roles.contains(Role::Merchant) {
            Role::Merchant
        } else {
            Role::User
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(Role::Admin)
    }

    /// The identity that gets mirrored into the user table on authenticated requests.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            sub: self.sub.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.primary_role(),
        }
    }
}

/// Claims are placed into the request extensions by the identity middleware. Handlers that take
/// a `JwtClaims` argument therefore reject unauthenticated requests with a 401.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

pub fn hs256_key(config: &AuthConfig) -> Hs256Key {
    Hs256Key::new(config.jwt_secret.reveal().as_bytes())
}

/// Verifies the token's signature and expiry against the shared secret and returns the embedded
/// claims.
pub fn decode_access_token(token: &str, key: &Hs256Key) -> Result<JwtClaims, AuthError> {
    let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e}")))?;
    let token = Hs256
        .validator::<JwtClaims>(key)
        .validate(&untrusted)
        .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
    token
        .claims()
        .validate_expiration(&TimeOptions::default())
        .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
    Ok(token.claims().custom.clone())
}

pub struct TokenIssuer {
    key: Hs256Key,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: hs256_key(config) }
    }

    /// Issues a signed access token for the given claims, valid for `duration`, or 24 hours when
    /// `None`.
    pub fn issue_token(&self, claims: JwtClaims, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(24));
        let claims = Claims::new(claims).set_duration_and_issuance(&TimeOptions::default(), duration);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::ValidationError(format!("{e:?}")))
    }
}
