//! Identity middleware.
//!
//! Verifies the caller's identity and stores the resulting [`JwtClaims`] in the request
//! extensions, where the claims extractor and the ACL middleware pick them up. Requests without
//! credentials pass through unauthenticated so that public routes keep working; requests with an
//! *invalid* token are rejected here.
//!
//! The source of identities is fixed at server startup. In `Jwt` mode the `Authorization` header
//! carries an HS256 bearer token. In `Demo` mode identities are minted from `X-Demo-Role` and
//! `X-Demo-Merchant-Id` headers; those headers are inert in `Jwt` mode.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use jwt_compact::alg::Hs256Key;
use log::{debug, trace};
use recharge_engine::db_types::Role;

use crate::{
    auth::{decode_access_token, JwtClaims},
    errors::ServerError,
};

#[derive(Clone)]
pub enum IdentitySource {
    Jwt(Hs256Key),
    Demo,
}

pub struct IdentityMiddlewareFactory {
    source: IdentitySource,
}

impl IdentityMiddlewareFactory {
    pub fn new(source: IdentitySource) -> Self {
        IdentityMiddlewareFactory { source }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = IdentityMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService { source: self.source.clone(), service: Rc::new(service) }))
    }
}

pub struct IdentityMiddlewareService<S> {
    source: IdentitySource,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match &self.source {
            IdentitySource::Jwt(key) => match bearer_token(&req) {
                Some(token) => match decode_access_token(token, key) {
                    Ok(claims) => Some(claims),
                    Err(e) => {
                        debug!("🔐️ Rejecting request with invalid access token. {e}");
                        let err: Error = ServerError::AuthenticationError(e).into();
                        return Box::pin(ready(Err(err)));
                    },
                },
                None => None,
            },
            IdentitySource::Demo => demo_claims(&req),
        };
        if let Some(claims) = claims {
            trace!("🔐️ Request authenticated as {} with roles [{}]", claims.sub, claims.roles);
            req.extensions_mut().insert(claims);
        }
        Box::pin(self.service.call(req))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers().get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn header_value(req: &ServiceRequest, name: &str) -> Option<String> {
    let value = req.headers().get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Mints a demo identity from the `X-Demo-*` headers, mirroring what a real token for that role
/// would carry. No header, or an unrecognised role, means an unauthenticated request.
fn demo_claims(req: &ServiceRequest) -> Option<JwtClaims> {
    let role = match header_value(req, "X-Demo-Role")?.parse::<Role>() {
        Ok(role) => role,
        Err(e) => {
            debug!("🔐️ Ignoring demo identity header. {e}");
            return None;
        },
    };
    let merchant_id = header_value(req, "X-Demo-Merchant-Id").unwrap_or_else(|| "merchant_demo".to_string());
    let claims = match role {
        Role::Admin => JwtClaims {
            sub: "demo|admin".to_string(),
            email: Some("admin@demo.local".to_string()),
            name: Some("Demo Admin".to_string()),
            roles: vec![Role::User, Role::Admin].into(),
            merchant_id: None,
        },
        Role::Merchant => JwtClaims {
            sub: format!("demo|merchant|{merchant_id}"),
            email: Some(format!("{merchant_id}@demo.local")),
            name: Some(format!("Demo Merchant ({merchant_id})")),
            roles: vec![Role::User, Role::Merchant].into(),
            merchant_id: Some(merchant_id),
        },
        Role::User => JwtClaims {
            sub: "demo|user".to_string(),
            email: Some("user@demo.local".to_string()),
            name: Some("Demo User".to_string()),
            roles: vec![Role::User].into(),
            merchant_id: None,
        },
    };
    Some(claims)
}
