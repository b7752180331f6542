//! Stripe webhook signature middleware.
//!
//! Stripe signs each webhook delivery with the endpoint secret: the `Stripe-Signature` header
//! carries a unix timestamp and an HMAC-SHA256 over `"{timestamp}.{body}"`. This middleware
//! checks that signature (and that the timestamp is recent enough to rule out replays) before
//! the webhook handler runs, and re-injects the consumed body so the handler can read it again.
//!
//! Wrap the webhook scope with this middleware.

use std::{
    future::{ready, Ready},
    rc::Rc,
    time::Duration,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    web,
    Error,
};
use chrono::Utc;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use rgp_common::Secret;

use crate::helpers::{stripe_signature, StripeSignature};

const SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Deliveries older than this are treated as replays, matching Stripe's own default tolerance.
const SIGNATURE_TOLERANCE: Duration = Duration::from_secs(300);

pub struct StripeSignatureMiddlewareFactory {
    secret: Secret<String>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl StripeSignatureMiddlewareFactory {
    pub fn new(secret: Secret<String>, enabled: bool) -> Self {
        StripeSignatureMiddlewareFactory { secret, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StripeSignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = StripeSignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StripeSignatureMiddlewareService {
            secret: self.secret.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct StripeSignatureMiddlewareService<S> {
    secret: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for StripeSignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.reveal().clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking Stripe signature for request");
            if !enabled {
                trace!("🔐️ Stripe signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let header = req
                .headers()
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    warn!("🔐️ No Stripe signature found in request. Denying access.");
                    ErrorForbidden("No Stripe signature found.")
                })?;
            let signature = header.parse::<StripeSignature>().map_err(|e| {
                warn!("🔐️ Could not parse the Stripe signature header. {e}");
                ErrorForbidden("Malformed Stripe signature.")
            })?;
            let age = (Utc::now().timestamp() - signature.timestamp).unsigned_abs();
            if age > SIGNATURE_TOLERANCE.as_secs() {
                warn!("🔐️ Stripe signature timestamp is {age}s old. Denying access.");
                return Err(ErrorForbidden("Stripe signature is outside the tolerance window."));
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            let expected = stripe_signature(&secret, signature.timestamp, data.as_ref());
            if signature.matches(&expected) {
                trace!("🔐️ Stripe signature check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid Stripe signature found in request. Denying access.");
                Err(ErrorForbidden("Invalid Stripe signature."))
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
