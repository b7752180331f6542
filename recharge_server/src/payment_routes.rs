//! Payment provider routes
//!
//! The checkout calls that hand a pending order to Stripe or PayPal, and the webhook receiver
//! that applies asynchronous payment outcomes. The checkout calls act only on an order the
//! caller owns. The webhook is unauthenticated; the signature middleware in front of it has
//! already verified the payload when checks are enabled.
use actix_web::{web, HttpResponse};
use log::*;
use payment_providers::{PayPalApi, PaymentOutcome, StripeApi, StripeEvent};
use recharge_engine::{
    db_types::OrderStatus,
    traits::{OrderManagement, UserManagement},
    OrderFlowApi,
    UserApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{JsonResponse, PayPalCaptureParams, PayPalOrderResult, PaymentOrderParams, StripeIntentResult},
    errors::ServerError,
    route,
};

//----------------------------------------------   Stripe checkout  ----------------------------------------------------

route!(stripe_intent => Post "/payments/stripe/intent" impl OrderManagement, UserManagement);
pub async fn stripe_intent<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
    stripe: web::Data<StripeApi>,
    body: web::Json<PaymentOrderParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💳️ POST Stripe intent for order {} from {}", params.order_id, claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let order = orders.pending_order_for_user(&params.order_id, &user.id).await?;
    let intent = stripe.create_payment_intent(&order.id, order.amount, &order.currency).await?;
    orders.attach_payment_provider(&order.id, "STRIPE", &intent.id).await?;
    Ok(HttpResponse::Ok().json(StripeIntentResult { client_secret: intent.client_secret, payment_intent_id: intent.id }))
}

//----------------------------------------------   PayPal checkout  ----------------------------------------------------

route!(paypal_order => Post "/payments/paypal/order" impl OrderManagement, UserManagement);
pub async fn paypal_order<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
    paypal: web::Data<PayPalApi>,
    body: web::Json<PaymentOrderParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💳️ POST PayPal order for order {} from {}", params.order_id, claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let order = orders.pending_order_for_user(&params.order_id, &user.id).await?;
    let paypal_order = paypal.create_order(&order.id, order.amount, &order.currency).await?;
    orders.attach_payment_provider(&order.id, "PAYPAL", &paypal_order.id).await?;
    Ok(HttpResponse::Ok().json(PayPalOrderResult { paypal_order_id: paypal_order.id }))
}

route!(paypal_capture => Post "/payments/paypal/capture" impl OrderManagement, UserManagement);
pub async fn paypal_capture<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
    paypal: web::Data<PayPalApi>,
    body: web::Json<PayPalCaptureParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💳️ POST PayPal capture for order {} from {}", params.order_id, claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let order = orders.order_for_user(&params.order_id, &user.id).await?;
    let capture = paypal.capture_order(&params.provider_order_id).await?;
    let status = if capture.is_completed() { OrderStatus::Paid } else { OrderStatus::Failed };
    let updated = orders
        .apply_payment_outcome(&order.id, status)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No order with id {}", order.id)))?;
    info!("💳️ Order {} marked {} after PayPal capture", order.id, updated.order.status);
    Ok(HttpResponse::Ok().json(updated))
}

//----------------------------------------------   Stripe webhook  ----------------------------------------------------

// The provider retries on non-2xx responses, so every path below acknowledges the event. What
// went wrong is recorded in the response body and the logs, not the status code.
route!(stripe_webhook => Post "/stripe" impl OrderManagement);
pub async fn stripe_webhook<B: OrderManagement>(api: web::Data<OrderFlowApi<B>>, body: web::Bytes) -> HttpResponse {
    let event = match StripeEvent::from_payload(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("💳️ Could not deserialize Stripe webhook payload. {e}");
            return HttpResponse::Ok().json(JsonResponse::failure("Invalid payload"));
        },
    };
    let outcome = match event.outcome() {
        Some(outcome) => outcome,
        None => {
            debug!("💳️ Ignoring Stripe event {} of type {}", event.id, event.event_type);
            return HttpResponse::Ok().json(JsonResponse::success(format!("Ignored event of type {}", event.event_type)));
        },
    };
    let order_id = match event.order_id() {
        Some(order_id) => order_id,
        None => {
            warn!("💳️ Stripe event {} carries no order id in its metadata", event.id);
            return HttpResponse::Ok().json(JsonResponse::failure("No order id in event metadata"));
        },
    };
    let status = match outcome {
        PaymentOutcome::Succeeded => OrderStatus::Paid,
        PaymentOutcome::Failed => OrderStatus::Failed,
    };
    // The intent id on the event is authoritative, even if checkout already recorded one.
    if let Err(e) = api.attach_payment_provider(order_id, "STRIPE", event.payment_intent_id()).await {
        warn!("💳️ Could not record the payment intent for order {order_id}. {e}");
    }
    match api.apply_payment_outcome(order_id, status).await {
        Ok(Some(order)) => {
            info!("💳️ Order {order_id} marked {} by Stripe event {}", order.order.status, event.id);
            HttpResponse::Ok().json(JsonResponse::success(format!("Order {order_id} marked {}", order.order.status)))
        },
        Ok(None) => {
            warn!("💳️ Stripe event {} refers to unknown order {order_id}", event.id);
            HttpResponse::Ok().json(JsonResponse::failure(format!("Unknown order {order_id}")))
        },
        Err(e) => {
            error!("💳️ Could not apply the Stripe outcome to order {order_id}. {e}");
            HttpResponse::Ok().json(JsonResponse::failure("Could not update the order"))
        },
    }
}
