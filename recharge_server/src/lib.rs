//! # Recharge platform server
//! This module hosts the REST server for the game recharge platform. It is responsible for:
//! Serving the public storefront catalogue.
//! Authenticating callers and placing orders against the recharge engine.
//! Driving Stripe and PayPal checkouts, and receiving the signed Stripe webhook.
//! The merchant console, the admin console and the merchant application workflow.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! All API routes live under `/api` and the webhook receiver under `/webhook`. `/health` is a
//! bare health check that returns a 200 OK response.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod payment_routes;
pub mod routes;
pub mod server;
