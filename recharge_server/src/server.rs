use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use payment_providers::{PayPalApi, StripeApi};
use recharge_engine::{CatalogApi, MerchantApi, OrderFlowApi, SqliteDatabase, UserApi};

use crate::{
    auth::hs256_key,
    config::{IdentityMode, ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::{IdentityMiddlewareFactory, IdentitySource, StripeSignatureMiddlewareFactory},
    payment_routes::{PaypalCaptureRoute, PaypalOrderRoute, StripeIntentRoute, StripeWebhookRoute},
    routes::{
        health,
        AdminCreateGameRoute,
        AdminDeleteGameRoute,
        AdminGamesRoute,
        AdminMerchantsRoute,
        AdminUpdateGameRoute,
        AdminUserDetailRoute,
        AdminUsersRoute,
        ApplyForMerchantRoute,
        ApproveApplicationRoute,
        CreateMerchantGameRoute,
        CreateMerchantRoute,
        CreateMerchantSkuRoute,
        CreateOrderRoute,
        DeleteMerchantGameRoute,
        DeleteMerchantSkuRoute,
        DeleteUserRoute,
        DemoPayRoute,
        GameRoute,
        GameSellersRoute,
        GamesRoute,
        MerchantApplicationsRoute,
        MerchantGamesRoute,
        MerchantOrdersRoute,
        MerchantSkusRoute,
        MerchantStatsRoute,
        MyApplicationStatusRoute,
        MyOrdersRoute,
        MyProfileRoute,
        RejectApplicationRoute,
        ReplaceMerchantBindingsRoute,
        SetUserRoleRoute,
        UpdateMerchantGameRoute,
        UpdateMerchantRoute,
        UpdateMerchantSkuRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let stripe_api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let paypal_api = PayPalApi::new(config.paypal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let identity_source = match config.identity_mode {
        IdentityMode::Jwt => IdentitySource::Jwt(hs256_key(&config.auth)),
        IdentityMode::Demo => IdentitySource::Demo,
    };
    let options = ServerOptions::from_config(&config);
    info!("💻️ Identity mode is {:?}", config.identity_mode);
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone());
        let orders_api = OrderFlowApi::new(db.clone());
        let merchants_api = MerchantApi::new(db.clone());
        let users_api = UserApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rgp::access_log"))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(merchants_api))
            .app_data(web::Data::new(users_api))
            .app_data(web::Data::new(stripe_api.clone()))
            .app_data(web::Data::new(paypal_api.clone()))
            .app_data(web::Data::new(options));
        // Every route under /api sees the identity middleware; the public ones simply ignore
        // an unauthenticated request.
        let api_scope = web::scope("/api")
            .wrap(IdentityMiddlewareFactory::new(identity_source.clone()))
            .service(GamesRoute::<SqliteDatabase>::new())
            .service(GameRoute::<SqliteDatabase>::new())
            .service(GameSellersRoute::<SqliteDatabase>::new())
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(DemoPayRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(StripeIntentRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(PaypalOrderRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(PaypalCaptureRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(MerchantGamesRoute::<SqliteDatabase>::new())
            .service(CreateMerchantGameRoute::<SqliteDatabase>::new())
            .service(UpdateMerchantGameRoute::<SqliteDatabase>::new())
            .service(DeleteMerchantGameRoute::<SqliteDatabase>::new())
            .service(MerchantSkusRoute::<SqliteDatabase>::new())
            .service(CreateMerchantSkuRoute::<SqliteDatabase>::new())
            .service(UpdateMerchantSkuRoute::<SqliteDatabase>::new())
            .service(DeleteMerchantSkuRoute::<SqliteDatabase>::new())
            .service(MerchantOrdersRoute::<SqliteDatabase>::new())
            .service(MerchantStatsRoute::<SqliteDatabase>::new())
            .service(ApplyForMerchantRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(MyApplicationStatusRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(MerchantApplicationsRoute::<SqliteDatabase>::new())
            .service(ApproveApplicationRoute::<SqliteDatabase>::new())
            .service(RejectApplicationRoute::<SqliteDatabase>::new())
            .service(AdminMerchantsRoute::<SqliteDatabase>::new())
            .service(CreateMerchantRoute::<SqliteDatabase>::new())
            .service(UpdateMerchantRoute::<SqliteDatabase>::new())
            .service(ReplaceMerchantBindingsRoute::<SqliteDatabase>::new())
            .service(AdminGamesRoute::<SqliteDatabase>::new())
            .service(AdminCreateGameRoute::<SqliteDatabase>::new())
            .service(AdminUpdateGameRoute::<SqliteDatabase>::new())
            .service(AdminDeleteGameRoute::<SqliteDatabase>::new())
            .service(AdminUsersRoute::<SqliteDatabase>::new())
            .service(AdminUserDetailRoute::<SqliteDatabase>::new())
            .service(SetUserRoleRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new());
        let webhook_scope = web::scope("/webhook")
            .wrap(StripeSignatureMiddlewareFactory::new(
                config.stripe.webhook_secret.clone(),
                config.stripe_webhook_checks,
            ))
            .service(StripeWebhookRoute::<SqliteDatabase>::new());
        app.service(api_scope).service(webhook_scope).service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
