//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Each worker thread processes its requests sequentially, so a handler that blocks the thread stops that worker
//! from serving anything else. Long operations (database calls, payment provider calls) must be awaited futures,
//! never synchronous sleeps or blocking I/O.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use recharge_engine::{
    db_types::{MerchantStatus, NewOrder, Role},
    traits::{CatalogManagement, MerchantManagement, OrderManagement, UserManagement},
    CatalogApi,
    MerchantApi,
    OrderFlowApi,
    UserApi,
};

use crate::{
    auth::JwtClaims,
    config::ServerOptions,
    data_objects::{
        AdminGameParams,
        AdminGameUpdateParams,
        ApplicationParams,
        ApplicationStatusQuery,
        GameIdQuery,
        GameParams,
        GameUpdateParams,
        JsonResponse,
        MerchantBindingsParams,
        MerchantUpdateParams,
        NewMerchantParams,
        ReviewParams,
        RoleUpdateParams,
        SkuParams,
        SkuUpdateParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Storefront  ----------------------------------------------------

route!(games => Get "/games" impl CatalogManagement);
pub async fn games<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET games");
    let games = api.games().await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(game => Get "/games/{id}" impl CatalogManagement);
pub async fn game<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    trace!("💻️ GET game {game_id}");
    let game = api
        .game(&game_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No game with id {game_id}")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(game_sellers => Get "/games/{id}/merchants" impl CatalogManagement);
pub async fn game_sellers<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    trace!("💻️ GET sellers for game {game_id}");
    let sellers = api
        .game_sellers(&game_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No game with id {game_id}")))?;
    Ok(HttpResponse::Ok().json(sellers))
}

//----------------------------------------------   Profile  ----------------------------------------------------

route!(my_profile => Get "/me" impl UserManagement);
pub async fn my_profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET profile for {}", claims.sub);
    let profile = api.profile(&claims.identity()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl OrderManagement, UserManagement);
pub async fn create_order<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, ServerError> {
    let new_order = body.into_inner();
    debug!("💻️ POST order for sku {} from {}", new_order.sku_id, claims.sub);
    if new_order.sku_id.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("sku_id must not be empty".to_string()));
    }
    let user = users.sync_user(&claims.identity()).await?;
    let order = orders.place_order(&user, new_order).await?;
    info!("💻️ Order {} created for user {}", order.order.id, user.id);
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders/me" impl OrderManagement, UserManagement);
pub async fn my_orders<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let orders = orders.orders_for_user(&user.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(demo_pay => Post "/orders/{id}/demo-pay" impl OrderManagement, UserManagement);
pub async fn demo_pay<BOrd: OrderManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    options: web::Data<ServerOptions>,
    orders: web::Data<OrderFlowApi<BOrd>>,
    users: web::Data<UserApi<BUsr>>,
) -> Result<HttpResponse, ServerError> {
    // The shortcut only exists in demo identity mode. Everywhere else it is a 404.
    if !options.identity_mode.is_demo() {
        return Err(ServerError::NoRecordFound("Demo checkout is not enabled".to_string()));
    }
    let order_id = path.into_inner();
    debug!("💻️ POST demo payment for order {order_id} from {}", claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let order = orders.demo_pay(&user.id, &order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Merchant console  ----------------------------------------------------

route!(merchant_games => Get "/merchant/games" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn merchant_games<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET merchant games for {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let games = merchants.games_for_merchant(&merchant_id).await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(create_merchant_game => Post "/merchant/games" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn create_merchant_game<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
    body: web::Json<GameParams>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST merchant game from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let new_game = body.into_inner().into_new_game(merchant_id)?;
    let game = merchants.create_game_with_binding(new_game).await?;
    info!("💻️ Game {} created by merchant {}", game.id, game.merchant_id);
    Ok(HttpResponse::Created().json(game))
}

route!(update_merchant_game => Put "/merchant/games/{id}" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn update_merchant_game<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
    body: web::Json<GameUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    debug!("💻️ PUT merchant game {game_id} from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    ensure_game_access(&claims, &merchant_id, &game_id, merchants.as_ref()).await?;
    let update = body.into_inner().into_update()?;
    let game = merchants
        .update_game(&game_id, update)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No game with id {game_id}")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(delete_merchant_game => Delete "/merchant/games/{id}" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn delete_merchant_game<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    debug!("💻️ DELETE merchant game {game_id} from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let game = merchants
        .game_record(&game_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No game with id {game_id}")))?;
    // The owner removes the game outright. Any other seller only steps out of its own binding.
    if game.merchant_id == merchant_id {
        merchants.delete_game(&game_id).await?;
        info!("💻️ Game {game_id} deleted by its owner {merchant_id}");
        return Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Game {game_id} deleted"))));
    }
    if !merchants.deactivate_binding(&merchant_id, &game_id).await? {
        return Err(ServerError::NoRecordFound(format!("No game with id {game_id}")));
    }
    info!("💻️ Merchant {merchant_id} left game {game_id}");
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Binding for game {game_id} deactivated"))))
}

route!(merchant_skus => Get "/merchant/skus" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn merchant_skus<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    query: web::Query<GameIdQuery>,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let game_id = query.into_inner().game_id;
    debug!("💻️ GET merchant skus for game {game_id} from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    ensure_game_access(&claims, &merchant_id, &game_id, merchants.as_ref()).await?;
    let skus = merchants.skus_for_game(&game_id).await?;
    Ok(HttpResponse::Ok().json(skus))
}

route!(create_merchant_sku => Post "/merchant/skus" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn create_merchant_sku<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
    body: web::Json<SkuParams>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST merchant sku from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let new_sku = body.into_inner().into_new_sku()?;
    ensure_game_access(&claims, &merchant_id, &new_sku.game_id, merchants.as_ref()).await?;
    let sku = merchants.create_sku(new_sku).await?;
    info!("💻️ Sku {} created for game {}", sku.id, sku.game_id);
    Ok(HttpResponse::Created().json(sku))
}

route!(update_merchant_sku => Put "/merchant/skus/{id}" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn update_merchant_sku<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
    body: web::Json<SkuUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let sku_id = path.into_inner();
    debug!("💻️ PUT merchant sku {sku_id} from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let sku = merchants
        .sku(&sku_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No sku with id {sku_id}")))?;
    ensure_game_access(&claims, &merchant_id, &sku.game_id, merchants.as_ref()).await?;
    let update = body.into_inner().into_update()?;
    let sku = merchants
        .update_sku(&sku_id, update)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No sku with id {sku_id}")))?;
    Ok(HttpResponse::Ok().json(sku))
}

route!(delete_merchant_sku => Delete "/merchant/skus/{id}" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn delete_merchant_sku<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let sku_id = path.into_inner();
    debug!("💻️ DELETE merchant sku {sku_id} from {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let sku = merchants
        .sku(&sku_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No sku with id {sku_id}")))?;
    ensure_game_access(&claims, &merchant_id, &sku.game_id, merchants.as_ref()).await?;
    merchants.delete_sku(&sku_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Sku {sku_id} deleted"))))
}

route!(merchant_orders => Get "/merchant/orders" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn merchant_orders<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET merchant orders for {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let orders = merchants.orders_for_merchant(&merchant_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(merchant_stats => Get "/merchant/stats" impl MerchantManagement, UserManagement where requires [Role::Merchant, Role::Admin]);
pub async fn merchant_stats<B: MerchantManagement + UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<B>>,
    users: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET merchant stats for {}", claims.sub);
    let merchant_id = resolve_merchant_scope(&claims, merchants.as_ref(), users.as_ref()).await?;
    let stats = merchants.stats_for_merchant(&merchant_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

//----------------------------------------------   Merchant applications  ----------------------------------------------------

route!(apply_for_merchant => Post "/merchant/apply" impl MerchantManagement, UserManagement);
pub async fn apply_for_merchant<BMer: MerchantManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<BMer>>,
    users: web::Data<UserApi<BUsr>>,
    body: web::Json<ApplicationParams>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST merchant application from {}", claims.sub);
    let application = body.into_inner().into_application()?;
    let user = users.sync_user(&claims.identity()).await?;
    let application = merchants.apply(&user.id, application).await?;
    info!("💻️ Merchant application {} filed by user {}", application.id, user.id);
    Ok(HttpResponse::Created().json(application))
}

route!(my_application_status => Get "/merchant/apply/status" impl MerchantManagement, UserManagement);
pub async fn my_application_status<BMer: MerchantManagement, BUsr: UserManagement>(
    claims: JwtClaims,
    merchants: web::Data<MerchantApi<BMer>>,
    users: web::Data<UserApi<BUsr>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET application status for {}", claims.sub);
    let user = users.sync_user(&claims.identity()).await?;
    let application = merchants
        .newest_application_for_user(&user.id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("No application on file".to_string()))?;
    Ok(HttpResponse::Ok().json(application))
}

route!(merchant_applications => Get "/admin/merchant-applications" impl MerchantManagement where requires [Role::Admin]);
pub async fn merchant_applications<B: MerchantManagement>(
    query: web::Query<ApplicationStatusQuery>,
    api: web::Data<MerchantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let status = query.into_inner().status;
    debug!("💻️ GET merchant applications (status filter: {status:?})");
    let applications = api.applications(status).await?;
    Ok(HttpResponse::Ok().json(applications))
}

route!(approve_application => Post "/admin/merchant-applications/{id}/approve" impl MerchantManagement where requires [Role::Admin]);
pub async fn approve_application<B: MerchantManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
    body: Option<web::Json<ReviewParams>>,
) -> Result<HttpResponse, ServerError> {
    let application_id = path.into_inner();
    debug!("💻️ POST approve application {application_id} from {}", claims.sub);
    let note = body.and_then(|b| b.into_inner().review_note);
    let approved = api.approve_application(&application_id, note).await?;
    info!(
        "💻️ Application {application_id} approved. Merchant {} created for user {}",
        approved.merchant.id, approved.application.user_id
    );
    Ok(HttpResponse::Ok().json(approved))
}

route!(reject_application => Post "/admin/merchant-applications/{id}/reject" impl MerchantManagement where requires [Role::Admin]);
pub async fn reject_application<B: MerchantManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
    body: Option<web::Json<ReviewParams>>,
) -> Result<HttpResponse, ServerError> {
    let application_id = path.into_inner();
    debug!("💻️ POST reject application {application_id} from {}", claims.sub);
    let note = body.and_then(|b| b.into_inner().review_note);
    let application = api.reject_application(&application_id, note).await?;
    info!("💻️ Application {application_id} rejected");
    Ok(HttpResponse::Ok().json(application))
}

//----------------------------------------------   Admin console  ----------------------------------------------------

route!(admin_merchants => Get "/admin/merchants" impl MerchantManagement where requires [Role::Admin]);
pub async fn admin_merchants<B: MerchantManagement>(api: web::Data<MerchantApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all merchants");
    let merchants = api.merchants_with_stats().await?;
    Ok(HttpResponse::Ok().json(merchants))
}

route!(create_merchant => Post "/admin/merchants" impl MerchantManagement where requires [Role::Admin]);
pub async fn create_merchant<B: MerchantManagement>(
    claims: JwtClaims,
    api: web::Data<MerchantApi<B>>,
    body: web::Json<NewMerchantParams>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST merchant from {}", claims.sub);
    let (new_merchant, game_ids) = body.into_inner().into_parts()?;
    let merchant = api.create_merchant(new_merchant, &game_ids).await?;
    info!("💻️ Merchant {} created with {} bindings", merchant.id, game_ids.len());
    Ok(HttpResponse::Created().json(merchant))
}

route!(update_merchant => Put "/admin/merchants/{id}" impl MerchantManagement where requires [Role::Admin]);
pub async fn update_merchant<B: MerchantManagement>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
    body: web::Json<MerchantUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = path.into_inner();
    debug!("💻️ PUT merchant {merchant_id}");
    let update = body.into_inner().into_update()?;
    let merchant = api
        .update_merchant(&merchant_id, update)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No merchant with id {merchant_id}")))?;
    Ok(HttpResponse::Ok().json(merchant))
}

route!(replace_merchant_bindings => Put "/admin/merchants/{id}/games" impl MerchantManagement where requires [Role::Admin]);
pub async fn replace_merchant_bindings<B: MerchantManagement>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
    body: web::Json<MerchantBindingsParams>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = path.into_inner();
    debug!("💻️ PUT bindings for merchant {merchant_id}");
    let game_ids = body.into_inner().game_ids;
    let bindings = api.replace_merchant_bindings(&merchant_id, &game_ids).await?;
    Ok(HttpResponse::Ok().json(bindings))
}

route!(admin_games => Get "/admin/games" impl CatalogManagement where requires [Role::Admin]);
pub async fn admin_games<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all games");
    let games = api.games().await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(admin_create_game => Post "/admin/games" impl MerchantManagement where requires [Role::Admin]);
pub async fn admin_create_game<B: MerchantManagement>(
    claims: JwtClaims,
    api: web::Data<MerchantApi<B>>,
    body: web::Json<AdminGameParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST game for merchant {} from {}", params.merchant_id, claims.sub);
    let merchant_id = params.merchant_id;
    if api.merchant(&merchant_id).await?.is_none() {
        return Err(ServerError::InvalidRequestBody(format!("merchant_id {merchant_id} does not exist")));
    }
    let new_game = params.game.into_new_game(merchant_id)?;
    let game = api.create_game_with_binding(new_game).await?;
    info!("💻️ Game {} created for merchant {}", game.id, game.merchant_id);
    Ok(HttpResponse::Created().json(game))
}

route!(admin_update_game => Put "/admin/games/{id}" impl MerchantManagement where requires [Role::Admin]);
pub async fn admin_update_game<B: MerchantManagement>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
    body: web::Json<AdminGameUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    debug!("💻️ PUT game {game_id}");
    let params = body.into_inner();
    // Reassigning ownership is allowed here, but only to a merchant that exists.
    if let Some(merchant_id) = &params.merchant_id {
        if api.merchant(merchant_id).await?.is_none() {
            return Err(ServerError::InvalidRequestBody(format!("merchant_id {merchant_id} does not exist")));
        }
    }
    let mut update = params.game.into_update()?;
    update.merchant_id = params.merchant_id;
    let game = api
        .update_game(&game_id, update)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No game with id {game_id}")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(admin_delete_game => Delete "/admin/games/{id}" impl MerchantManagement where requires [Role::Admin]);
pub async fn admin_delete_game<B: MerchantManagement>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let game_id = path.into_inner();
    debug!("💻️ DELETE game {game_id}");
    if !api.delete_game(&game_id).await? {
        return Err(ServerError::NoRecordFound(format!("No game with id {game_id}")));
    }
    info!("💻️ Game {game_id} deleted");
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Game {game_id} deleted"))))
}

route!(admin_users => Get "/admin/users" impl UserManagement where requires [Role::Admin]);
pub async fn admin_users<B: UserManagement>(api: web::Data<UserApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all users");
    let users = api.users_with_counts().await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(admin_user_detail => Get "/admin/users/{id}" impl UserManagement where requires [Role::Admin]);
pub async fn admin_user_detail<B: UserManagement>(
    path: web::Path<String>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ GET user {user_id}");
    let detail = api
        .user_detail(&user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No user with id {user_id}")))?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(set_user_role => Put "/admin/users/{id}/role" impl UserManagement where requires [Role::Admin]);
pub async fn set_user_role<B: UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<UserApi<B>>,
    body: web::Json<RoleUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    let role = body.into_inner().role;
    debug!("💻️ PUT role {role} for user {user_id} from {}", claims.sub);
    let user = api
        .set_user_role(&user_id, role)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No user with id {user_id}")))?;
    info!("💻️ User {user_id} is now {role}");
    Ok(HttpResponse::Ok().json(user))
}

route!(delete_user => Delete "/admin/users/{id}" impl UserManagement where requires [Role::Admin]);
pub async fn delete_user<B: UserManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ DELETE user {user_id} from {}", claims.sub);
    let target = api
        .user(&user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No user with id {user_id}")))?;
    if target.sub == claims.sub {
        return Err(ServerError::InvalidRequestBody("You cannot delete your own account".to_string()));
    }
    api.delete_user(&user_id).await?;
    info!("💻️ User {user_id} deleted by {}", claims.sub);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("User {user_id} deleted"))))
}

//----------------------------------------------   Helpers  ----------------------------------------------------

/// Resolves the merchant a console request acts for. The claim wins when present; otherwise the
/// merchant link on the user record is used. The merchant must exist, and must be active unless
/// the caller is an admin.
async fn resolve_merchant_scope<BM, BU>(
    claims: &JwtClaims,
    merchants: &MerchantApi<BM>,
    users: &UserApi<BU>,
) -> Result<String, ServerError>
where
    BM: MerchantManagement,
    BU: UserManagement,
{
    let user = users.sync_user(&claims.identity()).await?;
    let merchant_id = match claims.merchant_id.clone() {
        Some(id) => id,
        None => users
            .merchant_id_for_user(&user.id)
            .await?
            .ok_or_else(|| ServerError::InsufficientPermissions("No merchant is linked to this account".to_string()))?,
    };
    let merchant = merchants
        .merchant(&merchant_id)
        .await?
        .ok_or_else(|| ServerError::InsufficientPermissions(format!("Merchant {merchant_id} does not exist")))?;
    if merchant.status != MerchantStatus::Active && !claims.is_admin() {
        debug!("💻️ Denying console access for suspended merchant {merchant_id}");
        return Err(ServerError::InsufficientPermissions(format!("Merchant {merchant_id} is suspended")));
    }
    Ok(merchant_id)
}

/// Confirms the merchant owns the game or holds an active binding to it. Admins skip the check.
async fn ensure_game_access<B: MerchantManagement>(
    claims: &JwtClaims,
    merchant_id: &str,
    game_id: &str,
    merchants: &MerchantApi<B>,
) -> Result<(), ServerError> {
    if claims.is_admin() {
        return Ok(());
    }
    if merchants.has_game_access(merchant_id, game_id).await? {
        return Ok(());
    }
    debug!("💻️ Merchant {merchant_id} tried to act on game {game_id} without access");
    Err(ServerError::InsufficientPermissions(format!("Merchant {merchant_id} has no access to game {game_id}")))
}
