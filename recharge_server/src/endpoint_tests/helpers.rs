use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Duration;
use log::debug;
use recharge_engine::db_types::Role;
use rgp_common::Secret;

use crate::{
    auth::{hs256_key, JwtClaims, TokenIssuer},
    config::AuthConfig,
    middleware::{IdentityMiddlewareFactory, IdentitySource},
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("do-not-reuse-this-test-secret-anywhere!".to_string()) }
}

pub fn issue_token(claims: JwtClaims, validity: Duration) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(claims, Some(validity)).expect("Failed to sign token")
}

pub fn claims_for(sub: &str, roles: Vec<Role>, merchant_id: Option<&str>) -> JwtClaims {
    JwtClaims {
        sub: sub.to_string(),
        email: Some(format!("{sub}@example.com")),
        name: Some(sub.to_string()),
        roles: roles.into(),
        merchant_id: merchant_id.map(String::from),
    }
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::get().uri(path), auth_header, configure).await
}

pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::post().uri(path).set_json(body), auth_header, configure).await
}

pub async fn put_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::put().uri(path).set_json(body), auth_header, configure).await
}

pub async fn delete_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::delete().uri(path), auth_header, configure).await
}

pub async fn send_request(
    req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let source = IdentitySource::Jwt(hs256_key(&get_auth_config()));
    send_request_with_source(req, auth_header, source, configure).await
}

pub async fn send_request_with_source(
    mut req: TestRequest,
    auth_header: &str,
    source: IdentitySource,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    let req = req.to_request();
    let app = App::new().wrap(IdentityMiddlewareFactory::new(source)).configure(configure);
    let service = test::init_service(app).await;
    debug!("🚀️ Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
