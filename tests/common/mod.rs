//! Shared helpers for HTTP integration tests.
//!
//! Every app gets a private in-memory database, so tests are independent.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todoplane::{
    api::{build_todo_router, build_user_router, RouterSettings, TodoApiState, UserApiState},
    storage::{create_pool, TODO_MIGRATIONS, USER_MIGRATIONS},
    AppConfig, ServiceKind,
};
use tower::ServiceExt;

pub const SHARED_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN_PASSWORD: &str = "operator-supplied-admin-password";

pub fn test_config(kind: ServiceKind) -> AppConfig {
    let mut config = AppConfig::for_service(kind);
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = SHARED_SECRET.to_string();
    config.auth.bcrypt_cost = 4 /* bcrypt minimum cost */;
    config.admin.password = Some(ADMIN_PASSWORD.to_string());
    config
}

pub async fn user_app_with(config: AppConfig) -> Router {
    let pool = create_pool(&config.database, &USER_MIGRATIONS).await.expect("user pool");
    let state = UserApiState::from_config(pool.clone(), &config).expect("user state");
    build_user_router(state, pool, &RouterSettings::from_config(ServiceKind::Users, &config))
}

pub async fn user_app() -> Router {
    user_app_with(test_config(ServiceKind::Users)).await
}

pub async fn todo_app_with(config: AppConfig) -> Router {
    let pool = create_pool(&config.database, &TODO_MIGRATIONS).await.expect("todo pool");
    let state = TodoApiState::from_config(pool.clone(), &config);
    build_todo_router(state, pool, &RouterSettings::from_config(ServiceKind::Todos, &config))
}

pub async fn todo_app() -> Router {
    todo_app_with(test_config(ServiceKind::Todos)).await
}

/// Send one request and decode the JSON body (`Value::Null` when empty or not JSON).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// GET a non-JSON endpoint and return the body as text.
pub async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Send a request with a raw `Authorization` header value.
pub async fn send_with_header(
    app: &Router,
    method: Method,
    uri: &str,
    authorization: &str,
) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

pub async fn register(
    app: &Router,
    username: &str,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    let body = json!({ "username": username, "email": email, "password": password });
    send(app, Method::POST, "/register", None, Some(body)).await
}

pub async fn try_login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({ "username": username, "password": password });
    send(app, Method::POST, "/login", None, Some(body)).await
}

/// Log in and return the access token; panics when login fails.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = try_login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().expect("access_token").to_string()
}
