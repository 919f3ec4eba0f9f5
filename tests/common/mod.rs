//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use rp_portal_back::{
    build_router,
    config::AppConfig,
    dao::community_store::memory::MemoryCommunityStore,
    state::{AppState, SharedState},
};
use serde_json::Value;
use tower::ServiceExt;

pub const PANEL_CODE: &str = "2468";

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub store: MemoryCommunityStore,
}

/// Router backed by the in-memory store, with the panel gate enabled.
pub async fn build_test_app() -> TestApp {
    let state = AppState::new(AppConfig {
        panel_code: Some(PANEL_CODE.into()),
        ..AppConfig::default()
    });
    let store = MemoryCommunityStore::new();
    state.set_store(Arc::new(store.clone())).await;
    TestApp {
        router: build_router(state.clone()),
        state,
        store,
    }
}

/// Router with no backend installed, as before the supervisor first connects.
pub fn build_degraded_app() -> Router {
    build_router(AppState::new(AppConfig::default()))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_token(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("x-panel-token", token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_with_token(
    app: &Router,
    uri: &str,
    token: &str,
    body: Value,
) -> Response<Body> {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Unlock the panel and return the issued token.
pub async fn unlock_panel(app: &Router) -> String {
    let response = post_json(app, "/panel/unlock", serde_json::json!({ "code": PANEL_CODE })).await;
    assert_eq!(response.status(), 200);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("x-panel-token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
