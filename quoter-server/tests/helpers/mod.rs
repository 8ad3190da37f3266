//! Shared helpers for quoter-server integration tests
#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{Request, Response},
    Router,
};
use quoter_common::api::hash_access_key;
use quoter_common::db::init_database;
use quoter_server::music::MusicContext;
use quoter_server::{build_router, AppState};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_KEY: &str = "correct horse battery staple";
pub const API: &str = "/bakend/apiend/api";

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub static_dir: Option<PathBuf>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_music(None).await
    }

    pub async fn with_music(music: Option<MusicContext>) -> Self {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();
        let state = AppState::new(pool, Some(hash_access_key(TEST_KEY)), music);
        Self {
            dir,
            state,
            static_dir: None,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.static_dir.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request with a JSON body and, optionally, the access key header
pub fn json_request(method: &str, uri: &str, body: Value, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-Access-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn form_request(method: &str, uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
