//! In-memory HTTP test helpers.

#![allow(dead_code)]

use attendd_server::{AttendServer, ServerConfig};
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Runs the axum router without binding a TCP port.
///
/// Clones share the router and the data directory.
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub data_dir: Arc<TempDir>,
}

impl TestApp {
    /// Opens a server on a fresh data directory.
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    /// Opens a server with `config`, overriding its data directory.
    pub async fn with_config(config: ServerConfig) -> Self {
        let data_dir = tempfile::tempdir().unwrap();
        let config = config.with_data_dir(data_dir.path());
        let server = AttendServer::open(config).await.unwrap();
        Self {
            router: server.into_app(),
            data_dir: Arc::new(data_dir),
        }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, json: Value) -> Response<Body> {
        self.post_raw(uri, serde_json::to_vec(&json).unwrap()).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<Body>) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        self.request(req).await
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
