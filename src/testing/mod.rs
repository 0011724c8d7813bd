//! Test helpers: an in-memory application with an HS256 verifier.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app::{app, AppState};
use crate::auth::{issue_token, Claims, JwtIdentityResolver};
use crate::config::AppConfig;
use crate::database::MemoryStore;

pub const TEST_SECRET: &str = "in-crate-test-secret";

pub struct TestContext {
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let resolver = JwtIdentityResolver::with_secret(TEST_SECRET);
        let state = AppState::from_store(Arc::new(MemoryStore::new()), "memory", Arc::new(resolver));
        Self {
            router: app(state, &AppConfig::development()),
        }
    }

    pub fn token_for(&self, sub: &str) -> String {
        issue_token(TEST_SECRET, &Claims::new(sub, None, 1)).unwrap()
    }

    /// Send one request; `token` adds a bearer header, `body` a JSON body.
    pub async fn send(
        &self,
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
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
