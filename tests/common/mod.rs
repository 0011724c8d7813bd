#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use timetracker_api::auth::{issue_token, Claims, JwtIdentityResolver};
use timetracker_api::config::AppConfig;
use timetracker_api::database::{DatabaseManager, MemoryStore};
use timetracker_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// The real router, driven in-process.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Backed by a fresh in-memory store.
    pub fn new() -> Self {
        let state = AppState::from_store(Arc::new(MemoryStore::new()), "memory", resolver());
        Self::with_state(state)
    }

    /// Backed by PostgreSQL when `TEST_DATABASE_URL` is set, otherwise `None`.
    pub async fn postgres() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return Ok(None);
        };

        let mut database = AppConfig::development().database;
        database.url = Some(url);
        database.run_migrations = true;
        let manager = DatabaseManager::connect(&database, false)
            .await
            .context("failed to connect to TEST_DATABASE_URL")?;

        Ok(Some(Self::with_state(AppState::from_manager(&manager, resolver()))))
    }

    fn with_state(state: AppState) -> Self {
        Self {
            router: app(state, &AppConfig::development()),
        }
    }

    pub fn token(&self, sub: &str) -> String {
        self.token_with_email(sub, None)
    }

    pub fn token_with_email(&self, sub: &str, email: Option<&str>) -> String {
        issue_token(SECRET, &Claims::new(sub, email.map(str::to_string), 1)).expect("token")
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

fn resolver() -> Arc<JwtIdentityResolver> {
    Arc::new(JwtIdentityResolver::with_secret(SECRET))
}

/// Owner id unique to this process, so runs against a shared database never collide.
pub fn unique_owner(name: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{name}-{}-{nanos}", std::process::id())
}

pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}
