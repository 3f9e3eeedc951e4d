//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app over the in-memory store (no database needed)
//! - Test user sign-up
//! - JSON request/response helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, AuthConfig, Config, DatabaseConfig};
use taskboard_shared::store::MemoryStore;
use tower::Service as _;

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
}

/// A signed-up user with their tokens
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

pub const PASSWORD: &str = "Sup3r$ecret";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            hsts: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-at-least-32-bytes".to_string(),
            session_ttl_hours: 24,
        },
    }
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_config());

        Self {
            store,
            app: build_router(state),
        }
    }

    /// Sends a request and returns status and parsed JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    /// Signs up a user through the API
    pub async fn sign_up(&self, first_name: &str, last_name: &str) -> TestUser {
        let email = format!("{}.{}@example.com", first_name, last_name).to_lowercase();

        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/sign-up",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": first_name,
                    "last_name": last_name,
                    "role": "Developer",
                    "department": "Engineering",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            email,
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}
