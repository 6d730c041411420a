//! Shared harness for the HTTP integration tests
//!
//! Each test gets its own SQLite file in a temp dir and drives the real
//! router in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use ems_server::auth::JwtConfig;
use ems_server::{Config, ServerState, build_app};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        database_path: dir.path().join("ems.db").to_string_lossy().into_owned(),
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789abcdef".into(),
            ..JwtConfig::default()
        },
        demo_users_enabled: false,
        login_rate_limit: 0,
        ..Config::default()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a tweaked configuration
    pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(&dir);
        tweak(&mut config);
        let state = ServerState::initialize(&config)
            .await
            .expect("state initializes");
        let app = build_app(state.clone());
        Self {
            app,
            state,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid request");

        let response = self.app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    pub async fn try_login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self.try_login(username, password).await;
        assert_eq!(status, StatusCode::OK, "login {username} failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Token of the bootstrap admin created at startup
    pub async fn admin_token(&self) -> String {
        self.login("admin", "admin123").await
    }

    /// Create an employee with an explicit account; returns the response body
    pub async fn create_employee(
        &self,
        token: &str,
        name: &str,
        username: &str,
        role: &str,
    ) -> Value {
        let (status, body) = self
            .post(
                "/api/employees",
                token,
                json!({
                    "name": name,
                    "email": format!("{username}@example.com"),
                    "department": "Engineering",
                    "position": "Developer",
                    "salary": 50000.0,
                    "username": username,
                    "password": "password1",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {name} failed: {body}");
        body
    }
}
