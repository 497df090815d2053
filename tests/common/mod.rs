//! Common test utilities and helpers
//!
//! - `TestApp` - the real router over a `MemoryStore` and a `RecordingMailer`
//! - user fixtures written straight to the store
//! - custom assertion macros

#![allow(dead_code)]

#[macro_use]
pub mod assertions;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dayplanner::backend::mail::RecordingMailer;
use dayplanner::backend::routes::create_router;
use dayplanner::backend::server::state::AppState;
use dayplanner::backend::store::{MemoryStore, Store};
use dayplanner::shared::config::RecaptchaSettings;
use dayplanner::shared::planner::{NewUser, Role, User};
use dayplanner::shared::AppConfig;

/// Lowest cost bcrypt accepts, to keep tests fast
pub const TEST_BCRYPT_COST: u32 = 4;
pub const TEST_PASSWORD: &str = "correct horse";

pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .access_secret("test-access-secret")
        .refresh_secret("test-refresh-secret")
        .bcrypt_cost(TEST_BCRYPT_COST)
        .build()
        .expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, Arc::new(RecordingMailer::new()))
    }

    /// An app whose mailer fails every send
    pub fn with_failing_mailer() -> Self {
        Self::build(test_config(), Arc::new(RecordingMailer::failing()))
    }

    /// An app whose captcha client talks to `base_url`
    pub fn with_recaptcha(base_url: String) -> Self {
        let config = AppConfig::builder()
            .access_secret("test-access-secret")
            .refresh_secret("test-refresh-secret")
            .bcrypt_cost(TEST_BCRYPT_COST)
            .recaptcha(RecaptchaSettings {
                project_id: "planner-test".into(),
                site_key: "site-key".into(),
                api_key: "api-key".into(),
                base_url,
            })
            .build()
            .expect("test config");
        Self::with_config(config)
    }

    fn build(config: AppConfig, mailer: Arc<RecordingMailer>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone(), mailer.clone());
        let router = create_router(state.clone());
        Self {
            router,
            state,
            store,
            mailer,
        }
    }

    /// Send a request through the router and decode the JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn post_auth(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), Some(token)).await
    }

    /// Insert a user with `TEST_PASSWORD`
    pub async fn create_user(&self, email: &str, verified: bool) -> User {
        self.create_user_with_role(email, verified, Role::User).await
    }

    pub async fn create_user_with_role(&self, email: &str, verified: bool, role: Role) -> User {
        let hash = bcrypt::hash(TEST_PASSWORD, TEST_BCRYPT_COST).expect("hash");
        let mut user = NewUser::signup("Test User".to_string(), email.to_string(), hash);
        user.is_verified = verified;
        user.role = role;
        self.store.create_user(user).await.expect("create user")
    }

    /// An access token for `user`, without going through sign-in
    pub fn access_token(&self, user: &User) -> String {
        self.state
            .tokens
            .create_access_token(user.id, user.role, chrono::Utc::now())
            .expect("access token")
    }

    /// Sign in through the API and return the token object
    pub async fn sign_in(&self, email: &str) -> Value {
        let (status, body) = self
            .post("/auth/signin", serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "signin failed: {}", body);
        body["token"].clone()
    }

    /// The OTP code from the last email sent to `email`
    pub async fn last_otp(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).await.expect("no email sent");
        extract_after(&mail.html, "OTP : <strong style=\"color:#000\">")
    }
}

fn extract_after(html: &str, marker: &str) -> String {
    let start = html.find(marker).expect("marker in email") + marker.len();
    html[start..].chars().take_while(|c| *c != '<').collect()
}
