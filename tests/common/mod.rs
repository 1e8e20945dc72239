//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use careconnect::auth::{
    AuthMiddlewareState, IdentityReconciler, JwtIdentityProvider, TokenVerifier,
};
use careconnect::domain::{Role, SubjectId};
use careconnect::infra::{MemoryAppointmentStore, MemoryProfileStore, ProfileStore};
use careconnect::server::{build_router, AppState};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const TEST_ISSUER: &str = "careconnect-identity";
pub const TEST_AUDIENCE: &str = "careconnect-api";

/// The full application wired against in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<JwtIdentityProvider>,
    pub profiles: Arc<MemoryProfileStore>,
    pub appointments: Arc<MemoryAppointmentStore>,
}

/// Build the production route table against in-memory stores.
pub fn test_app() -> TestApp {
    let provider = Arc::new(JwtIdentityProvider::new(
        TEST_SECRET,
        TEST_ISSUER,
        TEST_AUDIENCE,
    ));
    let profiles = Arc::new(MemoryProfileStore::default());
    let appointments = Arc::new(MemoryAppointmentStore::default());

    let auth_state = AuthMiddlewareState {
        verifier: Arc::new(TokenVerifier::new(provider.clone())),
        reconciler: Arc::new(IdentityReconciler::new(profiles.clone())),
    };

    let state = AppState {
        profiles: profiles.clone(),
        appointments: appointments.clone(),
    };

    let router = build_router(auth_state)
        .expect("router builds")
        .with_state(state);

    TestApp {
        router,
        provider,
        profiles,
        appointments,
    }
}

impl TestApp {
    /// Issue a one-hour token for a subject with an email claim.
    pub fn token(&self, subject: &str) -> String {
        self.provider
            .issue(
                &SubjectId::new(subject),
                Some(&format!("{subject}@example.com")),
                Duration::hours(1),
            )
            .expect("token issues")
    }

    /// Issue a token with explicit email and ttl.
    pub fn token_with(&self, subject: &str, email: Option<&str>, ttl: Duration) -> String {
        self.provider
            .issue(&SubjectId::new(subject), email, ttl)
            .expect("token issues")
    }

    /// Provision a profile by authenticating once, then assign a role
    /// directly in the store. Returns a fresh token for the subject.
    pub async fn subject_with_role(&self, subject: &str, role: Role) -> String {
        let token = self.token(subject);
        let (status, _) = self
            .send(Method::GET, "/api/v1/profiles/me", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK, "provisioning {subject} failed");

        let id = SubjectId::new(subject);
        let mut profile = self
            .profiles
            .find_by_subject(&id)
            .await
            .expect("store lookup")
            .pop()
            .expect("profile provisioned");
        profile.role = role;
        self.profiles.update(&profile).await.expect("store update");
        token
    }

    /// Send a request through the router and collect the response.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }
}

/// Extract the error code string from an error response body.
pub fn error_code(body: &serde_json::Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}
