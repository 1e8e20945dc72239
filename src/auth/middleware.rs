//! Request authentication middleware for Axum.
//!
//! Runs the full token-to-identity pipeline ahead of every handler. The
//! per-request state machine is `NoToken -> TokenPresent -> Verified ->
//! Resolved`, with a deny exit at every step past the first.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

use super::{AuthError, IdentityReconciler, TokenVerifier};
use crate::api::ApiError;
use crate::domain::Profile;

/// Resolved identity attached to request extensions.
#[derive(Debug, Clone)]
pub enum RequestIdentity {
    /// No usable `Authorization` header. Not a failure by itself;
    /// endpoints that require authentication reject separately.
    Anonymous,
    Authenticated(Profile),
}

impl RequestIdentity {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            RequestIdentity::Anonymous => None,
            RequestIdentity::Authenticated(profile) => Some(profile),
        }
    }
}

/// Authentication middleware state.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub verifier: Arc<TokenVerifier>,
    pub reconciler: Arc<IdentityReconciler>,
}

/// Authentication middleware.
///
/// Completes fully before any downstream handler logic runs; handlers see
/// either an authenticated profile or an explicit anonymous marker.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let identity = match bearer {
        None => RequestIdentity::Anonymous,
        Some(token) => {
            let claims = match state.verifier.verify(token).await {
                Ok(claims) => claims,
                Err(e) => return rejection(e),
            };
            match state.reconciler.resolve_or_create(&claims).await {
                Ok(profile) => RequestIdentity::Authenticated(profile),
                Err(e) => return rejection(e),
            }
        }
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Convert a pipeline failure into a response. The client sees a generic
/// category; the specific reason is logged only.
fn rejection(error: AuthError) -> Response {
    match &error {
        AuthError::ProfileAmbiguous(subject) => {
            error!(%subject, "profile integrity violation during authentication");
        }
        AuthError::Store(e) => {
            error!(error = %e, "store failure during authentication");
        }
        e => warn!(error = %e, "request authentication rejected"),
    }
    ApiError::from(error).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;
    use crate::auth::{JwtIdentityProvider, MockIdentityProvider, ProviderError};
    use crate::domain::SubjectId;
    use crate::infra::MemoryProfileStore;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router};
    use chrono::Duration;
    use tower::ServiceExt;

    async fn whoami(Extension(identity): Extension<RequestIdentity>) -> String {
        match identity {
            RequestIdentity::Anonymous => "anonymous".to_string(),
            RequestIdentity::Authenticated(profile) => profile.subject_id.to_string(),
        }
    }

    fn app(provider: Arc<dyn crate::auth::IdentityProvider>) -> Router {
        let profiles = Arc::new(MemoryProfileStore::default());
        let state = AuthMiddlewareState {
            verifier: Arc::new(TokenVerifier::new(provider)),
            reconciler: Arc::new(IdentityReconciler::new(profiles)),
        };
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    fn jwt_provider() -> Arc<JwtIdentityProvider> {
        Arc::new(JwtIdentityProvider::new(
            b"middleware-test-secret",
            "careconnect-identity",
            "careconnect-api",
        ))
    }

    async fn send(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let (status, body) = send(app(jwt_provider()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_anonymous() {
        let (status, body) = send(app(jwt_provider()), Some("Basic dXNlcjpwdw==")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_token_resolves_identity() {
        let provider = jwt_provider();
        let token = provider
            .issue(&SubjectId::new("u1"), Some("u1@x.com"), Duration::hours(1))
            .unwrap();

        let (status, body) = send(app(provider), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u1");
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_with_generic_category() {
        let (status, body) = send(app(jwt_provider()), Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(&ErrorCode::InvalidToken.to_string()));
        // Provider detail stays out of the response body.
        assert!(!body.to_lowercase().contains("signature"));
    }

    #[tokio::test]
    async fn test_incomplete_identity_rejected_as_client_error() {
        let provider = jwt_provider();
        let token = provider
            .issue(&SubjectId::new("u1"), None, Duration::hours(1))
            .unwrap();

        let (status, body) = send(app(provider), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains(&ErrorCode::IncompleteIdentity.to_string()));
    }

    #[tokio::test]
    async fn test_provider_unavailable_rejected() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify_id_token()
            .returning(|_| Err(ProviderError::Unavailable("upstream down".to_string())));

        let (status, _) = send(app(Arc::new(provider)), Some("Bearer token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
