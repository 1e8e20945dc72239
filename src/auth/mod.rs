//! Token-to-identity resolution and role-based authorization.
//!
//! Every inbound request runs the same pipeline before any handler logic:
//!
//! 1. [`auth_middleware`] pulls the bearer token from the `Authorization`
//!    header (absence is not itself a failure; the request proceeds
//!    anonymous).
//! 2. [`TokenVerifier`] checks the token against the external identity
//!    provider and the clock-skew window.
//! 3. [`IdentityReconciler`] exchanges verified claims for a local
//!    [`Profile`](crate::domain::Profile), provisioning one on first sight.
//! 4. Handlers consult [`authorize`] and the [`gate`] functions for every
//!    data-access decision.
//!
//! # Configuration
//!
//! - `AUTH_TOKEN_SECRET`: HMAC secret for identity-token validation
//! - `AUTH_TOKEN_ISSUER` / `AUTH_TOKEN_AUDIENCE`: expected token claims

mod authorizer;
pub mod gate;
mod middleware;
mod provider;
mod reconciler;
mod verifier;

pub use authorizer::*;
pub use middleware::*;
pub use provider::*;
pub use reconciler::*;
pub use verifier::*;

use chrono::{DateTime, Utc};

use crate::domain::SubjectId;

/// Structured facts extracted from a token the provider accepted.
#[derive(Debug, Clone)]
pub struct VerifiedClaims {
    pub subject_id: SubjectId,

    /// May be absent on first resolution; the reconciler decides whether
    /// that is fatal.
    pub email: Option<String>,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

/// Authentication and authorization failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer token. Often non-fatal: the request proceeds
    /// anonymous and endpoints demand authentication themselves.
    #[error("missing bearer token")]
    TokenMissing,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token revoked")]
    TokenRevoked,

    #[error("token missing required claim: {0}")]
    TokenMissingClaim(&'static str),

    /// The upstream identity lacks data required to provision a profile.
    #[error("identity incomplete: {0}")]
    IdentityIncomplete(String),

    /// More than one profile matched a single subject id. Data-integrity
    /// violation, surfaced to operators as an internal error.
    #[error("ambiguous profile for subject {0}")]
    ProfileAmbiguous(SubjectId),

    /// Role/ownership mismatch.
    #[error("access denied")]
    AccessDenied,

    #[error("profile store error: {0}")]
    Store(#[from] crate::infra::StoreError),
}
