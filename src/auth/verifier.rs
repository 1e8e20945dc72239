//! Bearer token verification.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::{AuthError, IdentityProvider, ProviderError, VerifiedClaims};
use crate::domain::SubjectId;

/// Tolerance applied to time-based validity checks, in seconds. Absorbs
/// clock drift between this service and the identity provider.
pub const CLOCK_SKEW_SECS: i64 = 60;

/// Validates opaque bearer tokens against the identity provider and
/// extracts verified claims.
///
/// Pure verification: no side effects beyond the provider call.
pub struct TokenVerifier {
    provider: Arc<dyn IdentityProvider>,
    skew: Duration,
}

impl TokenVerifier {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            skew: Duration::seconds(CLOCK_SKEW_SECS),
        }
    }

    /// Verify a raw bearer token. The caller must have already stripped
    /// the `Bearer ` scheme prefix.
    pub async fn verify(&self, raw_token: &str) -> Result<VerifiedClaims, AuthError> {
        self.verify_at(raw_token, Utc::now()).await
    }

    async fn verify_at(
        &self,
        raw_token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedClaims, AuthError> {
        if raw_token.trim().is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let claims = match self.provider.verify_id_token(raw_token).await {
            Ok(claims) => claims,
            Err(ProviderError::Revoked) => return Err(AuthError::TokenRevoked),
            Err(ProviderError::Rejected(reason)) => return Err(AuthError::TokenInvalid(reason)),
            // Transient provider failure; the caller may retry with the
            // same token.
            Err(ProviderError::Unavailable(reason)) => {
                return Err(AuthError::TokenInvalid(reason))
            }
        };

        let subject_id = claims
            .subject
            .filter(|s| !s.is_empty())
            .map(SubjectId::new)
            .ok_or(AuthError::TokenMissingClaim("sub"))?;

        if claims.issued_at > now + self.skew {
            return Err(AuthError::TokenInvalid(
                "token issued in the future".to_string(),
            ));
        }
        if claims.expires_at < now - self.skew {
            return Err(AuthError::TokenExpired);
        }

        Ok(VerifiedClaims {
            subject_id,
            email: claims.email,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        })
    }
}
