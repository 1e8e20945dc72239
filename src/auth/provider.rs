//! External identity provider verification primitive.
//!
//! The provider is authoritative for token signature, format, audience,
//! and revocation. Time-based validity is the verifier's contract (see
//! [`super::TokenVerifier`]), so the JWT implementation here leaves
//! expiry checks to its caller.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;

use crate::domain::SubjectId;

/// Claims bundle the provider asserts for an accepted token.
#[derive(Debug, Clone)]
pub struct ProviderClaims {
    /// Raw subject claim; the verifier enforces presence.
    pub subject: Option<String>,
    pub email: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Rejection reasons from the provider primitive.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Signature or format rejected.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// The provider reports the token as revoked.
    #[error("token revoked")]
    Revoked,

    /// Transient provider failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Identity provider verification primitive.
///
/// Constructed once at startup and injected; nothing initializes a
/// provider client lazily inside request handlers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_id_token(&self, token: &str) -> Result<ProviderClaims, ProviderError>;
}

/// JWT claims carried by provider-issued identity tokens.
#[derive(Debug, Serialize, Deserialize)]
struct IdClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,

    iss: String,

    aud: String,

    /// Expiration time (Unix timestamp).
    exp: i64,

    /// Issued at (Unix timestamp).
    iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// HMAC-validated identity provider with configurable issuer/audience.
///
/// Also issues tokens for the admin CLI and tests, and keeps an in-memory
/// revocation set per subject. A production deployment would back the
/// revocation set with the provider's own revocation API.
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    revoked_subjects: RwLock<HashSet<String>>,
}

impl JwtIdentityProvider {
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            revoked_subjects: RwLock::new(HashSet::new()),
        }
    }

    /// Issue an identity token for a subject.
    ///
    /// `ttl` may be negative to produce an already-expired token in tests.
    pub fn issue(
        &self,
        subject: &SubjectId,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, ProviderError> {
        let now = Utc::now();
        let claims = IdClaims {
            sub: Some(subject.as_str().to_string()),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            email: email.map(str::to_string),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ProviderError::Rejected(e.to_string()))
    }

    /// Mark every outstanding token for a subject as revoked.
    pub fn revoke_subject(&self, subject: &SubjectId) {
        self.revoked_subjects
            .write()
            .unwrap()
            .insert(subject.as_str().to_string());
    }

    fn decode_claims(&self, token: &str) -> Result<IdClaims, ProviderError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        // Expiry is the verifier's contract, checked against its own skew
        // window rather than the JWT library's leeway.
        validation.validate_exp = false;

        decode::<IdClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ProviderError::Rejected(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_id_token(&self, token: &str) -> Result<ProviderClaims, ProviderError> {
        let claims = self.decode_claims(token)?;

        if let Some(sub) = &claims.sub {
            if self.revoked_subjects.read().unwrap().contains(sub) {
                return Err(ProviderError::Revoked);
            }
        }

        let issued_at = Utc
            .timestamp_opt(claims.iat, 0)
            .single()
            .ok_or_else(|| ProviderError::Rejected("invalid iat claim".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| ProviderError::Rejected("invalid exp claim".to_string()))?;

        Ok(ProviderClaims {
            subject: claims.sub,
            email: claims.email,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new(
            b"test-secret-key-for-testing-only",
            "careconnect-identity",
            "careconnect-api",
        )
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let provider = provider();
        let subject = SubjectId::new("u1");

        let token = provider
            .issue(&subject, Some("u1@example.com"), Duration::hours(1))
            .unwrap();
        let claims = provider.verify_id_token(&token).await.unwrap();

        assert_eq!(claims.subject.as_deref(), Some("u1"));
        assert_eq!(claims.email.as_deref(), Some("u1@example.com"));
        assert!(claims.expires_at > claims.issued_at);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let provider = provider();
        let result = provider.verify_id_token("not-a-token").await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let provider = provider();
        let other = JwtIdentityProvider::new(
            b"test-secret-key-for-testing-only",
            "careconnect-identity",
            "someone-else",
        );
        let token = other
            .issue(&SubjectId::new("u1"), None, Duration::hours(1))
            .unwrap();

        let result = provider.verify_id_token(&token).await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_revoked_subject() {
        let provider = provider();
        let subject = SubjectId::new("u1");
        let token = provider.issue(&subject, None, Duration::hours(1)).unwrap();

        provider.revoke_subject(&subject);

        let result = provider.verify_id_token(&token).await;
        assert!(matches!(result, Err(ProviderError::Revoked)));
    }

    #[tokio::test]
    async fn test_expired_token_still_decodes() {
        // Expiry is not the provider's contract; the verifier owns it.
        let provider = provider();
        let token = provider
            .issue(&SubjectId::new("u1"), None, Duration::seconds(-3600))
            .unwrap();

        assert!(provider.verify_id_token(&token).await.is_ok());
    }
}
