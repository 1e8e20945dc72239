//! Identity reconciliation: verified claims to a local profile.

use std::sync::Arc;
use tracing::{debug, info};

use super::{AuthError, VerifiedClaims};
use crate::domain::Profile;
use crate::infra::{ProfileStore, StoreError};

/// Maps a verified subject to its local profile record, provisioning one
/// on first sight and keeping provider-asserted facts in sync.
///
/// Runs as an explicit, synchronous step of the authentication pipeline;
/// profile creation happens nowhere else.
pub struct IdentityReconciler {
    profiles: Arc<dyn ProfileStore>,
}

impl IdentityReconciler {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Resolve claims to exactly one profile.
    ///
    /// Idempotent: a concurrent first request for the same subject resolves
    /// through the unique-constraint re-fetch instead of failing.
    pub async fn resolve_or_create(&self, claims: &VerifiedClaims) -> Result<Profile, AuthError> {
        match self.lookup(claims).await? {
            Some(profile) => self.reconcile(profile, claims).await,
            None => self.provision(claims).await,
        }
    }

    async fn lookup(&self, claims: &VerifiedClaims) -> Result<Option<Profile>, AuthError> {
        let mut matches = self.profiles.find_by_subject(&claims.subject_id).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            // The store enforces uniqueness, but it is not trusted for
            // this invariant.
            _ => Err(AuthError::ProfileAmbiguous(claims.subject_id.clone())),
        }
    }

    async fn provision(&self, claims: &VerifiedClaims) -> Result<Profile, AuthError> {
        let email = provider_email(claims).ok_or_else(|| {
            AuthError::IdentityIncomplete(
                "provider supplied no email for a new subject".to_string(),
            )
        })?;

        let profile = Profile::new(claims.subject_id.clone(), email);
        match self.profiles.create(&profile).await {
            Ok(()) => {
                info!(subject = %claims.subject_id, "provisioned profile for new subject");
                Ok(profile)
            }
            // Lost a provisioning race; the winner's row is authoritative.
            Err(StoreError::UniqueViolation { constraint }) => {
                debug!(
                    subject = %claims.subject_id,
                    %constraint,
                    "profile create hit a unique constraint, re-fetching"
                );
                self.lookup(claims).await?.ok_or_else(|| {
                    AuthError::IdentityIncomplete(
                        "email already associated with another subject".to_string(),
                    )
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reconcile(
        &self,
        mut profile: Profile,
        claims: &VerifiedClaims,
    ) -> Result<Profile, AuthError> {
        // The provider is the source of truth for email when it asserts
        // one; a silent provider leaves the stored value alone.
        if let Some(email) = provider_email(claims) {
            if profile.email != email {
                profile.email = email.to_string();
                profile.recompute_completed();
                profile.touch();
                self.profiles.update(&profile).await?;
            }
        }
        Ok(profile)
    }
}

fn provider_email(claims: &VerifiedClaims) -> Option<&str> {
    claims
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, SubjectId};
    use crate::infra::{MemoryProfileStore, MockProfileStore};
    use chrono::{Duration, Utc};

    fn claims(subject: &str, email: Option<&str>) -> VerifiedClaims {
        let now = Utc::now();
        VerifiedClaims {
            subject_id: SubjectId::new(subject),
            email: email.map(str::to_string),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    fn reconciler() -> (IdentityReconciler, Arc<MemoryProfileStore>) {
        let store = Arc::new(MemoryProfileStore::default());
        (IdentityReconciler::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_unseen_subject_provisions_client_profile() {
        let (reconciler, store) = reconciler();

        let profile = reconciler
            .resolve_or_create(&claims("u1", Some("a@x.com")))
            .await
            .unwrap();

        assert_eq!(profile.subject_id, SubjectId::new("u1"));
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.role, Role::Client);
        assert!(!profile.completed);
        assert_eq!(store.find_by_subject(&SubjectId::new("u1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_idempotent_resolution() {
        let (reconciler, store) = reconciler();
        let c = claims("u1", Some("a@x.com"));

        let first = reconciler.resolve_or_create(&c).await.unwrap();
        let second = reconciler.resolve_or_create(&c).await.unwrap();

        assert_eq!(first.subject_id, second.subject_id);
        assert_eq!(store.find_by_subject(&SubjectId::new("u1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_email_never_creates_placeholder() {
        let (reconciler, store) = reconciler();

        let result = reconciler.resolve_or_create(&claims("u1", None)).await;
        assert!(matches!(result, Err(AuthError::IdentityIncomplete(_))));

        let blank = reconciler.resolve_or_create(&claims("u1", Some("  "))).await;
        assert!(matches!(blank, Err(AuthError::IdentityIncomplete(_))));

        assert!(store.find_by_subject(&SubjectId::new("u1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_reconciled_to_provider_value() {
        let (reconciler, store) = reconciler();

        reconciler
            .resolve_or_create(&claims("u1", Some("old@x.com")))
            .await
            .unwrap();
        let updated = reconciler
            .resolve_or_create(&claims("u1", Some("new@x.com")))
            .await
            .unwrap();

        assert_eq!(updated.email, "new@x.com");
        let stored = store.find_by_subject(&SubjectId::new("u1")).await.unwrap();
        assert_eq!(stored[0].email, "new@x.com");
    }

    #[tokio::test]
    async fn test_silent_provider_keeps_stored_email() {
        let (reconciler, _) = reconciler();

        reconciler
            .resolve_or_create(&claims("u1", Some("a@x.com")))
            .await
            .unwrap();
        let resolved = reconciler.resolve_or_create(&claims("u1", None)).await.unwrap();

        assert_eq!(resolved.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_creation_race_resolves_to_winner() {
        let mut store = MockProfileStore::new();
        let mut seq = mockall::Sequence::new();

        let winner = Profile::new(SubjectId::new("u1"), "a@x.com");
        let winner_clone = winner.clone();

        store
            .expect_find_by_subject()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        store
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(StoreError::UniqueViolation {
                    constraint: "profiles_subject_id_key".to_string(),
                })
            });
        store
            .expect_find_by_subject()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(vec![winner_clone.clone()]));

        let reconciler = IdentityReconciler::new(Arc::new(store));
        let resolved = reconciler
            .resolve_or_create(&claims("u1", Some("a@x.com")))
            .await
            .unwrap();

        assert_eq!(resolved.subject_id, winner.subject_id);
    }

    #[tokio::test]
    async fn test_email_conflict_without_subject_row_is_client_attributable() {
        let mut store = MockProfileStore::new();
        store.expect_find_by_subject().returning(|_| Ok(Vec::new()));
        store.expect_create().returning(|_| {
            Err(StoreError::UniqueViolation {
                constraint: "profiles_email_key".to_string(),
            })
        });

        let reconciler = IdentityReconciler::new(Arc::new(store));
        let result = reconciler
            .resolve_or_create(&claims("u1", Some("taken@x.com")))
            .await;

        assert!(matches!(result, Err(AuthError::IdentityIncomplete(_))));
    }

    #[tokio::test]
    async fn test_ambiguous_profile_rejected() {
        let mut store = MockProfileStore::new();
        store.expect_find_by_subject().returning(|_| {
            Ok(vec![
                Profile::new(SubjectId::new("u1"), "a@x.com"),
                Profile::new(SubjectId::new("u1"), "b@x.com"),
            ])
        });

        let reconciler = IdentityReconciler::new(Arc::new(store));
        let result = reconciler
            .resolve_or_create(&claims("u1", Some("a@x.com")))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileAmbiguous(_))));
    }
}
