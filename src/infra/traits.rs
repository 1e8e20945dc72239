//! Store trait definitions.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::auth::QueryScope;
use crate::domain::{Appointment, Profile, SubjectId};

use super::Result;

/// Profile persistence.
///
/// Implementations must enforce uniqueness on subject id and email; the
/// reconciler leans on `UniqueViolation` to resolve provisioning races.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Every profile matching the subject id. More than one result is a
    /// data-integrity violation the caller must handle.
    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Profile>>;

    /// Insert a new profile. Fails with `UniqueViolation` when the subject
    /// id or email is already taken.
    async fn create(&self, profile: &Profile) -> Result<()>;

    /// Persist updated fields for an existing profile.
    async fn update(&self, profile: &Profile) -> Result<()>;

    /// All profiles, newest first.
    async fn list(&self) -> Result<Vec<Profile>>;
}

/// Appointment persistence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>>;

    /// Appointments visible under the caller's query scope, soonest first.
    async fn list(&self, scope: &QueryScope) -> Result<Vec<Appointment>>;

    async fn update(&self, appointment: &Appointment) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
