//! Local profile records reconciling external identities to roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, SubjectId};

/// The local record for an external identity: role plus contact data.
///
/// Exactly one profile exists per subject id. Created on the first
/// successful token verification for an unseen subject; never hard-deleted
/// by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub subject_id: SubjectId,
    /// Unique across all profiles. The identity provider is the source of
    /// truth for this value.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    /// Derived: true iff first name, last name, and phone number are all
    /// non-empty. Never settable from client input.
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A freshly provisioned profile: client role, incomplete.
    pub fn new(subject_id: SubjectId, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            subject_id,
            email: email.into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            role: Role::default(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the derived completion flag from the current contact
    /// fields.
    pub fn recompute_completed(&mut self) {
        self.completed = is_filled(&self.first_name)
            && is_filled(&self.last_name)
            && is_filled(&self.phone_number);
    }

    /// Apply a contact-field update, recomputing the completion flag.
    pub fn apply_update(&mut self, update: &ProfileUpdate) {
        if let Some(first_name) = &update.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(phone_number) = &update.phone_number {
            self.phone_number = Some(phone_number.clone());
        }
        self.recompute_completed();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Contact-field update. Email, role, and the completion flag are not
/// client-settable and are not part of this type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(SubjectId::new("u1"), "u1@example.com")
    }

    #[test]
    fn test_new_profile_is_incomplete_client() {
        let p = profile();
        assert_eq!(p.role, Role::Client);
        assert!(!p.completed);
    }

    #[test]
    fn test_completed_flips_when_last_field_fills() {
        let mut p = profile();

        p.apply_update(&ProfileUpdate {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            phone_number: None,
        });
        assert!(!p.completed);

        p.apply_update(&ProfileUpdate {
            phone_number: Some("+1 555 0100".into()),
            ..Default::default()
        });
        assert!(p.completed);
    }

    #[test]
    fn test_blank_field_does_not_complete() {
        let mut p = profile();
        p.apply_update(&ProfileUpdate {
            first_name: Some("Ada".into()),
            last_name: Some("  ".into()),
            phone_number: Some("+1 555 0100".into()),
        });
        assert!(!p.completed);
    }

    #[test]
    fn test_completed_recomputed_on_every_update() {
        let mut p = profile();
        p.apply_update(&ProfileUpdate {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            phone_number: Some("+1 555 0100".into()),
        });
        assert!(p.completed);

        // Blanking a field drops the flag again.
        p.apply_update(&ProfileUpdate {
            phone_number: Some(String::new()),
            ..Default::default()
        });
        assert!(!p.completed);
    }
}
