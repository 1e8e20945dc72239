//! In-memory store implementations.
//!
//! Used by the test suite and local development. They enforce the same
//! unique constraints as the Postgres stores so the reconciler's race
//! handling behaves identically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::auth::QueryScope;
use crate::domain::{Appointment, Profile, SubjectId};

use super::{AppointmentStore, ProfileStore, Result, StoreError};

/// In-memory profile store.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<Vec<Profile>>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Profile>> {
        let profiles = self.profiles.read().unwrap();
        Ok(profiles
            .iter()
            .filter(|p| &p.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn create(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self.profiles.write().unwrap();
        if profiles.iter().any(|p| p.subject_id == profile.subject_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "profiles_subject_id_key".to_string(),
            });
        }
        if profiles.iter().any(|p| p.email == profile.email) {
            return Err(StoreError::UniqueViolation {
                constraint: "profiles_email_key".to_string(),
            });
        }
        profiles.push(profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self.profiles.write().unwrap();
        if profiles
            .iter()
            .any(|p| p.email == profile.email && p.subject_id != profile.subject_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "profiles_email_key".to_string(),
            });
        }
        match profiles
            .iter_mut()
            .find(|p| p.subject_id == profile.subject_id)
        {
            Some(existing) => {
                *existing = profile.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list(&self) -> Result<Vec<Profile>> {
        let mut profiles = self.profiles.read().unwrap().clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }
}

/// In-memory appointment store.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        let mut appointments = self.appointments.write().unwrap();
        if appointments.contains_key(&appointment.id) {
            return Err(StoreError::UniqueViolation {
                constraint: "appointments_pkey".to_string(),
            });
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(self.appointments.read().unwrap().get(&id).cloned())
    }

    async fn list(&self, scope: &QueryScope) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().unwrap();
        let mut visible: Vec<Appointment> = appointments
            .values()
            .filter(|a| match scope {
                QueryScope::All => true,
                QueryScope::AssignedToStaff(staff) => {
                    a.assigned_staff_subject_id.as_ref() == Some(staff)
                }
                QueryScope::OwnedByClient(owner) => &a.owner_subject_id == owner,
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(visible)
    }

    async fn update(&self, appointment: &Appointment) -> Result<()> {
        let mut appointments = self.appointments.write().unwrap();
        match appointments.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        match self.appointments.write().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}
