//! Appointment records and the ownership facts extracted from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SubjectId;

/// The fields of a resource relevant to an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipFacts {
    /// The client who booked the appointment.
    pub owner: SubjectId,
    /// The staff member assigned to it, if any.
    pub assigned_staff: Option<SubjectId>,
}

/// A booked appointment. Only the two subject fields participate in
/// authorization; the rest is payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub owner_subject_id: SubjectId,
    pub assigned_staff_subject_id: Option<SubjectId>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Materialize a record from a gate-admitted creation.
    pub fn create(admitted: NewAppointment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_subject_id: admitted.owner_subject_id,
            assigned_staff_subject_id: admitted.assigned_staff_subject_id,
            title: admitted.title,
            starts_at: admitted.starts_at,
            notes: admitted.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ownership(&self) -> OwnershipFacts {
        OwnershipFacts {
            owner: self.owner_subject_id.clone(),
            assigned_staff: self.assigned_staff_subject_id.clone(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// An admitted creation: the owner has already been stamped by the access
/// gate from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub owner_subject_id: SubjectId,
    pub assigned_staff_subject_id: Option<SubjectId>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
}
