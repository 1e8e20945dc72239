//! Access gate between resolved identities and the appointment store.
//!
//! Handlers never call the authorizer directly for appointments; every
//! collection query and object mutation goes through these functions.

use chrono::{DateTime, Utc};

use super::{authorize, collection_scope, AuthError, Decision, Operation, QueryScope};
use crate::domain::{Appointment, NewAppointment, Profile};

/// Caller-supplied appointment draft. Any owner field the client put in
/// the wire payload has already been dropped by the request DTO.
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Listing scope for the caller. `None` means no access at all.
pub fn appointment_scope(caller: &Profile) -> Option<QueryScope> {
    collection_scope(&caller.role, &caller.subject_id)
}

/// Authorize an object-level operation on an existing appointment.
pub fn authorize_appointment(
    caller: &Profile,
    appointment: &Appointment,
    operation: Operation,
) -> Decision {
    authorize(
        &caller.role,
        &caller.subject_id,
        operation,
        Some(&appointment.ownership()),
    )
}

/// Admit a creation request.
///
/// Only clients create, and the owner is stamped from the caller
/// unconditionally: a client cannot create an appointment on another
/// client's behalf. Staff assignment happens later, by an admin.
pub fn admit_create(caller: &Profile, draft: AppointmentDraft) -> Result<NewAppointment, AuthError> {
    if !authorize(&caller.role, &caller.subject_id, Operation::Create, None).is_allowed() {
        return Err(AuthError::AccessDenied);
    }

    Ok(NewAppointment {
        owner_subject_id: caller.subject_id.clone(),
        assigned_staff_subject_id: None,
        title: draft.title,
        starts_at: draft.starts_at,
        notes: draft.notes,
    })
}
