//! Request and response DTOs for the REST API.
//!
//! Wire types are kept separate from domain types so that server-owned
//! fields (owner stamps, roles, completion flags) never deserialize from
//! client payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Appointment, Profile};

// ============================================================================
// Profiles
// ============================================================================

/// Profile as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub subject_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            subject_id: p.subject_id.to_string(),
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            phone_number: p.phone_number,
            role: p.role.to_string(),
            completed: p.completed,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Contact-field update for the caller's own profile.
///
/// Email, role, and the completion flag are server-owned; any such field
/// in the payload is rejected by `deny_unknown_fields` rather than
/// silently dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Admin role-assignment request.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

// ============================================================================
// Appointments
// ============================================================================

/// Appointment creation payload.
///
/// An `owner_subject_id` in the payload is accepted for wire compatibility
/// and ignored; the owner is always the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub owner_subject_id: Option<String>,
}

/// Appointment update payload. All fields optional; absent fields keep
/// their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Admin-only reassignment; staff may set it only on appointments
    /// already assigned to them.
    pub assigned_staff_subject_id: Option<String>,
}

/// Appointment as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub owner_subject_id: String,
    pub assigned_staff_subject_id: Option<String>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            owner_subject_id: a.owner_subject_id.to_string(),
            assigned_staff_subject_id: a.assigned_staff_subject_id.map(|s| s.to_string()),
            title: a.title,
            starts_at: a.starts_at,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
