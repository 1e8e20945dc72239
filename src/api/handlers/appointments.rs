//! Appointment handlers.
//!
//! Every store access goes through the appointment gate: listings use the
//! caller's collection scope, object operations re-check ownership facts
//! after the fetch.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::api::auth_helpers::require_authenticated;
use crate::api::{access_denied, not_found, validation_error, ApiError, ErrorCode};
use crate::api::{AppointmentResponse, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::auth::gate::{admit_create, appointment_scope, authorize_appointment, AppointmentDraft};
use crate::auth::{Operation, RequestIdentity};
use crate::domain::{Appointment, Role, SubjectId};
use crate::server::AppState;

/// GET /v1/appointments
///
/// Always scoped: admins see everything, staff their assignments, clients
/// their own bookings.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let caller = require_authenticated(&identity)?;

    let scope = appointment_scope(caller).ok_or_else(access_denied)?;
    let appointments = state.appointments.list(&scope).await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// POST /v1/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    let caller = require_authenticated(&identity)?;

    if request.title.trim().is_empty() {
        return Err(validation_error("title", "title must not be empty"));
    }
    if request.starts_at <= Utc::now() {
        return Err(validation_error("starts_at", "start time must be in the future"));
    }

    // Any owner_subject_id in the payload is ignored; the gate stamps the
    // owner from the authenticated caller.
    let admitted = admit_create(
        caller,
        AppointmentDraft {
            title: request.title,
            starts_at: request.starts_at,
            notes: request.notes,
        },
    )?;

    let appointment = Appointment::create(admitted);
    state.appointments.insert(&appointment).await?;

    info!(
        appointment = %appointment.id,
        owner = %appointment.owner_subject_id,
        "appointment created"
    );

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// GET /v1/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let caller = require_authenticated(&identity)?;
    let appointment = fetch(&state, id).await?;

    if !authorize_appointment(caller, &appointment, Operation::Read).is_allowed() {
        return Err(access_denied());
    }
    Ok(Json(appointment.into()))
}

/// PATCH /v1/appointments/:id
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let caller = require_authenticated(&identity)?;
    let mut appointment = fetch(&state, id).await?;

    if !authorize_appointment(caller, &appointment, Operation::Update).is_allowed() {
        return Err(access_denied());
    }

    if let Some(staff) = request.assigned_staff_subject_id {
        // Clients never touch staff assignment, even on their own
        // appointments.
        if caller.role == Role::Client {
            return Err(access_denied());
        }
        appointment.assigned_staff_subject_id = if staff.trim().is_empty() {
            None
        } else {
            Some(SubjectId::new(staff))
        };
    }

    if let Some(title) = request.title {
        if title.trim().is_empty() {
            return Err(validation_error("title", "title must not be empty"));
        }
        appointment.title = title;
    }
    if let Some(starts_at) = request.starts_at {
        if starts_at <= Utc::now() {
            return Err(validation_error("starts_at", "start time must be in the future"));
        }
        appointment.starts_at = starts_at;
    }
    if let Some(notes) = request.notes {
        appointment.notes = Some(notes);
    }

    appointment.touch();
    state.appointments.update(&appointment).await?;
    Ok(Json(appointment.into()))
}

/// DELETE /v1/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<StatusCode, ApiError> {
    let caller = require_authenticated(&identity)?;
    let appointment = fetch(&state, id).await?;

    if !authorize_appointment(caller, &appointment, Operation::Delete).is_allowed() {
        return Err(access_denied());
    }

    state.appointments.delete(id).await?;

    info!(appointment = %id, by = %caller.subject_id, "appointment deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch(state: &AppState, id: Uuid) -> Result<Appointment, ApiError> {
    state
        .appointments
        .get(id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::AppointmentNotFound, id))
}
