//! Profile handlers: self-service contact updates and admin role
//! assignment.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::info;

use crate::api::auth_helpers::{require_admin, require_authenticated};
use crate::api::{not_found, validation_error, ApiError, ErrorCode};
use crate::api::{ProfileResponse, SetRoleRequest, UpdateProfileRequest};
use crate::auth::RequestIdentity;
use crate::domain::{ProfileUpdate, Role, SubjectId};
use crate::server::AppState;

/// GET /v1/profiles/me
pub async fn get_my_profile(
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = require_authenticated(&identity)?;
    Ok(Json(profile.clone().into()))
}

/// PATCH /v1/profiles/me
///
/// Updates the caller's contact fields only. The completion flag is
/// recomputed server-side on every update.
pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let caller = require_authenticated(&identity)?;

    if let Some(phone) = &request.phone_number {
        validate_phone(phone)?;
    }

    let mut profile = caller.clone();
    profile.apply_update(&ProfileUpdate {
        first_name: request.first_name,
        last_name: request.last_name,
        phone_number: request.phone_number,
    });

    state.profiles.update(&profile).await?;
    Ok(Json(profile.into()))
}

/// GET /v1/profiles (admin only)
pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    require_admin(&identity)?;
    let profiles = state.profiles.list().await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

/// PUT /v1/profiles/:subject_id/role (admin only)
pub async fn set_role(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let admin = require_admin(&identity)?;

    let role = Role::parse(&request.role);
    if matches!(role, Role::Unknown(_)) {
        return Err(validation_error(
            "role",
            format!("unknown role: {}", request.role),
        ));
    }

    let subject = SubjectId::new(subject_id);
    let mut matches = state.profiles.find_by_subject(&subject).await?;
    let mut profile = match matches.len() {
        0 => return Err(not_found(ErrorCode::ProfileNotFound, &subject)),
        1 => matches.remove(0),
        _ => {
            return Err(ApiError::new(
                ErrorCode::IntegrityViolation,
                "Internal integrity error",
            ))
        }
    };

    profile.role = role;
    profile.touch();
    state.profiles.update(&profile).await?;

    info!(
        subject = %profile.subject_id,
        role = %profile.role,
        by = %admin.subject_id,
        "role assigned"
    );

    Ok(Json(profile.into()))
}

fn validate_phone(phone: &str) -> Result<(), ApiError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'));
    if digits < 7 || !valid_chars {
        return Err(validation_error("phone_number", "invalid phone number"));
    }
    Ok(())
}
