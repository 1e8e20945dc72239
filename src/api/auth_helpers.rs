//! Handler-side authentication requirements.

use crate::api::{access_denied, ApiError, ErrorCode};
use crate::auth::RequestIdentity;
use crate::domain::{Profile, Role};

/// Require an authenticated caller, rejecting anonymous requests.
pub fn require_authenticated(identity: &RequestIdentity) -> Result<&Profile, ApiError> {
    identity
        .profile()
        .ok_or_else(|| ApiError::new(ErrorCode::AuthRequired, "Authentication required"))
}

/// Require an authenticated admin caller.
pub fn require_admin(identity: &RequestIdentity) -> Result<&Profile, ApiError> {
    let profile = require_authenticated(identity)?;
    if profile.role != Role::Admin {
        return Err(access_denied());
    }
    Ok(profile)
}
