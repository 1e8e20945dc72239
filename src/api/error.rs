//! Structured API error responses with error codes.
//!
//! Consistent error handling across all endpoints with machine-readable
//! error codes and human-readable messages. Authentication failures carry
//! a generic category only; the specific reason is logged at the
//! middleware boundary, never returned to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::infra::StoreError;

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic
/// error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    /// No authentication credentials provided
    AuthRequired,
    /// Token signature or format rejected
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Token has been revoked
    TokenRevoked,
    /// Token lacks a required claim
    MissingTokenClaim,
    /// Upstream identity lacks data required to provision a profile
    IncompleteIdentity,
    /// Role/ownership mismatch for this operation
    AccessDenied,

    // Validation errors (2xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Field value is invalid
    InvalidFieldValue,

    // Resource errors (3xxx)
    /// Requested resource not found
    ResourceNotFound,
    /// Profile not found
    ProfileNotFound,
    /// Appointment not found
    AppointmentNotFound,

    // Conflict errors (4xxx)
    /// Email already associated with another profile
    EmailInUse,

    // Integrity errors (5xxx)
    /// Invariant violation in stored data
    IntegrityViolation,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            // Auth (1xxx)
            ErrorCode::AuthRequired => 1001,
            ErrorCode::InvalidToken => 1002,
            ErrorCode::TokenExpired => 1003,
            ErrorCode::TokenRevoked => 1004,
            ErrorCode::MissingTokenClaim => 1005,
            ErrorCode::IncompleteIdentity => 1006,
            ErrorCode::AccessDenied => 1007,

            // Validation (2xxx)
            ErrorCode::InvalidRequestBody => 2001,
            ErrorCode::InvalidFieldValue => 2002,

            // Resource (3xxx)
            ErrorCode::ResourceNotFound => 3001,
            ErrorCode::ProfileNotFound => 3002,
            ErrorCode::AppointmentNotFound => 3003,

            // Conflict (4xxx)
            ErrorCode::EmailInUse => 4001,

            // Integrity (5xxx)
            ErrorCode::IntegrityViolation => 5001,

            // Infrastructure (8xxx)
            ErrorCode::DatabaseError => 8001,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Auth errors -> 401/403
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ErrorCode::TokenRevoked => StatusCode::UNAUTHORIZED,
            ErrorCode::MissingTokenClaim => StatusCode::UNAUTHORIZED,
            ErrorCode::IncompleteIdentity => StatusCode::FORBIDDEN,
            ErrorCode::AccessDenied => StatusCode::FORBIDDEN,

            // Validation -> 400
            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,

            // Resource -> 404
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AppointmentNotFound => StatusCode::NOT_FOUND,

            // Conflict -> 409
            ErrorCode::EmailInUse => StatusCode::CONFLICT,

            // Integrity -> 500 (operator-facing, not client-attributable)
            ErrorCode::IntegrityViolation => StatusCode::INTERNAL_SERVER_ERROR,

            // Infrastructure -> 500
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::TokenRevoked => "TOKEN_REVOKED",
            ErrorCode::MissingTokenClaim => "MISSING_TOKEN_CLAIM",
            ErrorCode::IncompleteIdentity => "INCOMPLETE_IDENTITY",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::ProfileNotFound => "PROFILE_NOT_FOUND",
            ErrorCode::AppointmentNotFound => "APPOINTMENT_NOT_FOUND",
            ErrorCode::EmailInUse => "EMAIL_IN_USE",
            ErrorCode::IntegrityViolation => "INTEGRITY_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Related resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
                resource_id: None,
            },
        }
    }

    /// Set additional details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Set related resource ID
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.error.resource_id = Some(id.into());
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Add error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenMissing => {
                ApiError::new(ErrorCode::AuthRequired, "Authentication required")
            }
            // Generic category only; the detailed reason is logged at the
            // middleware boundary.
            AuthError::TokenInvalid(_) => ApiError::new(ErrorCode::InvalidToken, "Invalid token"),
            AuthError::TokenExpired => ApiError::new(ErrorCode::TokenExpired, "Token expired"),
            AuthError::TokenRevoked => ApiError::new(ErrorCode::TokenRevoked, "Token revoked"),
            AuthError::TokenMissingClaim(_) => {
                ApiError::new(ErrorCode::MissingTokenClaim, "Invalid token")
            }
            AuthError::IdentityIncomplete(reason) => {
                ApiError::new(ErrorCode::IncompleteIdentity, reason)
            }
            AuthError::ProfileAmbiguous(_) => {
                ApiError::new(ErrorCode::IntegrityViolation, "Internal integrity error")
            }
            AuthError::AccessDenied => ApiError::new(ErrorCode::AccessDenied, "Access denied"),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(_) | StoreError::Internal(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database error")
            }
            StoreError::UniqueViolation { constraint } => {
                if constraint.contains("email") {
                    ApiError::new(ErrorCode::EmailInUse, "Email already in use")
                } else {
                    ApiError::new(ErrorCode::InternalError, "Conflicting write")
                }
            }
            StoreError::NotFound => ApiError::new(ErrorCode::ResourceNotFound, "Not found"),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an access-denied error. Deliberately free of resource detail.
pub fn access_denied() -> ApiError {
    ApiError::new(ErrorCode::AccessDenied, "Access denied")
}

/// Create a validation error with field details
pub fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidFieldValue, message.into())
        .with_details(serde_json::json!({ "field": field }))
}

/// Create a not found error for a specific resource type
pub fn not_found(code: ErrorCode, id: impl std::fmt::Display) -> ApiError {
    ApiError::new(code, "Not found").with_resource_id(id.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::AuthRequired.numeric_code(), 1001);
        assert_eq!(ErrorCode::AccessDenied.numeric_code(), 1007);
        assert_eq!(ErrorCode::InvalidRequestBody.numeric_code(), 2001);
        assert_eq!(ErrorCode::AppointmentNotFound.numeric_code(), 3003);
        assert_eq!(ErrorCode::EmailInUse.numeric_code(), 4001);
        assert_eq!(ErrorCode::IntegrityViolation.numeric_code(), 5001);
        assert_eq!(ErrorCode::InternalError.numeric_code(), 8999);
    }

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::IncompleteIdentity.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::AccessDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::IntegrityViolation.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::EmailInUse.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_error_conversion_hides_detail() {
        let api: ApiError = AuthError::TokenInvalid(
            "signature verification failed at kid=abc".to_string(),
        )
        .into();
        assert_eq!(api.error.code, ErrorCode::InvalidToken);
        assert!(!api.error.message.contains("signature"));
    }

    #[test]
    fn test_ambiguous_profile_is_internal() {
        let api: ApiError =
            AuthError::ProfileAmbiguous(crate::domain::SubjectId::new("u1")).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // No subject id leaks into the message.
        assert!(!api.error.message.contains("u1"));
    }

    #[test]
    fn test_email_unique_violation_maps_to_conflict() {
        let api: ApiError = StoreError::UniqueViolation {
            constraint: "profiles_email_key".to_string(),
        }
        .into();
        assert_eq!(api.error.code, ErrorCode::EmailInUse);
    }

    #[test]
    fn test_error_serialization() {
        let error = ApiError::new(ErrorCode::AppointmentNotFound, "Not found");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("APPOINTMENT_NOT_FOUND"));
        assert!(json.contains("3003"));
    }
}
