//! HTTP API surface: DTOs, error responses, and route handlers.

pub mod auth_helpers;
mod error;
pub mod handlers;
mod rest;
mod types;

pub use error::{access_denied, not_found, validation_error, ApiError, ErrorCode, ErrorDetails};
pub use rest::router;
pub use types::*;
