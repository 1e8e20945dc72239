//! CareConnect Core
//!
//! Identity and authorization core for a role-based appointment booking
//! service: bearer tokens are verified against an external identity
//! provider, reconciled to local profiles, and every data access runs
//! through a role- and ownership-aware authorizer.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (profiles, roles, appointments)
//! - [`auth`] - The token-to-identity pipeline and the authorizer
//! - [`infra`] - Store traits plus PostgreSQL and in-memory implementations
//! - [`api`] - REST API routes, DTOs, and the error taxonomy
//! - [`server`] - Configuration and HTTP server bootstrap

pub mod api;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod server;

// Re-export commonly used types
pub use domain::{Appointment, NewAppointment, OwnershipFacts, Profile, Role, SubjectId};

pub use auth::{
    authorize, collection_scope, AuthError, Decision, IdentityReconciler, Operation, QueryScope,
    RequestIdentity, TokenVerifier, VerifiedClaims,
};

pub use infra::{AppointmentStore, ProfileStore, Result, StoreError};
