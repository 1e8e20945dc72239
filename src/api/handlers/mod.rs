//! REST API request handlers.

pub mod appointments;
pub mod health;
pub mod profiles;
