//! Core domain types for the booking gateway.

mod appointment;
mod profile;
mod types;

pub use appointment::*;
pub use profile::*;
pub use types::*;
