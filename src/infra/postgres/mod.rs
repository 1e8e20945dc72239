//! PostgreSQL store implementations.

mod appointment_store;
mod profile_store;

pub use appointment_store::PgAppointmentStore;
pub use profile_store::PgProfileStore;
