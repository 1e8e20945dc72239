//! Infrastructure implementations: store traits, PostgreSQL and in-memory
//! stores, and the store error taxonomy.

mod error;
mod memory;
mod postgres;
mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryAppointmentStore, MemoryProfileStore};
pub use postgres::{PgAppointmentStore, PgProfileStore};
pub use traits::*;
