//! PostgreSQL-backed appointment store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::auth::QueryScope;
use crate::domain::{Appointment, SubjectId};
use crate::infra::{AppointmentStore, Result, StoreError};

type AppointmentRow = (
    Uuid,
    String,
    Option<String>,
    String,
    DateTime<Utc>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn row_to_appointment(row: AppointmentRow) -> Appointment {
    let (id, owner, staff, title, starts_at, notes, created_at, updated_at) = row;
    Appointment {
        id,
        owner_subject_id: SubjectId::new(owner),
        assigned_staff_subject_id: staff.map(SubjectId::new),
        title,
        starts_at,
        notes,
        created_at,
        updated_at,
    }
}

const SELECT_COLUMNS: &str = "id, owner_subject_id, assigned_staff_subject_id, \
                              title, starts_at, notes, created_at, updated_at";

/// PostgreSQL appointment store.
pub struct PgAppointmentStore {
    pool: PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (id, owner_subject_id, assigned_staff_subject_id,
                                      title, starts_at, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.owner_subject_id.as_str())
        .bind(
            appointment
                .assigned_staff_subject_id
                .as_ref()
                .map(|s| s.as_str()),
        )
        .bind(&appointment.title)
        .bind(appointment.starts_at)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_appointment))
    }

    async fn list(&self, scope: &QueryScope) -> Result<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = match scope {
            QueryScope::All => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM appointments ORDER BY starts_at"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            QueryScope::AssignedToStaff(staff) => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM appointments \
                     WHERE assigned_staff_subject_id = $1 ORDER BY starts_at"
                ))
                .bind(staff.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            QueryScope::OwnedByClient(owner) => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM appointments \
                     WHERE owner_subject_id = $1 ORDER BY starts_at"
                ))
                .bind(owner.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(row_to_appointment).collect())
    }

    async fn update(&self, appointment: &Appointment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET assigned_staff_subject_id = $2, title = $3, starts_at = $4,
                notes = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(appointment.id)
        .bind(
            appointment
                .assigned_staff_subject_id
                .as_ref()
                .map(|s| s.as_str()),
        )
        .bind(&appointment.title)
        .bind(appointment.starts_at)
        .bind(&appointment.notes)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
