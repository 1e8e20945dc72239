//! PostgreSQL-backed profile store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use crate::domain::{Profile, Role, SubjectId};
use crate::infra::{ProfileStore, Result, StoreError};

type ProfileRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn row_to_profile(row: ProfileRow) -> Profile {
    let (subject_id, email, first_name, last_name, phone_number, role, completed, created_at, updated_at) =
        row;
    Profile {
        subject_id: SubjectId::new(subject_id),
        email,
        first_name,
        last_name,
        phone_number,
        // Unrecognized stored roles come back as Unknown and authorize
        // nothing.
        role: Role::parse(&role),
        completed,
        created_at,
        updated_at,
    }
}

/// PostgreSQL profile store.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT subject_id, email, first_name, last_name, phone_number,
                   role, completed, created_at, updated_at
            FROM profiles
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn create(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (subject_id, email, first_name, last_name,
                                  phone_number, role, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(profile.subject_id.as_str())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone_number)
        .bind(profile.role.as_str())
        .bind(profile.completed)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET email = $2, first_name = $3, last_name = $4, phone_number = $5,
                role = $6, completed = $7, updated_at = $8
            WHERE subject_id = $1
            "#,
        )
        .bind(profile.subject_id.as_str())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone_number)
        .bind(profile.role.as_str())
        .bind(profile.completed)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT subject_id, email, first_name, last_name, phone_number,
                   role, completed, created_at, updated_at
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_profile).collect())
    }
}
