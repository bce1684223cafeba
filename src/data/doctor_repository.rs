use crate::domain::models::Doctor;
use crate::domain::repository::DoctorRepository;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct SqliteDoctorRepository {
    pool: SqlitePool,
}

impl SqliteDoctorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn doctor_from_row(row: &SqliteRow) -> Result<Doctor> {
    Ok(Doctor {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        specialty: row.try_get("specialty")?,
    })
}

#[async_trait]
impl DoctorRepository for SqliteDoctorRepository {
    #[instrument(skip(self), fields(user_id = user_id, name = name))]
    async fn create_doctor(&self, user_id: i64, name: &str, specialty: &str) -> Result<i64> {
        trace!("Inserting doctor row");
        let result = sqlx::query("INSERT INTO doctors (user_id, name, specialty) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(specialty)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(doctor_id = id, user_id = user_id, "Doctor row inserted");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        trace!("Listing doctors");
        let rows = sqlx::query("SELECT id, user_id, name, specialty FROM doctors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(doctor_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    async fn find_doctor_by_user_id(&self, user_id: i64) -> Result<Option<Doctor>> {
        trace!("Looking up doctor by owning user");
        let row = sqlx::query("SELECT id, user_id, name, specialty FROM doctors WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(doctor_from_row).transpose()
    }

    #[instrument(skip(self), fields(doctor_id = id))]
    async fn delete_doctor(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(
            doctor_id = id,
            rows = result.rows_affected(),
            "Doctor delete executed"
        );
        Ok(())
    }
}
