use crate::domain::models::{NewPatient, Patient, PatientRecord};
use crate::domain::repository::PatientRepository;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
}

impl SqlitePatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<PatientRecord> {
    Ok(PatientRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        address: row.try_get("address")?,
        doctor_name: row.try_get("doctor_name")?,
    })
}

#[async_trait]
impl PatientRepository for SqlitePatientRepository {
    #[instrument(skip(self, patient), fields(name = %patient.name))]
    async fn create_patient(&self, patient: NewPatient) -> Result<Patient> {
        trace!("Inserting patient row");
        let result = sqlx::query(
            "INSERT INTO patients (name, age, gender, address, doctor_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.address)
        .bind(patient.doctor_id)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(patient_id = id, "Patient row inserted");
        Ok(Patient {
            id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            address: patient.address,
            doctor_id: patient.doctor_id,
        })
    }

    #[instrument(skip(self), fields(doctor_id = doctor_id))]
    async fn list_patients(&self, doctor_id: Option<i64>) -> Result<Vec<PatientRecord>> {
        trace!("Listing patients");
        let rows = match doctor_id {
            Some(doctor_id) => {
                sqlx::query(
                    "SELECT p.id, p.name, p.age, p.gender, p.address, d.name AS doctor_name
                     FROM patients p
                     LEFT JOIN doctors d ON p.doctor_id = d.id
                     WHERE p.doctor_id = ?
                     ORDER BY p.id",
                )
                .bind(doctor_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT p.id, p.name, p.age, p.gender, p.address, d.name AS doctor_name
                     FROM patients p
                     LEFT JOIN doctors d ON p.doctor_id = d.id
                     ORDER BY p.id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self), fields(patient_id = id))]
    async fn delete_patient(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(
            patient_id = id,
            rows = result.rows_affected(),
            "Patient delete executed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::db::test_pool;
    use crate::data::doctor_repository::SqliteDoctorRepository;
    use crate::domain::repository::DoctorRepository;

    fn new_patient(name: &str, doctor_id: Option<i64>) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: 30,
            gender: "Male".to_string(),
            address: "Somewhere 1".to_string(),
            doctor_id,
        }
    }

    #[tokio::test]
    async fn test_create_patient_returns_generated_id() {
        let repo = SqlitePatientRepository::new(test_pool().await);

        let p1 = repo.create_patient(new_patient("P1", None)).await.unwrap();
        let p2 = repo.create_patient(new_patient("P2", None)).await.unwrap();

        assert!(p2.id > p1.id);
        assert_eq!(p1.name, "P1");
    }

    #[tokio::test]
    async fn test_unassigned_patient_lists_without_doctor_name() {
        let repo = SqlitePatientRepository::new(test_pool().await);

        repo.create_patient(new_patient("Solo", None)).await.unwrap();

        let rows = repo.list_patients(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Solo");
        assert_eq!(rows[0].doctor_name, None);
    }

    #[tokio::test]
    async fn test_assigned_patient_lists_with_doctor_name() {
        let pool = test_pool().await;
        let doctors = SqliteDoctorRepository::new(pool.clone());
        let patients = SqlitePatientRepository::new(pool);

        let doctor_id = doctors.create_doctor(1, "Dr A", "Cardio").await.unwrap();
        patients
            .create_patient(new_patient("P1", Some(doctor_id)))
            .await
            .unwrap();

        let rows = patients.list_patients(None).await.unwrap();
        assert_eq!(rows[0].doctor_name.as_deref(), Some("Dr A"));
    }

    #[tokio::test]
    async fn test_list_patients_filters_by_doctor() {
        let pool = test_pool().await;
        let doctors = SqliteDoctorRepository::new(pool.clone());
        let patients = SqlitePatientRepository::new(pool);

        let dr_a = doctors.create_doctor(1, "Dr A", "Cardio").await.unwrap();
        let dr_b = doctors.create_doctor(2, "Dr B", "Neuro").await.unwrap();
        patients
            .create_patient(new_patient("OfA", Some(dr_a)))
            .await
            .unwrap();
        patients
            .create_patient(new_patient("OfB", Some(dr_b)))
            .await
            .unwrap();
        patients.create_patient(new_patient("Free", None)).await.unwrap();

        let of_a = patients.list_patients(Some(dr_a)).await.unwrap();
        assert_eq!(of_a.len(), 1);
        assert_eq!(of_a[0].name, "OfA");

        let all = patients.list_patients(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_deleted_doctor_leaves_patient_with_dangling_link() {
        let pool = test_pool().await;
        let doctors = SqliteDoctorRepository::new(pool.clone());
        let patients = SqlitePatientRepository::new(pool);

        let doctor_id = doctors.create_doctor(1, "Dr Gone", "Cardio").await.unwrap();
        patients
            .create_patient(new_patient("Orphan", Some(doctor_id)))
            .await
            .unwrap();
        doctors.delete_doctor(doctor_id).await.unwrap();

        // No cascade: the row survives, the joined name goes missing.
        let rows = patients.list_patients(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor_name, None);
    }

    #[tokio::test]
    async fn test_delete_patient_and_absent_id_noop() {
        let repo = SqlitePatientRepository::new(test_pool().await);

        let p = repo.create_patient(new_patient("Bye", None)).await.unwrap();
        repo.delete_patient(p.id).await.unwrap();
        assert!(repo.list_patients(None).await.unwrap().is_empty());

        repo.delete_patient(777).await.unwrap();
    }
}
