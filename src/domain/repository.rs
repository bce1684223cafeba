use crate::domain::models::{Doctor, NewPatient, Patient, PatientRecord, Role};
use crate::domain::user::{User, UserRecord};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user row and returns its generated id.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        specialty: Option<&str>,
    ) -> Result<i64>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<UserRecord>>;
    /// Removing an absent id is a no-op.
    async fn delete_user(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn create_doctor(&self, user_id: i64, name: &str, specialty: &str) -> Result<i64>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;
    async fn find_doctor_by_user_id(&self, user_id: i64) -> Result<Option<Doctor>>;
    /// Removing an absent id is a no-op.
    async fn delete_doctor(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn create_patient(&self, patient: NewPatient) -> Result<Patient>;
    /// Lists patients joined with their assigned doctor's name, optionally
    /// restricted to one doctor.
    async fn list_patients(&self, doctor_id: Option<i64>) -> Result<Vec<PatientRecord>>;
    /// Removing an absent id is a no-op.
    async fn delete_patient(&self, id: i64) -> Result<()>;
}
