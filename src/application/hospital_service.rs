use crate::domain::error::DomainError;
use crate::domain::models::{Doctor, NewPatient, Patient, PatientRecord};
use crate::domain::repository::{DoctorRepository, PatientRepository, UserRepository};
use crate::domain::user::UserRecord;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, trace, warn};

/// Registry operations behind the patient/doctor/admin pages.
pub struct HospitalService<U: UserRepository, D: DoctorRepository, P: PatientRepository> {
    user_repository: Arc<U>,
    doctor_repository: Arc<D>,
    patient_repository: Arc<P>,
}

impl<U: UserRepository, D: DoctorRepository, P: PatientRepository> HospitalService<U, D, P> {
    pub fn new(
        user_repository: Arc<U>,
        doctor_repository: Arc<D>,
        patient_repository: Arc<P>,
    ) -> Self {
        Self {
            user_repository,
            doctor_repository,
            patient_repository,
        }
    }

    #[instrument(skip(self, patient), fields(name = %patient.name))]
    pub async fn add_patient(&self, patient: NewPatient) -> Result<Patient> {
        trace!("Adding patient");

        // Mirrors the form-level checks; the store itself accepts any values.
        if patient.name.is_empty() || patient.gender.is_empty() || patient.address.is_empty() {
            return Err(DomainError::Validation("Please fill all fields".to_string()).into());
        }
        if patient.age <= 0 {
            return Err(DomainError::Validation("Age must be positive".to_string()).into());
        }

        let created = self.patient_repository.create_patient(patient).await?;
        info!(patient_id = created.id, "Patient added");
        Ok(created)
    }

    #[instrument(skip(self), fields(doctor_id = doctor_id))]
    pub async fn list_patients(&self, doctor_id: Option<i64>) -> Result<Vec<PatientRecord>> {
        self.patient_repository.list_patients(doctor_id).await
    }

    /// Patients visible to a doctor: resolved through the doctor profile owned
    /// by the logged-in user.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn list_patients_for_doctor_user(&self, user_id: i64) -> Result<Vec<PatientRecord>> {
        let doctor = self.doctor_profile(user_id).await?;
        self.patient_repository.list_patients(Some(doctor.id)).await
    }

    #[instrument(skip(self), fields(patient_id = id))]
    pub async fn delete_patient(&self, id: i64) -> Result<()> {
        self.patient_repository.delete_patient(id).await?;
        info!(patient_id = id, "Patient deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.doctor_repository.list_doctors().await
    }

    #[instrument(skip(self), fields(doctor_id = id))]
    pub async fn delete_doctor(&self, id: i64) -> Result<()> {
        self.doctor_repository.delete_doctor(id).await?;
        info!(doctor_id = id, "Doctor deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn doctor_profile(&self, user_id: i64) -> Result<Doctor> {
        self.doctor_repository
            .find_doctor_by_user_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "Doctor profile not found");
                DomainError::NotFound("Doctor profile not found".to_string()).into()
            })
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.user_repository.list_users().await
    }

    #[instrument(skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.user_repository.delete_user(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
