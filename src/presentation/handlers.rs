use crate::application::auth_service::AuthService;
use crate::application::hospital_service::HospitalService;
use crate::application::session::{Page, SessionState};
use crate::data::doctor_repository::SqliteDoctorRepository;
use crate::data::patient_repository::SqlitePatientRepository;
use crate::data::user_repository::SqliteUserRepository;
use crate::domain::error::DomainError;
use crate::domain::models::{Doctor, NewPatient, PatientRecord, Role};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub type Auth = AuthService<SqliteUserRepository, SqliteDoctorRepository>;
pub type Hospital =
    HospitalService<SqliteUserRepository, SqliteDoctorRepository, SqlitePatientRepository>;

// AppState holding the services
pub struct AppState {
    pub auth_service: Arc<Auth>,
    pub hospital_service: Arc<Hospital>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

// Hospital API Error Types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::DuplicateUsername => actix_web::http::StatusCode::CONFLICT,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => actix_web::http::StatusCode::FORBIDDEN,
            ApiError::Database(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation(msg) => serde_json::json!({ "message": msg }),
            ApiError::DuplicateUsername => {
                serde_json::json!({ "message": "Username already exists" })
            }
            ApiError::NotFound(msg) => serde_json::json!({ "message": msg }),
            ApiError::Unauthorized(msg) => serde_json::json!({ "message": msg }),
            ApiError::Forbidden(msg) => serde_json::json!({ "message": msg }),
            ApiError::Database(msg) => serde_json::json!({ "message": msg }),
            ApiError::Internal(msg) => serde_json::json!({ "message": msg }),
        };

        // Log error based on severity
        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::DuplicateUsername => {
                warn!(error = %error_msg, status = %status, "Duplicate username")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Unauthorized(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::Forbidden(_) => {
                warn!(error = %error_msg, status = %status, "Forbidden")
            }
            ApiError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::DuplicateUsername) => ApiError::DuplicateUsername,
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Database(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

impl AuthenticatedUser {
    fn session(&self) -> SessionState {
        SessionState::after_login(self.user_id, self.role)
    }
}

/// Page access mirrors menu membership: a page missing from the role's menu
/// is simply not reachable.
fn require_page(user: &AuthenticatedUser, page: Page) -> Result<(), ApiError> {
    match user.session().select(page) {
        Some(_) => Ok(()),
        None => {
            warn!(
                user_id = user.user_id,
                role = %user.role.as_str(),
                page = ?page,
                "Page not in role menu"
            );
            Err(ApiError::Forbidden(
                "Page not available for this role".to_string(),
            ))
        }
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[derive(Serialize)]
struct SessionResponse {
    logged_in: bool,
    role: Option<Role>,
    menu: Vec<Page>,
}

#[instrument(skip(user))]
pub async fn get_session(user: Option<AuthenticatedUser>) -> HttpResponse {
    let (state, role) = match &user {
        Some(u) => (u.session(), Some(u.role)),
        None => (SessionState::LoggedOut, None),
    };
    HttpResponse::Ok().json(SessionResponse {
        logged_in: user.is_some(),
        role,
        menu: state.menu(),
    })
}

#[instrument(skip(user), fields(user_id = user.user_id))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    // Tokens are not revocable; the client drops its copy. The response is the
    // logged-out menu so the sidebar resets to the login page.
    let state = user.session().logout();
    info!(user_id = user.user_id, "User logged out");
    HttpResponse::Ok().json(SessionResponse {
        logged_in: false,
        role: None,
        menu: state.menu(),
    })
}

#[instrument(skip(state, user), fields(name = %req.name))]
pub async fn add_patient(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewPatient>,
) -> Result<HttpResponse, ApiError> {
    require_page(&user, Page::AddPatient)?;

    info!(name = %req.name, "Adding patient");
    let patient = state
        .hospital_service
        .add_patient(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to add patient");
            ApiError::from(e)
        })?;
    info!(patient_id = patient.id, "Patient added successfully");
    Ok(HttpResponse::Created().json(patient))
}

#[derive(Debug, Deserialize)]
pub struct PatientListQuery {
    pub doctor_id: Option<i64>,
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn list_patients(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PatientListQuery>,
) -> Result<HttpResponse, ApiError> {
    require_page(&user, Page::ViewPatients)?;

    // A doctor only ever sees their own patients; the filter parameter is for
    // the other roles.
    let patients: Vec<PatientRecord> = match user.role {
        Role::Doctor => state
            .hospital_service
            .list_patients_for_doctor_user(user.user_id)
            .await
            .map_err(ApiError::from)?,
        _ => state
            .hospital_service
            .list_patients(query.doctor_id)
            .await
            .map_err(ApiError::from)?,
    };

    info!(count = patients.len(), "Patients listed");
    Ok(HttpResponse::Ok().json(patients))
}

#[instrument(skip(state, user), fields(patient_id = %*path))]
pub async fn delete_patient(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let patient_id = path.into_inner();
    state
        .hospital_service
        .delete_patient(patient_id)
        .await
        .map_err(ApiError::from)?;
    info!(patient_id = patient_id, "Patient deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn list_doctors(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let doctors = state
        .hospital_service
        .list_doctors()
        .await
        .map_err(ApiError::from)?;
    info!(count = doctors.len(), "Doctors listed");
    Ok(HttpResponse::Ok().json(doctors))
}

#[instrument(skip(state, user), fields(doctor_id = %*path))]
pub async fn delete_doctor(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let doctor_id = path.into_inner();
    state
        .hospital_service
        .delete_doctor(doctor_id)
        .await
        .map_err(ApiError::from)?;
    info!(doctor_id = doctor_id, "Doctor deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Serialize)]
struct DoctorDashboardResponse {
    doctor: Doctor,
    patients: Vec<PatientRecord>,
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn doctor_dashboard(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    require_page(&user, Page::DoctorDashboard)?;

    let doctor = state
        .hospital_service
        .doctor_profile(user.user_id)
        .await
        .map_err(|e| {
            error!(user_id = user.user_id, error = %e, "Doctor profile lookup failed");
            ApiError::from(e)
        })?;
    let patients = state
        .hospital_service
        .list_patients(Some(doctor.id))
        .await
        .map_err(ApiError::from)?;

    info!(
        doctor_id = doctor.id,
        patients = patients.len(),
        "Doctor dashboard assembled"
    );
    Ok(HttpResponse::Ok().json(DoctorDashboardResponse { doctor, patients }))
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn list_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    require_page(&user, Page::AdminDashboard)?;

    let users = state
        .hospital_service
        .list_users()
        .await
        .map_err(ApiError::from)?;
    info!(count = users.len(), "Users listed");
    Ok(HttpResponse::Ok().json(users))
}

#[instrument(skip(state, user), fields(target_user_id = %*path))]
pub async fn delete_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user)?;

    let target = path.into_inner();
    state
        .hospital_service
        .delete_user(target)
        .await
        .map_err(ApiError::from)?;
    info!(target_user_id = target, "User deleted");
    Ok(HttpResponse::NoContent().finish())
}

fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.role != Role::Admin {
        warn!(
            user_id = user.user_id,
            role = %user.role.as_str(),
            "Admin-only operation rejected"
        );
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(())
}
