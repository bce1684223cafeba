use crate::domain::error::DomainError;
use crate::domain::models::Role;
use crate::domain::repository::{DoctorRepository, UserRepository};
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::security::{generate_token, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Successful login: the token carries user id and role as claims, the rest is
/// echoed so the client can build its menu without decoding the token.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

pub struct AuthService<U: UserRepository, D: DoctorRepository> {
    user_repository: Arc<U>,
    doctor_repository: Arc<D>,
    jwt_secret: String,
}

impl<U: UserRepository, D: DoctorRepository> AuthService<U, D> {
    pub fn new(user_repository: Arc<U>, doctor_repository: Arc<D>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            doctor_repository,
            jwt_secret,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username, role = %req.role.as_str()))]
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        trace!("Starting user registration");

        if req.username.is_empty() || req.password.is_empty() {
            return Err(
                DomainError::Validation("Username and password are required".to_string()).into(),
            );
        }

        // Existence pre-check; the store's UNIQUE constraint backstops the
        // race between check and insert.
        if self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            warn!(username = %req.username, "Username already exists");
            return Err(DomainError::DuplicateUsername.into());
        }

        // A doctor registration must carry a profile name and specialty.
        let doctor_fields = if req.role == Role::Doctor {
            match (req.doctor_name.as_deref(), req.specialty.as_deref()) {
                (Some(name), Some(specialty)) if !name.is_empty() && !specialty.is_empty() => {
                    Some((name, specialty))
                }
                _ => {
                    warn!(username = %req.username, "Doctor registration missing name or specialty");
                    return Err(DomainError::Validation(
                        "Doctor name and specialty required".to_string(),
                    )
                    .into());
                }
            }
        } else {
            None
        };

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user_id = self
            .user_repository
            .create_user(
                &req.username,
                &password_hash,
                req.role,
                req.specialty.as_deref(),
            )
            .await?;
        debug!(user_id = user_id, "User row created");

        // Second insert is sequential, not atomic with the first.
        if let Some((name, specialty)) = doctor_fields {
            let doctor_id = self
                .doctor_repository
                .create_doctor(user_id, name, specialty)
                .await?;
            debug!(user_id = user_id, doctor_id = doctor_id, "Doctor profile created");
        }

        info!(
            user_id = user_id,
            username = %req.username,
            role = %req.role.as_str(),
            "User registered successfully"
        );

        Ok(User {
            id: user_id,
            username: req.username,
            password_hash,
            role: req.role,
            specialty: req.specialty,
        })
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                warn!(username = %req.username, "User not found during login");
                DomainError::Unauthorized("Invalid username or password".to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = user.id, username = %user.username, "Invalid password during login");
            return Err(
                DomainError::Unauthorized("Invalid username or password".to_string()).into(),
            );
        }

        let token = generate_token(user.id, user.role, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e))
        })?;

        info!(
            user_id = user.id,
            username = %user.username,
            role = %user.role.as_str(),
            "Login successful"
        );

        Ok(LoginOutcome {
            token,
            user_id: user.id,
            role: user.role,
        })
    }
}
