use crate::application::session::{Page, SessionState};
use crate::domain::models::Role;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, info, instrument};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: i64,
    pub role: Role,
    pub menu: Vec<Page>,
    pub landing_page: Page,
}

#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(username = %req.username, "Registration request received");

    let user = state
        .auth_service
        .register(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    let response = RegisterResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    };

    info!(user_id = response.id, username = %response.username, "User registered successfully");
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(username = %req.username, "Login request received");

    let outcome = state.auth_service.login(req.into_inner()).await.map_err(|e| {
        error!(error = %e, "Failed to login");
        ApiError::from(e)
    })?;

    let session = SessionState::after_login(outcome.user_id, outcome.role);
    let response = LoginResponse {
        access_token: outcome.token,
        user_id: outcome.user_id,
        role: outcome.role,
        menu: session.menu(),
        landing_page: session.landing_page(),
    };

    info!(user_id = response.user_id, "Login successful");
    Ok(HttpResponse::Ok().json(response))
}
