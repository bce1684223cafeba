use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use hospital_api::application::auth_service::AuthService;
use hospital_api::application::hospital_service::HospitalService;
use hospital_api::data::db;
use hospital_api::data::doctor_repository::SqliteDoctorRepository;
use hospital_api::data::patient_repository::SqlitePatientRepository;
use hospital_api::data::user_repository::SqliteUserRepository;
use hospital_api::infrastructure::config::Config;
use hospital_api::infrastructure::logging::init_logging;
use hospital_api::presentation::auth::{login, register};
use hospital_api::presentation::handlers::{
    AppState, add_patient, delete_doctor, delete_patient, delete_user, doctor_dashboard,
    get_session, health_check, list_doctors, list_patients, list_users, logout,
};
use hospital_api::presentation::middleware::{
    JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Logging initialized");

    let config = Config::from_env();
    info!(bind_addr = %config.bind_addr, "Configuration loaded");

    let pool = db::connect(&config.database_url).await?;
    db::init_schema(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let doctor_repository = Arc::new(SqliteDoctorRepository::new(pool.clone()));
    let patient_repository = Arc::new(SqlitePatientRepository::new(pool));

    let auth_service = Arc::new(AuthService::new(
        user_repository.clone(),
        doctor_repository.clone(),
        config.jwt_secret.clone(),
    ));
    let hospital_service = Arc::new(HospitalService::new(
        user_repository,
        doctor_repository,
        patient_repository,
    ));
    info!("Services created");

    let state = web::Data::new(AppState {
        auth_service,
        hospital_service,
    });

    let jwt_secret = config.jwt_secret.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/auth/register", web::post().to(register))
                    .route("/auth/login", web::post().to(login))
                    .route("/session", web::get().to(get_session))
                    .route("/session/logout", web::post().to(logout))
                    .route("/patients", web::post().to(add_patient))
                    .route("/patients", web::get().to(list_patients))
                    .route("/patients/{id}", web::delete().to(delete_patient))
                    .route("/doctors", web::get().to(list_doctors))
                    .route("/doctors/me", web::get().to(doctor_dashboard))
                    .route("/doctors/{id}", web::delete().to(delete_doctor))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{id}", web::delete().to(delete_user)),
            )
    });

    info!(address = %config.bind_addr, "Starting HTTP server");
    let server = server.bind(config.bind_addr.as_str())?;
    server.run().await?;
    Ok(())
}
