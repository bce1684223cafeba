pub mod db;
pub mod doctor_repository;
pub mod patient_repository;
pub mod user_repository;
