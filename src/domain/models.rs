use serde::{Deserialize, Serialize};

/// Role stored on a user row, controlling which pages the sidebar menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    /// Default registrar-like role: may add and view patients, nothing else.
    Registrar,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Registrar => "registrar",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "doctor" => Some(Role::Doctor),
            "registrar" => Some(Role::Registrar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub doctor_id: Option<i64>,
}

/// A patient row as listed: joined with the assigned doctor's name, which is
/// absent when no doctor is linked (or the linked doctor was deleted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub doctor_id: Option<i64>,
}
