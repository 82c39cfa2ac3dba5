// models/src/medical/patient.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientStatus {
    Waiting,
    InConsultation,
    Completed,
    NoShow,
}

/// Tracks whether a record still has local edits that have not been
/// pushed anywhere. There is no real sync protocol behind this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    Synced,
    Pending,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub provider: String,
    pub policy_number: String,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    /// Human-facing registration number, e.g. `HMS20250001`.
    pub patient_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub medical_history: String,
    pub last_visit: Option<NaiveDate>,
    pub queue_number: Option<u32>,
    pub status: PatientStatus,
    pub sync_status: SyncStatus,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<InsuranceInfo>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Caller-supplied fields for a new registration. Identity and
/// bookkeeping fields are assigned by the patient directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRegistration {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub medical_history: String,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<InsuranceInfo>,
}
