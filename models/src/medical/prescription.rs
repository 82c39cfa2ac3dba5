// models/src/medical/prescription.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Dispensed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationLine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: u32,
    /// Minor currency units per unit dispensed.
    pub unit_price: i64,
    /// `quantity * unit_price`; computed when the line is added.
    pub total_price: i64,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: String,
    pub medications: Vec<MedicationLine>,
    pub instructions: String,
    pub status: PrescriptionStatus,
    /// Sum of line totals.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub dispensed_at: Option<DateTime<Utc>>,
    pub dispensed_by: Option<String>,
    pub pharmacist_notes: Option<String>,
}

/// One requested medication as written by the doctor; the line total
/// is derived when the prescription is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub instructions: Option<String>,
}
