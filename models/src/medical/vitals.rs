// models/src/medical/vitals.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub blood_pressure_systolic: u16,
    pub blood_pressure_diastolic: u16,
    /// Degrees Celsius.
    pub temperature: f32,
    /// Kilograms.
    pub weight: f32,
    /// Centimetres.
    pub height: f32,
    pub heart_rate: u16,
    pub respiratory_rate: u16,
    pub oxygen_saturation: Option<u8>,
    pub blood_sugar: Option<f32>,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

/// Screening-form payload; id and timestamps are assigned on record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSignsForm {
    pub blood_pressure_systolic: u16,
    pub blood_pressure_diastolic: u16,
    pub temperature: f32,
    pub weight: f32,
    pub height: f32,
    pub heart_rate: u16,
    pub respiratory_rate: u16,
    pub oxygen_saturation: Option<u8>,
    pub blood_sugar: Option<f32>,
    pub notes: Option<String>,
}
