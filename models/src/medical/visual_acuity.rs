// models/src/medical/visual_acuity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snellen readings for one eye, e.g. "6/6", "6/18".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeReading {
    pub without_glasses: String,
    pub with_glasses: Option<String>,
    pub pinhole: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualAcuity {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub right_eye: EyeReading,
    pub left_eye: EyeReading,
    pub color_vision: String,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}
