// models/src/medical/consultation.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsultationStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub department: String,
    pub doctor: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: String,
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub physical_examination: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub follow_up_date: Option<NaiveDate>,
    pub referral: Option<Referral>,
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationForm {
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub physical_examination: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub follow_up_date: Option<NaiveDate>,
    pub referral: Option<Referral>,
}
