// models/src/medical/queue.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    General,
    Emergency,
    Pediatrics,
    Cardiology,
    Orthopedics,
    Radiology,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::General,
        Department::Emergency,
        Department::Pediatrics,
        Department::Cardiology,
        Department::Orthopedics,
        Department::Radiology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::General => "general",
            Department::Emergency => "emergency",
            Department::Pediatrics => "pediatrics",
            Department::Cardiology => "cardiology",
            Department::Orthopedics => "orthopedics",
            Department::Radiology => "radiology",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueStatus {
    Waiting,
    Called,
    InService,
    Completed,
    NoShow,
}

/// Ordered so that `Emergency > Urgent > Normal`, which is exactly the
/// comparison `call_next` selection relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    /// Monotonic per department, starting at 1.
    pub queue_number: u32,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub department: Department,
    pub service_type: String,
    pub status: QueueStatus,
    pub priority: Priority,
    pub estimated_wait_minutes: u32,
    /// Observed wait, stamped when the patient is called.
    pub actual_wait_minutes: Option<u32>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueEventKind {
    Called,
    Completed,
    Urgent,
}

/// Display-board notification emitted on queue transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueNotification {
    pub id: Uuid,
    pub kind: QueueEventKind,
    pub message: String,
    pub queue_item_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}
