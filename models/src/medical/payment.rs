// models/src/medical/payment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Insurance,
}

/// What a payment is for; the pharmacy dispensing gate matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Consultation,
    Pharmacy,
    Diagnostic,
    Optical,
}

/// Derived answer to "has this been paid for?", recomputed from the
/// ledger on every query rather than stored on the record it gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Paid,
    Pending,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub service_id: Uuid,
    /// Minor currency units; immutable after creation.
    pub amount: i64,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub service_type: ServiceType,
    /// Explicit foreign key to the prescription a pharmacy payment
    /// settles. Replaces the receipt-reference substring matching the
    /// UI prototype used as an ad hoc join.
    pub prescription_id: Option<Uuid>,
    /// Opaque unique reference, e.g. `REF-1706601600000-0007`.
    pub reference: String,
    /// Human-facing receipt number, e.g. `RCP2501300007`.
    pub receipt_number: String,
    pub cashier: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
