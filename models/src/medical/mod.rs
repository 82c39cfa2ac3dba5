// models/src/medical/mod.rs

pub mod consultation;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod queue;
pub mod service;
pub mod user;
pub mod visual_acuity;
pub mod vitals;

pub use consultation::{Consultation, ConsultationForm, ConsultationStatus, Referral};
pub use patient::{
    EmergencyContact, InsuranceInfo, Patient, PatientRegistration, PatientStatus, SyncStatus,
};
pub use payment::{Payment, PaymentMethod, PaymentState, PaymentStatus, ServiceType};
pub use prescription::{MedicationLine, MedicationRequest, Prescription, PrescriptionStatus};
pub use queue::{
    Department, Priority, QueueEventKind, QueueItem, QueueNotification, QueueStatus,
};
pub use service::{PriceSchedule, Service, ServiceCategory, ServiceTier};
pub use user::{Role, User};
pub use visual_acuity::{EyeReading, VisualAcuity};
pub use vitals::{VitalSigns, VitalSignsForm};
