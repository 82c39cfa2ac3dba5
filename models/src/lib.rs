// models/src/lib.rs

pub mod errors;
pub mod medical;
pub mod reports;

pub use errors::{HospitalError, HospitalResult};
pub use medical::{
    Consultation, ConsultationForm, ConsultationStatus, Department, EmergencyContact, EyeReading,
    InsuranceInfo, MedicationLine, MedicationRequest, Patient, PatientRegistration, PatientStatus,
    Payment, PaymentMethod, PaymentState, PaymentStatus, Prescription, PrescriptionStatus,
    PriceSchedule, Priority, QueueEventKind, QueueItem, QueueNotification, QueueStatus, Referral,
    Role, Service, ServiceCategory, ServiceTier, ServiceType, SyncStatus, User, VisualAcuity,
    VitalSigns, VitalSignsForm,
};
pub use reports::{
    DashboardStats, DateRange, DepartmentLoad, FinancialSummary, OperationalSummary, QueueStats,
};

#[cfg(test)]
mod tests {
    use super::medical::{Department, PaymentState, Priority, QueueStatus};

    #[test]
    fn priority_ordering_matches_call_order() {
        assert!(Priority::Emergency > Priority::Urgent);
        assert!(Priority::Urgent > Priority::Normal);
    }

    #[test]
    fn statuses_keep_the_original_wire_vocabulary() {
        let json = serde_json::to_string(&QueueStatus::InService).unwrap();
        assert_eq!(json, "\"in-service\"");
        let json = serde_json::to_string(&QueueStatus::NoShow).unwrap();
        assert_eq!(json, "\"no-show\"");
        let json = serde_json::to_string(&PaymentState::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
        let back: QueueStatus = serde_json::from_str("\"no-show\"").unwrap();
        assert_eq!(back, QueueStatus::NoShow);
    }

    #[test]
    fn departments_enumerate_every_line() {
        assert_eq!(Department::ALL.len(), 6);
        assert_eq!(Department::General.as_str(), "general");
    }
}
