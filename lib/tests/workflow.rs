// lib/tests/workflow.rs
//
// Full front-desk to pharmacy walk-through: check-in, triage, consult,
// prescribe, attempt to dispense unpaid, pay, dispense.

use chrono::NaiveDate;
use uuid::Uuid;

use lib::{Hospital, HospitalConfig, HospitalError};
use models::medical::{
    ConsultationForm, Department, MedicationRequest, PatientStatus, PaymentMethod, PaymentState,
    Priority, QueueStatus, ServiceType, VitalSignsForm,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn registration(first: &str, last: &str) -> models::medical::PatientRegistration {
    models::medical::PatientRegistration {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 2).unwrap(),
        phone: "+234-801-234-5678".to_string(),
        email: Some("patient@example.com".to_string()),
        address: "23 Marina Road, Lagos".to_string(),
        medical_history: "None".to_string(),
        emergency_contact: None,
        insurance: None,
    }
}

fn quick_config() -> HospitalConfig {
    HospitalConfig {
        sync_delay_ms: 1,
        ..HospitalConfig::default()
    }
}

#[tokio::test]
async fn patient_journey_ends_with_a_paid_dispense() {
    init_logging();
    let hospital = Hospital::new(quick_config());

    // Reception.
    let (patient, queue_item) = hospital
        .check_in(
            registration("Amina", "Bello"),
            Department::General,
            "consultation",
            Priority::Normal,
        )
        .unwrap();
    assert_eq!(patient.status, PatientStatus::Waiting);
    assert_eq!(queue_item.queue_number, 1);

    // Screening.
    hospital
        .directory()
        .record_vitals(
            patient.id,
            VitalSignsForm {
                blood_pressure_systolic: 120,
                blood_pressure_diastolic: 80,
                temperature: 37.1,
                weight: 64.0,
                height: 168.0,
                heart_rate: 72,
                respiratory_rate: 16,
                oxygen_saturation: Some(98),
                blood_sugar: None,
                notes: None,
            },
            "nurse1",
        )
        .unwrap();

    // Doctor calls the patient and consults.
    let called = hospital
        .queue()
        .call_next(Department::General, Some("dr-adeyemi"))
        .unwrap()
        .unwrap();
    assert_eq!(called.patient_id, patient.id);
    assert_eq!(called.status, QueueStatus::Called);

    let consultation = hospital
        .directory()
        .open_consultation(
            patient.id,
            "dr-adeyemi",
            ConsultationForm {
                chief_complaint: "Persistent headache".to_string(),
                history_of_present_illness: "Three days, worse in the evening".to_string(),
                physical_examination: "No focal neurological deficit".to_string(),
                diagnosis: "Tension headache".to_string(),
                treatment_plan: "Analgesics, hydration".to_string(),
                follow_up_date: None,
                referral: None,
            },
        )
        .unwrap();
    assert_eq!(
        hospital.directory().get(patient.id).unwrap().status,
        PatientStatus::InConsultation
    );

    let prescription = hospital
        .dispensary()
        .create_prescription(
            patient.id,
            "dr-adeyemi",
            vec![
                MedicationRequest {
                    name: "Paracetamol".to_string(),
                    dosage: "500mg".to_string(),
                    frequency: "tds".to_string(),
                    duration: "3 days".to_string(),
                    quantity: 9,
                    unit_price: 50,
                    instructions: Some("After meals".to_string()),
                },
                MedicationRequest {
                    name: "Ibuprofen".to_string(),
                    dosage: "400mg".to_string(),
                    frequency: "bd".to_string(),
                    duration: "3 days".to_string(),
                    quantity: 6,
                    unit_price: 75,
                    instructions: None,
                },
            ],
            "Return if symptoms persist",
        )
        .unwrap();
    assert_eq!(prescription.total_amount, 9 * 50 + 6 * 75);

    hospital
        .directory()
        .complete_consultation(consultation.id)
        .unwrap();
    hospital.queue().mark_completed(called.id).unwrap();

    // Pharmacy refuses before payment.
    assert!(!hospital.dispensary().can_dispense(prescription.id).unwrap());
    let err = hospital
        .dispensary()
        .dispense(prescription.id, "pharm1")
        .unwrap_err();
    assert!(matches!(err, HospitalError::PaymentNotVerified { .. }));
    // Nothing posted in the ledger yet, so the derived state is None.
    assert_eq!(
        hospital.dispensary().payment_state(prescription.id).unwrap(),
        PaymentState::None
    );

    // Cashier takes payment against the prescription.
    hospital
        .ledger()
        .record_payment(
            patient.id,
            Uuid::new_v4(),
            prescription.total_amount,
            PaymentMethod::Cash,
            ServiceType::Pharmacy,
            Some(prescription.id),
            "cashier1",
        )
        .unwrap();

    // Same call now succeeds; the gate re-reads the ledger.
    assert!(hospital.dispensary().can_dispense(prescription.id).unwrap());
    let dispensed = hospital
        .dispensary()
        .dispense(prescription.id, "pharm1")
        .unwrap();
    assert_eq!(dispensed.dispensed_by.as_deref(), Some("pharm1"));
    assert_eq!(
        hospital.dispensary().payment_state(prescription.id).unwrap(),
        PaymentState::Paid
    );

    // Dashboard reflects the day.
    let stats = hospital.reports().dashboard_stats().unwrap();
    assert_eq!(stats.total_patients, 1);
    assert_eq!(stats.prescriptions_dispensed, 1);
    assert_eq!(stats.total_revenue, prescription.total_amount);

    // Pending edits flush through the simulated sync.
    let flushed = hospital.synchronize().await.unwrap();
    assert!(flushed >= 1);
    assert!(hospital.directory().pending_changes().unwrap().is_empty());
}

#[tokio::test]
async fn emergency_arrivals_jump_the_line_but_numbers_stay_monotonic() {
    init_logging();
    let hospital = Hospital::new(quick_config());

    let mut ids = Vec::new();
    for (name, priority) in [
        ("First Normal", Priority::Normal),
        ("Second Normal", Priority::Normal),
        ("Late Emergency", Priority::Emergency),
    ] {
        let (patient, item) = hospital
            .check_in(
                registration(name, "Case"),
                Department::Emergency,
                "triage",
                priority,
            )
            .unwrap();
        ids.push((patient.id, item.queue_number));
    }
    assert_eq!(
        ids.iter().map(|(_, n)| *n).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    // Emergency first despite holding the highest number, then FIFO.
    let order: Vec<u32> = std::iter::from_fn(|| {
        hospital
            .queue()
            .call_next(Department::Emergency, None)
            .unwrap()
            .map(|item| item.queue_number)
    })
    .collect();
    assert_eq!(order, vec![3, 1, 2]);

    // Drained line is a normal outcome.
    assert!(hospital
        .queue()
        .call_next(Department::Emergency, None)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn a_payment_for_one_prescription_does_not_unlock_another() {
    init_logging();
    let hospital = Hospital::new(quick_config());
    let (patient, _) = hospital
        .check_in(
            registration("Chidi", "Nwosu"),
            Department::General,
            "consultation",
            Priority::Normal,
        )
        .unwrap();

    let request = MedicationRequest {
        name: "Amoxicillin".to_string(),
        dosage: "250mg".to_string(),
        frequency: "tds".to_string(),
        duration: "7 days".to_string(),
        quantity: 21,
        unit_price: 30,
        instructions: None,
    };
    let first = hospital
        .dispensary()
        .create_prescription(patient.id, "dr-1", vec![request.clone()], "")
        .unwrap();
    let second = hospital
        .dispensary()
        .create_prescription(patient.id, "dr-1", vec![request], "")
        .unwrap();

    hospital
        .ledger()
        .record_payment(
            patient.id,
            Uuid::new_v4(),
            first.total_amount,
            PaymentMethod::Card,
            ServiceType::Pharmacy,
            Some(first.id),
            "cashier1",
        )
        .unwrap();

    assert!(hospital.dispensary().can_dispense(first.id).unwrap());
    assert!(!hospital.dispensary().can_dispense(second.id).unwrap());
    assert!(matches!(
        hospital.dispensary().dispense(second.id, "pharm1"),
        Err(HospitalError::PaymentNotVerified { .. })
    ));
}
