// lib/src/dispensary.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use crate::ledger::PaymentLedger;
use models::errors::{HospitalError, HospitalResult};
use models::medical::{
    MedicationLine, MedicationRequest, PaymentState, Prescription, PrescriptionStatus,
};

#[derive(Debug, Default)]
struct DispensaryInner {
    prescriptions: HashMap<Uuid, Prescription>,
}

/// Holds prescriptions and enforces the payment-before-dispensing
/// rule. The ledger handle is injected at construction; the gate is
/// re-evaluated against it at the moment of every dispense, never
/// cached on the prescription.
#[derive(Debug, Clone)]
pub struct Dispensary {
    inner: Arc<Mutex<DispensaryInner>>,
    ledger: PaymentLedger,
}

impl Dispensary {
    pub fn new(ledger: PaymentLedger) -> Self {
        Dispensary {
            inner: Arc::new(Mutex::new(DispensaryInner::default())),
            ledger,
        }
    }

    fn lock(&self) -> HospitalResult<MutexGuard<'_, DispensaryInner>> {
        self.inner
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))
    }

    /// Writes a new prescription; line totals and the grand total are
    /// derived here from the requested quantities.
    pub fn create_prescription(
        &self,
        patient_id: Uuid,
        doctor_id: &str,
        requests: Vec<MedicationRequest>,
        instructions: &str,
    ) -> HospitalResult<Prescription> {
        if requests.is_empty() {
            return Err(HospitalError::InvalidData(
                "a prescription needs at least one medication".to_string(),
            ));
        }
        let medications: Vec<MedicationLine> = requests
            .into_iter()
            .map(|r| MedicationLine {
                total_price: r.unit_price * r.quantity as i64,
                name: r.name,
                dosage: r.dosage,
                frequency: r.frequency,
                duration: r.duration,
                quantity: r.quantity,
                unit_price: r.unit_price,
                instructions: r.instructions,
            })
            .collect();
        let total_amount = medications.iter().map(|m| m.total_price).sum();
        let prescription = Prescription {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: doctor_id.to_string(),
            medications,
            instructions: instructions.to_string(),
            status: PrescriptionStatus::Pending,
            total_amount,
            created_at: Utc::now(),
            dispensed_at: None,
            dispensed_by: None,
            pharmacist_notes: None,
        };
        info!(
            "prescription {} written for patient {} ({} total)",
            prescription.id, patient_id, total_amount
        );
        self.lock()?
            .prescriptions
            .insert(prescription.id, prescription.clone());
        Ok(prescription)
    }

    pub fn get(&self, id: Uuid) -> HospitalResult<Prescription> {
        let inner = self.lock()?;
        inner
            .prescriptions
            .get(&id)
            .cloned()
            .ok_or_else(|| HospitalError::NotFound(format!("prescription {id}")))
    }

    pub fn for_patient(&self, patient_id: Uuid) -> HospitalResult<Vec<Prescription>> {
        let inner = self.lock()?;
        Ok(inner
            .prescriptions
            .values()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect())
    }

    pub fn by_status(&self, status: PrescriptionStatus) -> HospitalResult<Vec<Prescription>> {
        let inner = self.lock()?;
        Ok(inner
            .prescriptions
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    /// Where the prescription stands with the cashier, derived from
    /// the ledger at call time.
    pub fn payment_state(&self, id: Uuid) -> HospitalResult<PaymentState> {
        let prescription = self.get(id)?;
        self.ledger
            .prescription_payment_state(prescription.patient_id, id)
    }

    /// True iff the prescription is still pending and the ledger
    /// currently holds a completed pharmacy payment for it.
    pub fn can_dispense(&self, id: Uuid) -> HospitalResult<bool> {
        let prescription = self.get(id)?;
        Ok(prescription.status == PrescriptionStatus::Pending
            && self
                .ledger
                .is_prescription_paid(prescription.patient_id, id))
    }

    /// Dispenses the prescription. Fails closed: no proof of payment
    /// in the ledger at this instant means no state change. Dispensing
    /// an already-dispensed prescription is an error, not a no-op.
    pub fn dispense(&self, id: Uuid, pharmacist: &str) -> HospitalResult<Prescription> {
        let mut inner = self.lock()?;
        let prescription = inner
            .prescriptions
            .get_mut(&id)
            .ok_or_else(|| HospitalError::NotFound(format!("prescription {id}")))?;

        match prescription.status {
            PrescriptionStatus::Pending => {}
            PrescriptionStatus::Dispensed => {
                return Err(HospitalError::InvalidTransition {
                    from: "dispensed".to_string(),
                    to: "dispensed".to_string(),
                })
            }
            PrescriptionStatus::Cancelled => {
                return Err(HospitalError::InvalidTransition {
                    from: "cancelled".to_string(),
                    to: "dispensed".to_string(),
                })
            }
        }

        // The gate itself, evaluated at the moment of dispensing.
        if !self
            .ledger
            .is_prescription_paid(prescription.patient_id, id)
        {
            warn!(
                "dispense refused for prescription {}: no completed pharmacy payment",
                id
            );
            return Err(HospitalError::PaymentNotVerified {
                patient_id: prescription.patient_id,
                prescription_id: id,
            });
        }

        prescription.status = PrescriptionStatus::Dispensed;
        prescription.dispensed_at = Some(Utc::now());
        prescription.dispensed_by = Some(pharmacist.to_string());
        info!("prescription {} dispensed by {}", id, pharmacist);
        Ok(prescription.clone())
    }

    /// Adds the pharmacist's note without touching the state machine.
    pub fn annotate(&self, id: Uuid, notes: &str) -> HospitalResult<Prescription> {
        let mut inner = self.lock()?;
        let prescription = inner
            .prescriptions
            .get_mut(&id)
            .ok_or_else(|| HospitalError::NotFound(format!("prescription {id}")))?;
        prescription.pharmacist_notes = Some(notes.to_string());
        Ok(prescription.clone())
    }

    /// `Pending -> Cancelled`; terminal, like `Dispensed`.
    pub fn cancel(&self, id: Uuid) -> HospitalResult<Prescription> {
        let mut inner = self.lock()?;
        let prescription = inner
            .prescriptions
            .get_mut(&id)
            .ok_or_else(|| HospitalError::NotFound(format!("prescription {id}")))?;
        if prescription.status != PrescriptionStatus::Pending {
            return Err(HospitalError::InvalidTransition {
                from: format!("{:?}", prescription.status).to_lowercase(),
                to: "cancelled".to_string(),
            });
        }
        prescription.status = PrescriptionStatus::Cancelled;
        Ok(prescription.clone())
    }

    pub(crate) fn export(&self) -> HospitalResult<Vec<Prescription>> {
        let inner = self.lock()?;
        Ok(inner.prescriptions.values().cloned().collect())
    }

    pub(crate) fn import(&self, prescriptions: Vec<Prescription>) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.prescriptions = prescriptions.into_iter().map(|p| (p.id, p)).collect();
        Ok(())
    }
}
