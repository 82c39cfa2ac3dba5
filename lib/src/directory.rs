// lib/src/directory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Datelike, Utc};
use log::{debug, info};
use uuid::Uuid;

use models::errors::{HospitalError, HospitalResult};
use models::medical::{
    Consultation, ConsultationForm, ConsultationStatus, Patient, PatientRegistration,
    PatientStatus, SyncStatus, VisualAcuity, VitalSigns, VitalSignsForm,
};

#[derive(Debug, Default)]
struct DirectoryInner {
    patients: HashMap<Uuid, Patient>,
    vitals: Vec<VitalSigns>,
    visual_acuity: Vec<VisualAcuity>,
    consultations: Vec<Consultation>,
    next_patient_seq: u32,
}

/// Registry of patients plus the clinical records the screening and
/// consultation steps append to them. An explicit service object;
/// handles are cheap clones sharing one inner state.
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    inner: Arc<Mutex<DirectoryInner>>,
    /// Fixed delay standing in for a real network sync call.
    sync_delay: Duration,
}

impl PatientDirectory {
    pub fn new(sync_delay: Duration) -> Self {
        PatientDirectory {
            inner: Arc::new(Mutex::new(DirectoryInner::default())),
            sync_delay,
        }
    }

    fn lock(&self) -> HospitalResult<MutexGuard<'_, DirectoryInner>> {
        self.inner
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))
    }

    /// Registers a new patient: assigns the id and the sequential
    /// `HMS{year}{seq}` patient number, marks the record as a local
    /// unsynced edit.
    pub fn register(&self, form: PatientRegistration) -> HospitalResult<Patient> {
        if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
            return Err(HospitalError::InvalidData(
                "patient name is required".to_string(),
            ));
        }
        if form.phone.trim().is_empty() {
            return Err(HospitalError::InvalidData(
                "patient phone number is required".to_string(),
            ));
        }

        let mut inner = self.lock()?;
        inner.next_patient_seq += 1;
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            patient_number: format!("HMS{}{:04}", now.year(), inner.next_patient_seq),
            first_name: form.first_name,
            last_name: form.last_name,
            date_of_birth: form.date_of_birth,
            phone: form.phone,
            email: form.email,
            address: form.address,
            medical_history: form.medical_history,
            last_visit: None,
            queue_number: None,
            status: PatientStatus::Waiting,
            sync_status: SyncStatus::Pending,
            emergency_contact: form.emergency_contact,
            insurance: form.insurance,
            created_at: now,
        };
        info!(
            "registered patient {} ({})",
            patient.patient_number,
            patient.full_name()
        );
        inner.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    pub fn get(&self, id: Uuid) -> HospitalResult<Patient> {
        let inner = self.lock()?;
        inner
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| HospitalError::NotFound(format!("patient {id}")))
    }

    pub fn all(&self) -> HospitalResult<Vec<Patient>> {
        let inner = self.lock()?;
        let mut patients: Vec<Patient> = inner.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.patient_number.cmp(&b.patient_number));
        Ok(patients)
    }

    pub fn by_status(&self, status: PatientStatus) -> HospitalResult<Vec<Patient>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| p.status == status)
            .collect())
    }

    /// Substring search over name, patient number and phone. An empty
    /// query is a caller mistake surfaced as a validation error.
    pub fn search(&self, query: &str) -> HospitalResult<Vec<Patient>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(HospitalError::InvalidData(
                "search query must not be empty".to_string(),
            ));
        }
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| {
                p.first_name.to_lowercase().contains(&needle)
                    || p.last_name.to_lowercase().contains(&needle)
                    || p.patient_number.to_lowercase().contains(&needle)
                    || p.phone.contains(query.trim())
            })
            .collect())
    }

    /// Applies caller edits through a closure; any mutation flips the
    /// record back to `SyncStatus::Pending`.
    pub fn update<F>(&self, id: Uuid, apply: F) -> HospitalResult<Patient>
    where
        F: FnOnce(&mut Patient),
    {
        let mut inner = self.lock()?;
        let patient = inner
            .patients
            .get_mut(&id)
            .ok_or_else(|| HospitalError::NotFound(format!("patient {id}")))?;
        apply(patient);
        patient.sync_status = SyncStatus::Pending;
        Ok(patient.clone())
    }

    pub fn set_status(&self, id: Uuid, status: PatientStatus) -> HospitalResult<Patient> {
        self.update(id, |p| p.status = status)
    }

    pub fn assign_queue_number(&self, id: Uuid, number: u32) -> HospitalResult<Patient> {
        self.update(id, |p| p.queue_number = Some(number))
    }

    pub fn remove(&self, id: Uuid) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner
            .patients
            .remove(&id)
            .ok_or_else(|| HospitalError::NotFound(format!("patient {id}")))?;
        Ok(())
    }

    pub fn record_vitals(
        &self,
        patient_id: Uuid,
        form: VitalSignsForm,
        recorded_by: &str,
    ) -> HospitalResult<VitalSigns> {
        let mut inner = self.lock()?;
        if !inner.patients.contains_key(&patient_id) {
            return Err(HospitalError::NotFound(format!("patient {patient_id}")));
        }
        let vitals = VitalSigns {
            id: Uuid::new_v4(),
            patient_id,
            blood_pressure_systolic: form.blood_pressure_systolic,
            blood_pressure_diastolic: form.blood_pressure_diastolic,
            temperature: form.temperature,
            weight: form.weight,
            height: form.height,
            heart_rate: form.heart_rate,
            respiratory_rate: form.respiratory_rate,
            oxygen_saturation: form.oxygen_saturation,
            blood_sugar: form.blood_sugar,
            notes: form.notes,
            recorded_by: recorded_by.to_string(),
            recorded_at: Utc::now(),
        };
        inner.vitals.push(vitals.clone());
        Ok(vitals)
    }

    pub fn vitals_for(&self, patient_id: Uuid) -> HospitalResult<Vec<VitalSigns>> {
        let inner = self.lock()?;
        Ok(inner
            .vitals
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect())
    }

    pub fn record_visual_acuity(&self, record: VisualAcuity) -> HospitalResult<VisualAcuity> {
        let mut inner = self.lock()?;
        if !inner.patients.contains_key(&record.patient_id) {
            return Err(HospitalError::NotFound(format!(
                "patient {}",
                record.patient_id
            )));
        }
        inner.visual_acuity.push(record.clone());
        Ok(record)
    }

    pub fn visual_acuity_for(&self, patient_id: Uuid) -> HospitalResult<Vec<VisualAcuity>> {
        let inner = self.lock()?;
        Ok(inner
            .visual_acuity
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect())
    }

    pub fn open_consultation(
        &self,
        patient_id: Uuid,
        doctor_id: &str,
        form: ConsultationForm,
    ) -> HospitalResult<Consultation> {
        let mut inner = self.lock()?;
        if !inner.patients.contains_key(&patient_id) {
            return Err(HospitalError::NotFound(format!("patient {patient_id}")));
        }
        let consultation = Consultation {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: doctor_id.to_string(),
            chief_complaint: form.chief_complaint,
            history_of_present_illness: form.history_of_present_illness,
            physical_examination: form.physical_examination,
            diagnosis: form.diagnosis,
            treatment_plan: form.treatment_plan,
            follow_up_date: form.follow_up_date,
            referral: form.referral,
            status: ConsultationStatus::InProgress,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.consultations.push(consultation.clone());
        if let Some(patient) = inner.patients.get_mut(&patient_id) {
            patient.status = PatientStatus::InConsultation;
            patient.sync_status = SyncStatus::Pending;
        }
        Ok(consultation)
    }

    pub fn complete_consultation(&self, consultation_id: Uuid) -> HospitalResult<Consultation> {
        let mut inner = self.lock()?;
        let consultation = inner
            .consultations
            .iter_mut()
            .find(|c| c.id == consultation_id)
            .ok_or_else(|| HospitalError::NotFound(format!("consultation {consultation_id}")))?;
        if consultation.status != ConsultationStatus::InProgress {
            return Err(HospitalError::InvalidTransition {
                from: "completed".to_string(),
                to: "completed".to_string(),
            });
        }
        consultation.status = ConsultationStatus::Completed;
        consultation.completed_at = Some(Utc::now());
        let done = consultation.clone();
        if let Some(patient) = inner.patients.get_mut(&done.patient_id) {
            patient.status = PatientStatus::Completed;
            patient.last_visit = Some(Utc::now().date_naive());
            patient.sync_status = SyncStatus::Pending;
        }
        Ok(done)
    }

    pub fn consultations_for(&self, patient_id: Uuid) -> HospitalResult<Vec<Consultation>> {
        let inner = self.lock()?;
        Ok(inner
            .consultations
            .iter()
            .filter(|c| c.patient_id == patient_id)
            .cloned()
            .collect())
    }

    /// Patients carrying local edits not yet pushed anywhere.
    pub fn pending_changes(&self) -> HospitalResult<Vec<Patient>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| p.sync_status == SyncStatus::Pending)
            .collect())
    }

    /// Simulated sync: waits out the configured delay in place of real
    /// I/O, then marks every pending record as synced. Returns how
    /// many records were flushed.
    pub async fn synchronize(&self) -> HospitalResult<usize> {
        tokio::time::sleep(self.sync_delay).await;
        let mut inner = self.lock()?;
        let mut flushed = 0;
        for patient in inner.patients.values_mut() {
            if patient.sync_status == SyncStatus::Pending {
                patient.sync_status = SyncStatus::Synced;
                flushed += 1;
            }
        }
        debug!("synchronized {flushed} patient records");
        Ok(flushed)
    }

    pub(crate) fn export_patients(&self) -> HospitalResult<Vec<Patient>> {
        self.all()
    }

    pub(crate) fn export_clinical(
        &self,
    ) -> HospitalResult<(Vec<VitalSigns>, Vec<VisualAcuity>, Vec<Consultation>)> {
        let inner = self.lock()?;
        Ok((
            inner.vitals.clone(),
            inner.visual_acuity.clone(),
            inner.consultations.clone(),
        ))
    }

    pub(crate) fn import(
        &self,
        patients: Vec<Patient>,
        vitals: Vec<VitalSigns>,
        visual_acuity: Vec<VisualAcuity>,
        consultations: Vec<Consultation>,
    ) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.patients = patients.into_iter().map(|p| (p.id, p)).collect();
        inner.vitals = vitals;
        inner.visual_acuity = visual_acuity;
        inner.consultations = consultations;
        inner.next_patient_seq = inner.patients.len() as u32;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn registration(first: &str, last: &str) -> PatientRegistration {
        PatientRegistration {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 15).unwrap(),
            phone: "+234-803-456-7890".to_string(),
            email: None,
            address: "15 Admiralty Way, Lekki".to_string(),
            medical_history: "Hypertension".to_string(),
            emergency_contact: None,
            insurance: None,
        }
    }

    #[test]
    fn registration_assigns_sequential_patient_numbers() {
        let directory = PatientDirectory::default();
        let first = directory.register(registration("Adaobi", "Nwosu")).unwrap();
        let second = directory.register(registration("Emeka", "Obi")).unwrap();
        assert!(first.patient_number.starts_with("HMS"));
        assert!(first.patient_number < second.patient_number);
        assert_eq!(first.status, PatientStatus::Waiting);
        assert_eq!(first.sync_status, SyncStatus::Pending);
    }

    #[test]
    fn registration_without_a_name_is_rejected() {
        let directory = PatientDirectory::default();
        let mut form = registration("", "Nwosu");
        form.first_name = "  ".to_string();
        assert!(matches!(
            directory.register(form),
            Err(HospitalError::InvalidData(_))
        ));
    }

    #[test]
    fn search_matches_name_number_and_phone() {
        let directory = PatientDirectory::default();
        let patient = directory.register(registration("Adaobi", "Nwosu")).unwrap();

        assert_eq!(directory.search("adaobi").unwrap().len(), 1);
        assert_eq!(directory.search(&patient.patient_number).unwrap().len(), 1);
        assert_eq!(directory.search("803-456").unwrap().len(), 1);
        assert!(directory.search("nobody").unwrap().is_empty());
        assert!(matches!(
            directory.search("   "),
            Err(HospitalError::InvalidData(_))
        ));
    }

    #[test]
    fn vitals_require_an_existing_patient() {
        let directory = PatientDirectory::default();
        let form = VitalSignsForm {
            blood_pressure_systolic: 120,
            blood_pressure_diastolic: 80,
            temperature: 36.8,
            weight: 70.0,
            height: 172.0,
            heart_rate: 72,
            respiratory_rate: 16,
            oxygen_saturation: Some(98),
            blood_sugar: None,
            notes: None,
        };
        assert!(matches!(
            directory.record_vitals(Uuid::new_v4(), form.clone(), "Nurse Joy"),
            Err(HospitalError::NotFound(_))
        ));

        let patient = directory.register(registration("Adaobi", "Nwosu")).unwrap();
        let vitals = directory
            .record_vitals(patient.id, form, "Nurse Joy")
            .unwrap();
        assert_eq!(vitals.patient_id, patient.id);
        assert_eq!(directory.vitals_for(patient.id).unwrap().len(), 1);
    }

    #[test]
    fn completing_a_consultation_stamps_the_patient() {
        let directory = PatientDirectory::default();
        let patient = directory.register(registration("Adaobi", "Nwosu")).unwrap();
        let consultation = directory
            .open_consultation(
                patient.id,
                "doctor-1",
                ConsultationForm {
                    chief_complaint: "Headache".to_string(),
                    history_of_present_illness: "Two days".to_string(),
                    physical_examination: "Unremarkable".to_string(),
                    diagnosis: "Tension headache".to_string(),
                    treatment_plan: "Analgesics".to_string(),
                    follow_up_date: None,
                    referral: None,
                },
            )
            .unwrap();
        assert_eq!(
            directory.get(patient.id).unwrap().status,
            PatientStatus::InConsultation
        );

        directory.complete_consultation(consultation.id).unwrap();
        let patient = directory.get(patient.id).unwrap();
        assert_eq!(patient.status, PatientStatus::Completed);
        assert!(patient.last_visit.is_some());

        // A consultation completes exactly once.
        assert!(matches!(
            directory.complete_consultation(consultation.id),
            Err(HospitalError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn synchronize_flushes_pending_edits() {
        let directory = PatientDirectory::new(Duration::from_millis(1));
        directory.register(registration("Adaobi", "Nwosu")).unwrap();
        directory.register(registration("Emeka", "Obi")).unwrap();
        assert_eq!(directory.pending_changes().unwrap().len(), 2);

        let flushed = directory.synchronize().await.unwrap();
        assert_eq!(flushed, 2);
        assert!(directory.pending_changes().unwrap().is_empty());
    }
}
