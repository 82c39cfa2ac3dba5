// lib/src/snapshot.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use models::errors::{HospitalError, HospitalResult};
use models::medical::{
    Consultation, Patient, Payment, Prescription, QueueItem, Service, VisualAcuity, VitalSigns,
};

/// Serializable image of every in-memory store, for whole-state
/// export and import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub patients: Vec<Patient>,
    pub vitals: Vec<VitalSigns>,
    pub visual_acuity: Vec<VisualAcuity>,
    pub consultations: Vec<Consultation>,
    pub queue: Vec<QueueItem>,
    pub payments: Vec<Payment>,
    pub services: Vec<Service>,
    pub prescriptions: Vec<Prescription>,
}

impl StateSnapshot {
    /// Writes the snapshot next to `path` and renames it into place,
    /// so a crash mid-write never leaves a truncated file behind.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> HospitalResult<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file(), self)?;
        tmp.persist(path)
            .map_err(|e| HospitalError::Io(e.error))?;
        info!(
            "saved snapshot of {} patients and {} payments to {}",
            self.patients.len(),
            self.payments.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> HospitalResult<StateSnapshot> {
        let file = File::open(path.as_ref())?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use models::medical::{PatientStatus, SyncStatus};
    use uuid::Uuid;

    fn patient(first: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            patient_number: "HMS20250001".to_string(),
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone: "0700000000".to_string(),
            email: None,
            address: "somewhere".to_string(),
            medical_history: String::new(),
            last_visit: None,
            queue_number: None,
            status: PatientStatus::Waiting,
            sync_status: SyncStatus::Synced,
            emergency_contact: None,
            insurance: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let snapshot = StateSnapshot {
            patients: vec![patient("Alice"), patient("Ben")],
            ..Default::default()
        };
        snapshot.save_to(&path).unwrap();

        let loaded = StateSnapshot::load_from(&path).unwrap();
        assert_eq!(loaded.patients.len(), 2);
        assert_eq!(loaded.patients[0].first_name, "Alice");
        assert!(loaded.queue.is_empty());
    }

    #[test]
    fn save_overwrites_an_existing_snapshot_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        StateSnapshot {
            patients: vec![patient("Old")],
            ..Default::default()
        }
        .save_to(&path)
        .unwrap();
        StateSnapshot {
            patients: vec![patient("New")],
            ..Default::default()
        }
        .save_to(&path)
        .unwrap();

        let loaded = StateSnapshot::load_from(&path).unwrap();
        assert_eq!(loaded.patients.len(), 1);
        assert_eq!(loaded.patients[0].first_name, "New");
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            StateSnapshot::load_from(&missing),
            Err(HospitalError::Io(_))
        ));
    }
}
