// lib/src/hospital.rs

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use models::errors::{HospitalError, HospitalResult};
use models::medical::{Department, Patient, PatientRegistration, Priority, QueueItem};

use crate::auth::AuthService;
use crate::config::HospitalConfig;
use crate::directory::PatientDirectory;
use crate::dispensary::Dispensary;
use crate::ledger::PaymentLedger;
use crate::queue::{Announcer, QueueCoordinator, SilentAnnouncer};
use crate::reports::ReportsService;
use crate::snapshot::StateSnapshot;

/// Facade wiring the services together. Each service is a cheap
/// cloneable handle onto shared state, so callers can hold onto the
/// accessors directly.
#[derive(Clone)]
pub struct Hospital {
    config: HospitalConfig,
    directory: PatientDirectory,
    ledger: PaymentLedger,
    dispensary: Dispensary,
    queue: QueueCoordinator,
    reports: ReportsService,
    auth: AuthService,
    refresh_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Hospital {
    pub fn new(config: HospitalConfig) -> Self {
        Self::with_announcer(config, Arc::new(SilentAnnouncer))
    }

    pub fn with_announcer(config: HospitalConfig, announcer: Arc<dyn Announcer>) -> Self {
        let sync_delay = Duration::from_millis(config.sync_delay_ms);
        let directory = PatientDirectory::new(sync_delay);
        let ledger = PaymentLedger::new();
        let dispensary = Dispensary::new(ledger.clone());
        let queue = QueueCoordinator::new(&config, announcer);
        let reports = ReportsService::new(
            directory.clone(),
            ledger.clone(),
            dispensary.clone(),
            queue.clone(),
        );
        let auth = AuthService::new(sync_delay);
        info!("hospital services initialized for {}", config.name);
        Hospital {
            config,
            directory,
            ledger,
            dispensary,
            queue,
            reports,
            auth,
            refresh_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &HospitalConfig {
        &self.config
    }

    pub fn directory(&self) -> &PatientDirectory {
        &self.directory
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    pub fn dispensary(&self) -> &Dispensary {
        &self.dispensary
    }

    pub fn queue(&self) -> &QueueCoordinator {
        &self.queue
    }

    pub fn reports(&self) -> &ReportsService {
        &self.reports
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Front-desk flow: register the patient, put them in the chosen
    /// department line and stamp their queue number back onto the
    /// patient record.
    pub fn check_in(
        &self,
        form: PatientRegistration,
        department: Department,
        service_type: &str,
        priority: Priority,
    ) -> HospitalResult<(Patient, QueueItem)> {
        let patient = self.directory.register(form)?;
        let item = self.queue.enqueue(
            patient.id,
            &patient.full_name(),
            department,
            service_type,
            priority,
        )?;
        let patient = self
            .directory
            .assign_queue_number(patient.id, item.queue_number)?;
        Ok((patient, item))
    }

    /// Starts the periodic wait-estimate refresh. Calling it again
    /// while a task is running replaces the previous task.
    pub fn start_wait_refresh(&self) -> HospitalResult<()> {
        let mut slot = self
            .refresh_task
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))?;
        if let Some(old) = slot.take() {
            old.abort();
        }
        let queue = self.queue.clone();
        let period = Duration::from_millis(self.config.refresh_interval_ms);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = queue.refresh_wait_estimates() {
                    warn!("wait estimate refresh failed: {e}");
                }
            }
        });
        *slot = Some(handle);
        debug!("wait refresh task started ({period:?} period)");
        Ok(())
    }

    pub fn stop_wait_refresh(&self) -> HospitalResult<()> {
        let mut slot = self
            .refresh_task
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))?;
        if let Some(handle) = slot.take() {
            handle.abort();
            debug!("wait refresh task stopped");
        }
        Ok(())
    }

    /// Flushes pending patient edits through the simulated sync.
    pub async fn synchronize(&self) -> HospitalResult<usize> {
        self.directory.synchronize().await
    }

    pub fn export_snapshot(&self) -> HospitalResult<StateSnapshot> {
        let patients = self.directory.export_patients()?;
        let (vitals, visual_acuity, consultations) = self.directory.export_clinical()?;
        let (payments, services) = self.ledger.export()?;
        Ok(StateSnapshot {
            patients,
            vitals,
            visual_acuity,
            consultations,
            queue: self.queue.export()?,
            payments,
            services,
            prescriptions: self.dispensary.export()?,
        })
    }

    /// Replaces the contents of every store with the snapshot's.
    pub fn import_snapshot(&self, snapshot: StateSnapshot) -> HospitalResult<()> {
        self.directory.import(
            snapshot.patients,
            snapshot.vitals,
            snapshot.visual_acuity,
            snapshot.consultations,
        )?;
        self.ledger.import(snapshot.payments, snapshot.services)?;
        self.dispensary.import(snapshot.prescriptions)?;
        self.queue.import(snapshot.queue)?;
        info!("state snapshot imported");
        Ok(())
    }

    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> HospitalResult<()> {
        self.export_snapshot()?.save_to(path)
    }

    pub fn load_snapshot<P: AsRef<Path>>(&self, path: P) -> HospitalResult<()> {
        self.import_snapshot(StateSnapshot::load_from(path)?)
    }
}
