// lib/src/reports.rs

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use models::errors::HospitalResult;
use models::medical::{Payment, PaymentStatus, PatientStatus, PrescriptionStatus};
use models::reports::{DashboardStats, DateRange, FinancialSummary, OperationalSummary};
use models::Department;

use crate::dispensary::Dispensary;
use crate::directory::PatientDirectory;
use crate::ledger::PaymentLedger;
use crate::queue::QueueCoordinator;

/// Read-only aggregation over the other services. Every figure is a
/// fold over their current records, nothing is cached.
#[derive(Clone)]
pub struct ReportsService {
    directory: PatientDirectory,
    ledger: PaymentLedger,
    dispensary: Dispensary,
    queue: QueueCoordinator,
}

impl ReportsService {
    pub fn new(
        directory: PatientDirectory,
        ledger: PaymentLedger,
        dispensary: Dispensary,
        queue: QueueCoordinator,
    ) -> Self {
        ReportsService {
            directory,
            ledger,
            dispensary,
            queue,
        }
    }

    pub fn dashboard_stats(&self) -> HospitalResult<DashboardStats> {
        let today = Utc::now().date_naive();
        let patients = self.directory.all()?;
        let (payments, _) = self.ledger.export()?;

        Ok(DashboardStats {
            total_patients: patients.len(),
            patients_today: patients
                .iter()
                .filter(|p| p.created_at.date_naive() == today)
                .count(),
            waiting_patients: patients
                .iter()
                .filter(|p| p.status == PatientStatus::Waiting)
                .count(),
            in_consultation: patients
                .iter()
                .filter(|p| p.status == PatientStatus::InConsultation)
                .count(),
            completed_today: patients
                .iter()
                .filter(|p| p.status == PatientStatus::Completed && p.last_visit == Some(today))
                .count(),
            total_revenue: payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Completed)
                .map(|p| p.amount)
                .sum(),
            revenue_today: self.ledger.daily_revenue(today)?,
            pending_payments: self.ledger.pending_payments()?.len(),
            prescriptions_pending: self
                .dispensary
                .by_status(PrescriptionStatus::Pending)?
                .len(),
            prescriptions_dispensed: self
                .dispensary
                .by_status(PrescriptionStatus::Dispensed)?
                .len(),
        })
    }

    pub fn financial_summary(&self, range: DateRange) -> HospitalResult<FinancialSummary> {
        let (payments, _) = self.ledger.export()?;
        let in_range: Vec<&Payment> = payments
            .iter()
            .filter(|p| range.contains(p.created_at.date_naive()))
            .collect();
        let completed: Vec<&&Payment> = in_range
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .collect();

        let total_revenue: i64 = completed.iter().map(|p| p.amount).sum();
        let total_transactions = completed.len();

        let mut revenue_by_method = HashMap::new();
        let mut revenue_by_service_type = HashMap::new();
        let mut per_day: HashMap<NaiveDate, i64> = HashMap::new();
        for p in &completed {
            *revenue_by_method.entry(p.method).or_insert(0) += p.amount;
            *revenue_by_service_type.entry(p.service_type).or_insert(0) += p.amount;
            *per_day.entry(p.created_at.date_naive()).or_insert(0) += p.amount;
        }
        let mut daily_revenue: Vec<(NaiveDate, i64)> = per_day.into_iter().collect();
        daily_revenue.sort_by_key(|(date, _)| *date);

        Ok(FinancialSummary {
            total_revenue,
            total_transactions,
            average_transaction: if total_transactions == 0 {
                0
            } else {
                total_revenue / total_transactions as i64
            },
            revenue_by_method,
            revenue_by_service_type,
            daily_revenue,
            refunded: in_range
                .iter()
                .filter(|p| p.status == PaymentStatus::Refunded)
                .map(|p| p.amount)
                .sum(),
            outstanding: in_range
                .iter()
                .filter(|p| p.status == PaymentStatus::Pending)
                .map(|p| p.amount)
                .sum(),
        })
    }

    pub fn operational_summary(&self) -> HospitalResult<OperationalSummary> {
        let patients = self.directory.all()?;
        let total_patients = patients.len();
        let count = |status: PatientStatus| {
            patients.iter().filter(|p| p.status == status).count()
        };
        let no_shows = count(PatientStatus::NoShow);

        let mut patients_by_department = HashMap::new();
        for department in Department::ALL {
            let items = self.queue.items(department)?;
            if !items.is_empty() {
                patients_by_department.insert(department, items.len());
            }
        }

        let queue_stats = self.queue.stats(None)?;
        Ok(OperationalSummary {
            total_patients,
            waiting: count(PatientStatus::Waiting),
            in_consultation: count(PatientStatus::InConsultation),
            completed: count(PatientStatus::Completed),
            no_shows,
            no_show_rate_percent: if total_patients == 0 {
                0.0
            } else {
                no_shows as f32 * 100.0 / total_patients as f32
            },
            patients_by_department,
            average_wait_minutes: queue_stats.average_wait_minutes,
            longest_wait_minutes: queue_stats.longest_wait_minutes,
        })
    }
}
