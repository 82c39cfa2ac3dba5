// models/src/reports.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::medical::{Department, PaymentMethod, ServiceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub patients_today: usize,
    pub waiting_patients: usize,
    pub in_consultation: usize,
    pub completed_today: usize,
    pub total_revenue: i64,
    pub revenue_today: i64,
    pub pending_payments: usize,
    pub prescriptions_pending: usize,
    pub prescriptions_dispensed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total_waiting: usize,
    pub total_in_service: usize,
    pub total_completed: usize,
    pub average_wait_minutes: u32,
    pub longest_wait_minutes: u32,
}

/// Active state of one department's line for the display board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentLoad {
    pub department: Department,
    pub waiting: usize,
    pub in_service: usize,
    pub current_number: u32,
    pub last_called_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue: i64,
    pub total_transactions: usize,
    pub average_transaction: i64,
    pub revenue_by_method: HashMap<PaymentMethod, i64>,
    pub revenue_by_service_type: HashMap<ServiceType, i64>,
    pub daily_revenue: Vec<(NaiveDate, i64)>,
    pub refunded: i64,
    pub outstanding: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalSummary {
    pub total_patients: usize,
    pub waiting: usize,
    pub in_consultation: usize,
    pub completed: usize,
    pub no_shows: usize,
    pub no_show_rate_percent: f32,
    pub patients_by_department: HashMap<Department, usize>,
    pub average_wait_minutes: u32,
    pub longest_wait_minutes: u32,
}
